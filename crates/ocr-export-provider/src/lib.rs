//! Source-model lookup and vocabulary extraction for pretrained PaddleOCR
//! pipelines.

pub mod catalog;
mod error;
mod extract;
mod locator;
mod paddle_cache;
mod provider;

pub use error::{ExtractionError, ProviderError, ResolutionError};
pub use extract::{SymbolExtractor, write_symbol_table};
pub use locator::{ModelLocator, TOPOLOGY_FILENAMES, WEIGHTS_FILENAME};
pub use paddle_cache::{PaddleCacheConfig, PaddleCacheProvider};
pub use provider::{ModelProvider, Vocabulary};
