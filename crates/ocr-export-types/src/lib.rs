mod artifact;
mod config;
mod handle;
mod identity;
mod report;
mod symbols;

pub use artifact::write_artifact;
pub use config::ConversionConfig;
pub use handle::SourceModelHandle;
pub use identity::{DEFAULT_LANGUAGE, ModelIdentity, ModelRole};
pub use report::{VerificationOutcome, VerificationReport};
pub use symbols::SymbolTable;
