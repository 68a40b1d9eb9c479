mod backends;
mod converter;
mod error;

pub use backends::paddle2onnx::{Paddle2OnnxConfig, Paddle2OnnxConverter};
pub use converter::{GraphConverter, SUPPORTED_OPSETS};
pub use error::ConversionError;
