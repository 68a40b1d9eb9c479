//! Reload exported ONNX graphs and check they are structurally sound.

mod checker;
mod error;
mod load;
mod verifier;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use checker::check_model;
pub use error::{CheckError, LoadError, VerifyError};
pub use load::load_model;
pub use verifier::Verifier;

pub use tract_onnx::pb;
