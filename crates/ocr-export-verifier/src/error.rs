use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a readable ONNX model: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Structural defects found in an ONNX model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("model has no IR version")]
    MissingIrVersion,
    #[error("model imports no default-domain opset")]
    MissingDefaultOpset,
    #[error("model has no graph")]
    MissingGraph,
    #[error("graph {kind} at position {index} has no name")]
    UnnamedValue { kind: &'static str, index: usize },
    #[error("graph {kind} '{name}' has no type")]
    UntypedValue { kind: &'static str, name: String },
    #[error("value '{0}' is defined more than once")]
    DuplicateName(String),
    #[error("node {node} has no operator type")]
    MissingOpType { node: String },
    #[error("node {node} reads '{input}' before it is defined")]
    UndefinedInput { node: String, input: String },
    #[error("graph output '{0}' is never produced")]
    UndefinedOutput(String),
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("structural check failed: {0}")]
    Check(#[from] CheckError),
    #[error("expected input '{expected}' is not declared (inputs: {declared})")]
    MissingExpectedInput { expected: String, declared: String },
}
