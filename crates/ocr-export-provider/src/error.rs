use std::path::PathBuf;

use ocr_export_types::ModelRole;
use thiserror::Error;

/// Failures reported by a pretrained model provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(
        "language '{0}' has no pretrained pipeline configured (available: {available})",
        available = crate::catalog::languages().collect::<Vec<_>>().join(", ")
    )]
    UnknownLanguage(String),
    #[error("accelerator execution is not available for export")]
    AcceleratorUnsupported,
    #[error("{role} model directory {} does not exist", path.display())]
    MissingModelDir { role: ModelRole, path: PathBuf },
    #[error(
        "vocabulary '{name}' not found (searched {searched}); pass the dictionary file explicitly"
    )]
    MissingVocabulary { name: String, searched: String },
    #[error("failed to read vocabulary {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("cannot initialize {role} model for {identity}: {source}")]
    Provider {
        role: ModelRole,
        identity: String,
        #[source]
        source: ProviderError,
    },
    #[error("{role} model in {} is missing {file}", dir.display())]
    MissingFile {
        role: ModelRole,
        dir: PathBuf,
        file: String,
    },
    #[error("{role} model directory {} has no usable name", dir.display())]
    UnnamedModelDir { role: ModelRole, dir: PathBuf },
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("recognition pipeline for {identity} exposes no vocabulary: {source}")]
    Unavailable {
        identity: String,
        #[source]
        source: ProviderError,
    },
    #[error("vocabulary '{name}' is empty")]
    Empty { name: String },
    #[error("vocabulary '{name}' has an empty symbol at index {index}")]
    EmptySymbol { name: String, index: usize },
    #[error("vocabulary '{name}' symbol at index {index} contains a line break")]
    LineBreak { name: String, index: usize },
    #[error("failed to write symbol table {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
