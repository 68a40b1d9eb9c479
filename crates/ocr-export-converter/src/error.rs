use std::path::PathBuf;

use ocr_export_types::ModelRole;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("converter program must not be empty")]
    EmptyProgram,
    #[error("opset {0} is not supported by the converter")]
    UnsupportedOpset(u32),
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} failed converting the {role} model ({status}): {stderr}")]
    Failed {
        program: String,
        role: ModelRole,
        status: String,
        stderr: String,
    },
    #[error("{program} wrote no graph for the {role} model")]
    MissingOutput { program: String, role: ModelRole },
    #[error("{program} produced an empty graph for the {role} model")]
    EmptyOutput { program: String, role: ModelRole },
    #[error("converter I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
