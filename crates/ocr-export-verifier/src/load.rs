use std::path::Path;

use tract_onnx::pb::ModelProto;
use tract_onnx::prelude::*;

use crate::LoadError;

/// Decode the ONNX protobuf at `path` without building a runnable model.
pub fn load_model(path: &Path) -> Result<ModelProto, LoadError> {
    path.metadata().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tract_onnx::onnx()
        .proto_model_for_path(path)
        .map_err(|err| LoadError::Parse {
            path: path.to_path_buf(),
            message: format!("{err:#}"),
        })
}
