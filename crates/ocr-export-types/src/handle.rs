use std::path::{Path, PathBuf};

use crate::ModelRole;

/// Resolved location of one source model's topology and weight files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceModelHandle {
    role: ModelRole,
    model_dir: PathBuf,
    topology_path: PathBuf,
    weights_path: PathBuf,
    artifact_stem: String,
}

impl SourceModelHandle {
    pub fn new(
        role: ModelRole,
        model_dir: PathBuf,
        topology_path: PathBuf,
        weights_path: PathBuf,
        artifact_stem: String,
    ) -> Self {
        Self {
            role,
            model_dir,
            topology_path,
            weights_path,
            artifact_stem,
        }
    }

    pub fn role(&self) -> ModelRole {
        self.role
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Path to the graph topology file (`inference.pdmodel` or `inference.json`).
    pub fn topology_path(&self) -> &Path {
        &self.topology_path
    }

    /// Path to the weight file (`inference.pdiparams`).
    pub fn weights_path(&self) -> &Path {
        &self.weights_path
    }

    /// File name of the ONNX artifact produced from this model.
    pub fn artifact_file_name(&self) -> String {
        format!("{}.onnx", self.artifact_stem)
    }
}
