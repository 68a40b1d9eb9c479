use std::path::Path;

use ocr_export_types::{ModelIdentity, ModelRole, SourceModelHandle};
use tracing::debug;

use crate::{ModelProvider, ResolutionError};

/// Topology file names in preference order. Paddle 3 exports `inference.json`.
pub const TOPOLOGY_FILENAMES: &[&str] = &["inference.pdmodel", "inference.json"];
pub const WEIGHTS_FILENAME: &str = "inference.pdiparams";

/// Resolves source models through a provider.
pub struct ModelLocator<'a, P: ?Sized> {
    provider: &'a P,
}

impl<'a, P: ModelProvider + ?Sized> ModelLocator<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    pub fn resolve(
        &self,
        identity: &ModelIdentity,
        role: ModelRole,
    ) -> Result<SourceModelHandle, ResolutionError> {
        let model_dir =
            self.provider
                .model_dir(identity, role)
                .map_err(|source| ResolutionError::Provider {
                    role,
                    identity: identity.to_string(),
                    source,
                })?;

        let topology_path = TOPOLOGY_FILENAMES
            .iter()
            .map(|name| model_dir.join(name))
            .find(|path| file_ready(path))
            .ok_or_else(|| ResolutionError::MissingFile {
                role,
                dir: model_dir.clone(),
                file: TOPOLOGY_FILENAMES.join(" or "),
            })?;

        let weights_path = model_dir.join(WEIGHTS_FILENAME);
        if !file_ready(&weights_path) {
            return Err(ResolutionError::MissingFile {
                role,
                dir: model_dir,
                file: WEIGHTS_FILENAME.to_string(),
            });
        }

        let artifact_stem = artifact_stem(&model_dir).ok_or_else(|| {
            ResolutionError::UnnamedModelDir {
                role,
                dir: model_dir.clone(),
            }
        })?;

        debug!(
            provider = self.provider.name(),
            %role,
            topology = %topology_path.display(),
            weights = %weights_path.display(),
            "resolved source model"
        );

        Ok(SourceModelHandle::new(
            role,
            model_dir,
            topology_path,
            weights_path,
            artifact_stem,
        ))
    }
}

fn artifact_stem(model_dir: &Path) -> Option<String> {
    model_dir
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

fn file_ready(path: &Path) -> bool {
    path.metadata()
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::{PaddleCacheConfig, PaddleCacheProvider, ProviderError};
    use tempfile::tempdir;

    fn cached_model(root: &Path, role: ModelRole, name: &str, topology: &str) -> PathBuf {
        let dir = root.join(role.as_str()).join("ch").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(topology), b"graph").unwrap();
        fs::write(dir.join(WEIGHTS_FILENAME), b"weights").unwrap();
        dir
    }

    #[test]
    fn resolve_returns_existing_files_and_stem() {
        let root = tempdir().unwrap();
        let dir = cached_model(
            root.path(),
            ModelRole::Detection,
            "ch_PP-OCRv4_det_infer",
            "inference.pdmodel",
        );
        let provider = PaddleCacheProvider::new(PaddleCacheConfig::new(root.path().into()));

        let handle = ModelLocator::new(&provider)
            .resolve(&ModelIdentity::default(), ModelRole::Detection)
            .unwrap();
        assert_eq!(handle.model_dir(), dir);
        assert_eq!(handle.topology_path(), dir.join("inference.pdmodel"));
        assert_eq!(handle.weights_path(), dir.join(WEIGHTS_FILENAME));
        assert_eq!(handle.artifact_file_name(), "ch_PP-OCRv4_det_infer.onnx");
    }

    #[test]
    fn resolve_accepts_json_topology() {
        let root = tempdir().unwrap();
        let dir = cached_model(
            root.path(),
            ModelRole::Recognition,
            "ch_PP-OCRv4_rec_infer",
            "inference.json",
        );
        let provider = PaddleCacheProvider::new(PaddleCacheConfig::new(root.path().into()));

        let handle = ModelLocator::new(&provider)
            .resolve(&ModelIdentity::default(), ModelRole::Recognition)
            .unwrap();
        assert_eq!(handle.topology_path(), dir.join("inference.json"));
    }

    #[test]
    fn resolve_fails_when_weights_are_missing() {
        let root = tempdir().unwrap();
        let dir = cached_model(
            root.path(),
            ModelRole::Detection,
            "ch_PP-OCRv4_det_infer",
            "inference.pdmodel",
        );
        fs::remove_file(dir.join(WEIGHTS_FILENAME)).unwrap();
        let provider = PaddleCacheProvider::new(PaddleCacheConfig::new(root.path().into()));

        let err = ModelLocator::new(&provider)
            .resolve(&ModelIdentity::default(), ModelRole::Detection)
            .unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::MissingFile { ref file, .. } if file == WEIGHTS_FILENAME
        ));
    }

    #[test]
    fn resolve_treats_empty_topology_as_missing() {
        let root = tempdir().unwrap();
        let dir = cached_model(
            root.path(),
            ModelRole::Detection,
            "ch_PP-OCRv4_det_infer",
            "inference.pdmodel",
        );
        fs::write(dir.join("inference.pdmodel"), b"").unwrap();
        let provider = PaddleCacheProvider::new(PaddleCacheConfig::new(root.path().into()));

        let err = ModelLocator::new(&provider)
            .resolve(&ModelIdentity::default(), ModelRole::Detection)
            .unwrap_err();
        assert!(matches!(err, ResolutionError::MissingFile { .. }));
    }

    #[test]
    fn resolve_wraps_provider_errors() {
        let root = tempdir().unwrap();
        let provider = PaddleCacheProvider::new(PaddleCacheConfig::new(root.path().into()));

        let err = ModelLocator::new(&provider)
            .resolve(&ModelIdentity::new("xx"), ModelRole::Detection)
            .unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::Provider {
                source: ProviderError::UnknownLanguage(_),
                ..
            }
        ));
    }

    #[test]
    fn accelerator_request_fails_resolution() {
        let root = tempdir().unwrap();
        cached_model(
            root.path(),
            ModelRole::Detection,
            "ch_PP-OCRv4_det_infer",
            "inference.pdmodel",
        );
        let provider = PaddleCacheProvider::new(PaddleCacheConfig::new(root.path().into()));

        let err = ModelLocator::new(&provider)
            .resolve(
                &ModelIdentity::default().with_accelerator(true),
                ModelRole::Detection,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::Provider {
                role: ModelRole::Detection,
                source: ProviderError::AcceleratorUnsupported,
                ..
            }
        ));
    }
}
