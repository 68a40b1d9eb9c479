#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ocr_export_converter::{ConversionError, GraphConverter};
use ocr_export_provider::{PaddleCacheConfig, PaddleCacheProvider};
use ocr_export_types::{ConversionConfig, ModelRole, SourceModelHandle};
use ocr_export_verifier::fixtures;

pub const DET_MODEL: &str = "ch_PP-OCRv4_det_infer";
pub const REC_MODEL: &str = "ch_PP-OCRv4_rec_infer";
pub const DICTIONARY: &str = "ppocr_keys_v1";

/// Lays out a PaddleOCR cache for the `ch` pipeline under `root`.
pub fn populate_cache(root: &Path, symbols: &[&str]) {
    for (role, model) in [("det", DET_MODEL), ("rec", REC_MODEL)] {
        let dir = root.join(role).join("ch").join(model);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("inference.pdmodel"), b"topology").unwrap();
        fs::write(dir.join("inference.pdiparams"), b"weights").unwrap();
    }
    let mut text = symbols.join("\n");
    text.push('\n');
    fs::write(root.join(format!("{DICTIONARY}.txt")), text).unwrap();
}

pub fn provider(root: &Path) -> PaddleCacheProvider {
    PaddleCacheProvider::new(PaddleCacheConfig::new(root.to_path_buf()))
}

pub fn output_name(role: ModelRole) -> &'static str {
    match role {
        ModelRole::Detection => "sigmoid_0.tmp_0",
        ModelRole::Recognition => "softmax_2.tmp_0",
    }
}

/// Stands in for paddle2onnx: emits a small valid graph per role.
#[derive(Default)]
pub struct FakeConverter {
    pub fail: Option<ModelRole>,
    pub corrupt: Option<ModelRole>,
    pub input_name: Option<String>,
    pub calls: Mutex<Vec<(ModelRole, PathBuf)>>,
}

impl FakeConverter {
    pub fn failing(role: ModelRole) -> Self {
        Self {
            fail: Some(role),
            ..Self::default()
        }
    }

    pub fn corrupting(role: ModelRole) -> Self {
        Self {
            corrupt: Some(role),
            ..Self::default()
        }
    }

    pub fn with_input_name(name: &str) -> Self {
        Self {
            input_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(ModelRole, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl GraphConverter for FakeConverter {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn convert(
        &self,
        handle: &SourceModelHandle,
        config: &ConversionConfig,
    ) -> Result<Vec<u8>, ConversionError> {
        assert_eq!(config.opset_version, 13);
        let role = handle.role();
        self.calls
            .lock()
            .unwrap()
            .push((role, handle.model_dir().to_path_buf()));

        if self.fail == Some(role) {
            return Err(ConversionError::Failed {
                program: "fake".to_string(),
                role,
                status: "exit status: 1".to_string(),
                stderr: "unsupported operator".to_string(),
            });
        }
        if self.corrupt == Some(role) {
            return Ok(b"\x08\x07not really a graph".to_vec());
        }
        let input = self.input_name.as_deref().unwrap_or("x");
        Ok(fixtures::ocr_model_bytes(input, output_name(role)))
    }
}
