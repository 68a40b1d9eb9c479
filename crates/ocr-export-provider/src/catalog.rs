//! Pretrained pipelines known to the PaddleOCR model cache.

use ocr_export_types::ModelRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineEntry {
    pub language: &'static str,
    pub detection: &'static str,
    pub recognition: &'static str,
    pub dictionary: &'static str,
}

impl PipelineEntry {
    pub fn model_name(&self, role: ModelRole) -> &'static str {
        match role {
            ModelRole::Detection => self.detection,
            ModelRole::Recognition => self.recognition,
        }
    }
}

const CATALOG: &[PipelineEntry] = &[
    PipelineEntry {
        language: "ch",
        detection: "ch_PP-OCRv4_det_infer",
        recognition: "ch_PP-OCRv4_rec_infer",
        dictionary: "ppocr_keys_v1",
    },
    PipelineEntry {
        language: "en",
        detection: "en_PP-OCRv3_det_infer",
        recognition: "en_PP-OCRv4_rec_infer",
        dictionary: "en_dict",
    },
];

pub fn lookup(language: &str) -> Option<&'static PipelineEntry> {
    let language = language.trim();
    CATALOG
        .iter()
        .find(|entry| entry.language.eq_ignore_ascii_case(language))
}

pub fn languages() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|entry| entry.language)
}
