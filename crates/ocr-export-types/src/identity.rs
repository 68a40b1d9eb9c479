use std::fmt;

pub const DEFAULT_LANGUAGE: &str = "ch";

/// Which half of the OCR pipeline a model serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelRole {
    Detection,
    Recognition,
}

impl ModelRole {
    pub const ALL: [ModelRole; 2] = [ModelRole::Detection, ModelRole::Recognition];

    /// Short form used by the Paddle model cache layout (`det`, `rec`).
    pub fn as_str(self) -> &'static str {
        match self {
            ModelRole::Detection => "det",
            ModelRole::Recognition => "rec",
        }
    }

    /// Human readable label, capitalized for the start of a log line.
    pub fn label(self) -> &'static str {
        match self {
            ModelRole::Detection => "Detection",
            ModelRole::Recognition => "Recognition",
        }
    }
}

impl fmt::Display for ModelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical selector for a pretrained OCR pipeline.
///
/// Constructed once per run and never mutated. Orientation classification is
/// always disabled for export; requesting an accelerator is rejected by the
/// provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIdentity {
    language: String,
    use_angle_cls: bool,
    use_gpu: bool,
}

impl ModelIdentity {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            use_angle_cls: false,
            use_gpu: false,
        }
    }

    pub fn with_accelerator(mut self, use_gpu: bool) -> Self {
        self.use_gpu = use_gpu;
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn use_angle_cls(&self) -> bool {
        self.use_angle_cls
    }

    pub fn use_gpu(&self) -> bool {
        self.use_gpu
    }
}

impl Default for ModelIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl fmt::Display for ModelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lang={} angle_cls={} gpu={}",
            self.language, self.use_angle_cls, self.use_gpu
        )
    }
}
