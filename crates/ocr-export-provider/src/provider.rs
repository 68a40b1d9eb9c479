use std::path::PathBuf;

use ocr_export_types::{ModelIdentity, ModelRole};

use crate::ProviderError;

/// Ordered vocabulary exposed by a recognition pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub name: String,
    pub symbols: Vec<String>,
}

/// The narrow surface the export pipeline needs from a pretrained model
/// provider.
///
/// Implementations are constructed explicitly and passed by reference, so the
/// locator and extractor never touch process-wide state.
pub trait ModelProvider {
    fn name(&self) -> &'static str;

    /// Directory holding the topology and weight files for `role`.
    fn model_dir(&self, identity: &ModelIdentity, role: ModelRole)
    -> Result<PathBuf, ProviderError>;

    /// Recognition vocabulary in class-index order.
    fn vocabulary(&self, identity: &ModelIdentity) -> Result<Vocabulary, ProviderError>;
}
