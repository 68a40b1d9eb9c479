use std::path::{Path, PathBuf};

use ocr_export_types::{ModelIdentity, SymbolTable, write_artifact};
use tracing::debug;

use crate::{ExtractionError, ModelProvider};

/// Reads the recognizer vocabulary and persists it one symbol per line.
pub struct SymbolExtractor<'a, P: ?Sized> {
    provider: &'a P,
}

impl<'a, P: ModelProvider + ?Sized> SymbolExtractor<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    pub fn extract(&self, identity: &ModelIdentity) -> Result<SymbolTable, ExtractionError> {
        let vocabulary =
            self.provider
                .vocabulary(identity)
                .map_err(|source| ExtractionError::Unavailable {
                    identity: identity.to_string(),
                    source,
                })?;

        if vocabulary.symbols.is_empty() {
            return Err(ExtractionError::Empty {
                name: vocabulary.name,
            });
        }
        for (index, symbol) in vocabulary.symbols.iter().enumerate() {
            if symbol.is_empty() {
                return Err(ExtractionError::EmptySymbol {
                    name: vocabulary.name,
                    index,
                });
            }
            if symbol.contains(['\n', '\r']) {
                return Err(ExtractionError::LineBreak {
                    name: vocabulary.name,
                    index,
                });
            }
        }

        debug!(
            name = %vocabulary.name,
            symbols = vocabulary.symbols.len(),
            "extracted vocabulary"
        );
        Ok(SymbolTable::new(vocabulary.name, vocabulary.symbols))
    }
}

/// Write `table` as `<name>.txt` under `dir`, UTF-8, one symbol per line.
pub fn write_symbol_table(table: &SymbolTable, dir: &Path) -> Result<PathBuf, ExtractionError> {
    let path = dir.join(table.file_name());
    write_artifact(&path, table.to_text().as_bytes())
        .map_err(|source| ExtractionError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}
