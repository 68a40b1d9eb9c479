/// Ordered recognizer vocabulary. The position of a symbol is its class index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    name: String,
    symbols: Vec<String>,
}

impl SymbolTable {
    pub fn new(name: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            symbols,
        }
    }

    /// Vocabulary name, used as the artifact stem (`ppocr_keys_v1`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_name(&self) -> String {
        format!("{}.txt", self.name)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// One symbol per line, each followed by `\n`.
    pub fn to_text(&self) -> String {
        let capacity = self.symbols.iter().map(|s| s.len() + 1).sum();
        let mut out = String::with_capacity(capacity);
        for symbol in &self.symbols {
            out.push_str(symbol);
            out.push('\n');
        }
        out
    }
}
