//! Format registry

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::format::FileFormat;
use crate::handlers::{ExternalizedFormat, TextFormat};
use crate::tiddler::Tiddler;

/// Lookup of file formats by identifier.
///
/// Unknown identifiers are reported as [`Error::UnknownFormat`] so callers can
/// tell "nothing to convert" apart from "cannot convert".
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn FileFormat>>,
}

impl FormatRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    /// Create a registry with the `text` and `externalized` formats.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TextFormat::new()));
        registry.register(Box::new(ExternalizedFormat::new()));
        registry
    }

    /// Register a format, replacing any format with the same identifier.
    pub fn register(&mut self, format: Box<dyn FileFormat>) {
        self.formats.insert(format.id().to_string(), format);
    }

    pub fn get(&self, id: &str) -> Result<&dyn FileFormat> {
        self.formats
            .get(id)
            .map(|format| format.as_ref())
            .ok_or_else(|| Error::UnknownFormat(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.formats.contains_key(id)
    }

    /// File extension for a format identifier.
    pub fn extension(&self, id: &str) -> Result<&str> {
        self.get(id).map(|format| format.extension())
    }

    pub fn externalize(&self, id: &str, tiddler: &Tiddler) -> Result<String> {
        self.get(id)?.externalize(tiddler)
    }

    pub fn internalize(&self, id: &str, tiddler: &mut Tiddler, source: &str) -> Result<()> {
        self.get(id)?.internalize(tiddler, source)
    }

    /// List all registered identifiers (sorted).
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.formats.keys().map(|s| s.as_str()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.ids())
            .finish()
    }
}
