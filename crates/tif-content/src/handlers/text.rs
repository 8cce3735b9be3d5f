//! Plain text format: the file holds the tiddler body only

use crate::error::Result;
use crate::format::FileFormat;
use crate::tiddler::Tiddler;

/// Stores nothing but the text body.
///
/// Tags, attribution and timestamps are not part of the file, so on reload
/// they come from whatever record the host store already holds.
#[derive(Debug, Default)]
pub struct TextFormat;

impl TextFormat {
    pub const ID: &'static str = "text";

    pub fn new() -> Self {
        Self
    }
}

impl FileFormat for TextFormat {
    fn id(&self) -> &str {
        Self::ID
    }

    fn extension(&self) -> &str {
        "txt"
    }

    fn externalize(&self, tiddler: &Tiddler) -> Result<String> {
        Ok(tiddler.text.clone())
    }

    fn internalize(&self, tiddler: &mut Tiddler, source: &str) -> Result<()> {
        tiddler.text = source.to_string();
        Ok(())
    }
}
