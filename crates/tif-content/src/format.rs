//! The file format trait

use crate::error::Result;
use crate::tiddler::Tiddler;

/// A conversion between a tiddler and the text of its external file.
///
/// `internalize` works on an existing record in place so fields the format
/// does not carry survive a reload.
pub trait FileFormat: Send + Sync {
    /// Format identifier used in registration directives (`format:text`)
    fn id(&self) -> &str;

    /// File extension, without a leading dot
    fn extension(&self) -> &str;

    /// Render the tiddler as file content.
    fn externalize(&self, tiddler: &Tiddler) -> Result<String>;

    /// Apply file content onto the tiddler.
    fn internalize(&self, tiddler: &mut Tiddler, source: &str) -> Result<()>;
}
