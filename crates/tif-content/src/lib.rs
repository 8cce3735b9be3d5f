//! Tiddler model and external file formats
//!
//! Converts between the in-memory tiddler representation and the text
//! stored in an external file. Two formats ship built in:
//!
//! - `text`: only the tiddler body, stored as `.txt`
//! - `externalized`: the whole tiddler in the host's store-area markup,
//!   stored as `.tid.html`

pub mod error;
pub mod format;
pub mod handlers;
pub mod registry;
pub mod tiddler;

pub use error::{Error, Result};
pub use format::FileFormat;
pub use handlers::{ExternalizedFormat, TextFormat};
pub use registry::FormatRegistry;
pub use tiddler::{Tiddler, parse_tags};
