//! Path resolution and file I/O for tiddler-in-file synchronization
//!
//! Decides *where* an external tiddler lives on disk (or behind a URL) and
//! provides the safe local write primitives the sync engine relies on.

pub mod config;
pub mod error;
pub mod io;
pub mod location;
pub mod path;
pub mod resolve;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use location::DocumentLocation;
pub use path::NormalizedPath;
pub use resolve::{is_absolute_path, is_local_absolute_path, resolve_full_path, to_local_path};
