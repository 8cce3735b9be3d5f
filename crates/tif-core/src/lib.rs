//! Registration table and sync engine for tiddler-in-file synchronization
//!
//! This crate sits above `tif-fs` and `tif-content` and implements:
//!
//! - **Directives**: `<<external ...>>` markup in the list tiddler
//! - **Registration table**: which tiddlers live in which files, in which format
//! - **SyncEngine**: concurrent loading on startup, batch saving before the
//!   host persists itself, delete bookkeeping
//! - **Lifecycle hooks**: the explicit save/delete hook API and a reference
//!   host session
//!
//! # Architecture
//!
//! ```text
//!                 tif-cli
//!                    |
//!                tif-core
//!                    |
//!          +---------+---------+
//!          |                   |
//!       tif-fs            tif-content
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tif_core::{FileTransport, HostSession, MemoryStore, SyncEngine};
//! use tif_fs::{DocumentLocation, NormalizedPath};
//!
//! async fn run() -> tif_core::Result<()> {
//!     let wiki = NormalizedPath::new("/home/me/wiki.json");
//!     let location = DocumentLocation::from_file("/home/me/wiki.json")?;
//!     let engine = SyncEngine::new(location, Arc::new(FileTransport::new()));
//!
//!     let mut session = HostSession::new(MemoryStore::load(&wiki)?, engine)
//!         .with_wiki_path(wiki);
//!     session.start().await;
//!     session.save_changes()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod directive;
pub mod error;
pub mod extension;
pub mod hooks;
pub mod registration;
pub mod store;
pub mod sync;
pub mod transport;

pub use config::EngineConfig;
pub use directive::{LIST_TIDDLER, parse_registration, render_directive, scan_directives};
pub use error::{Error, Result};
pub use extension::{DeferredLoader, ExtensionLoader, PLUGIN_TAG};
pub use hooks::{HostSession, LifecycleHooks, SessionSave};
pub use registration::{
    DuplicatePolicy, EntryKey, ExternalEntry, LoadState, Registration, RegistrationTable,
};
pub use store::{HostStore, MemoryStore, TiddlerRef, WikiFile, tiddler_ref};
pub use sync::{
    EngineState, EntryReport, ExtensionStatus, LoadEvent, LoadOutcome, LoadReport, SaveOutcome,
    SaveReport, SkipReason, SyncEngine, compute_checksum,
};
pub use transport::{FetchResponse, FileTransport, MemoryTransport, Transport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_duplicate_registration_names_the_tiddler() {
        let error = Error::DuplicateRegistration {
            name: "Foo".into(),
        };
        let display = error.to_string();
        assert!(
            display.contains("Foo"),
            "Error display should contain the name, got: {}",
            display
        );
    }
}
