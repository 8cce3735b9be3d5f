//! Lifecycle hooks into the host's save and delete operations
//!
//! The host calls [`LifecycleHooks`] around its own persistence instead of
//! having its methods replaced. [`HostSession`] is the reference host: it
//! owns a [`MemoryStore`] and runs the hooks in the required order.

use serde::{Deserialize, Serialize};
use tif_fs::NormalizedPath;

use crate::Result;
use crate::store::{HostStore, MemoryStore, TiddlerRef};
use crate::sync::{LoadReport, SaveReport, SyncEngine};

/// Callbacks the host runs around its own operations
pub trait LifecycleHooks {
    /// Runs before the host persists itself. The host saves regardless of
    /// the report.
    fn before_save(&mut self, store: &dyn HostStore) -> SaveReport;

    /// Runs before the host deletes a tiddler.
    fn before_delete(&mut self, title: &str);
}

impl LifecycleHooks for SyncEngine {
    fn before_save(&mut self, store: &dyn HostStore) -> SaveReport {
        self.save_all(store)
    }

    fn before_delete(&mut self, title: &str) {
        self.forget_tiddler(title);
    }
}

/// Result of [`HostSession::save_changes`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSave {
    /// What the hooks did with external files
    pub external: SaveReport,
    /// Tiddlers written to the wiki file, if the session has one
    pub wiki_tiddlers: Option<usize>,
}

/// A store plus the hooks that run around its persistence
#[derive(Debug)]
pub struct HostSession<H> {
    store: MemoryStore,
    hooks: H,
    wiki_path: Option<NormalizedPath>,
}

impl<H: LifecycleHooks> HostSession<H> {
    pub fn new(store: MemoryStore, hooks: H) -> Self {
        Self {
            store,
            hooks,
            wiki_path: None,
        }
    }

    /// Persist the store to this wiki file on save (builder pattern).
    pub fn with_wiki_path(mut self, path: NormalizedPath) -> Self {
        self.wiki_path = Some(path);
        self
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MemoryStore {
        &mut self.store
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn wiki_path(&self) -> Option<&NormalizedPath> {
        self.wiki_path.as_ref()
    }

    /// Run the save hook, then persist the store.
    ///
    /// External failures are reported, never allowed to block the store's
    /// own save.
    pub fn save_changes(&mut self) -> Result<SessionSave> {
        let external = self.hooks.before_save(&self.store);
        if !external.success {
            tracing::warn!(
                failures = external.failures().count(),
                "some external tiddlers were not saved"
            );
        }

        let wiki_tiddlers = match &self.wiki_path {
            Some(path) => Some(self.store.save(path)?),
            None => None,
        };
        Ok(SessionSave {
            external,
            wiki_tiddlers,
        })
    }

    /// Run the delete hook, then remove the tiddler.
    pub fn delete_tiddler(&mut self, title: &str) -> Option<TiddlerRef> {
        self.hooks.before_delete(title);
        self.store.remove_tiddler(title)
    }

    pub fn into_parts(self) -> (MemoryStore, H) {
        (self.store, self.hooks)
    }
}

impl HostSession<SyncEngine> {
    /// Load every external tiddler into the store.
    pub async fn start(&mut self) -> LoadReport {
        self.hooks.init(&mut self.store).await
    }
}
