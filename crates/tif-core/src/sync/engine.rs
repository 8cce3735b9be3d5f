//! SyncEngine implementation
//!
//! The SyncEngine keeps registered tiddlers and their external files in step:
//! it fetches every file when the wiki starts and writes every file when the
//! wiki saves.

use std::rc::Rc;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tif_content::FormatRegistry;
use tif_fs::{
    DocumentLocation, NormalizedPath, io, is_local_absolute_path, resolve_full_path,
    to_local_path,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::config::EngineConfig;
use crate::directive::{parse_registration, scan_directives};
use crate::error::{Error, Result};
use crate::extension::{ExtensionLoader, prepare_plugin};
use crate::registration::{
    EntryKey, ExternalEntry, LoadState, Registration, RegistrationTable,
};
use crate::store::{HostStore, TiddlerRef};
use crate::transport::{FetchResponse, Transport};

use super::report::{
    EntryReport, ExtensionStatus, LoadEvent, LoadOutcome, LoadReport, SaveOutcome, SaveReport,
    SkipReason,
};

/// Startup progress of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineState {
    /// Not started, or no list tiddler to start from
    Idle,
    /// Registering the directives of the list tiddler
    Announcing,
    /// Fetches in flight
    Loading,
    /// Every fetch issued at startup has completed
    Ready,
}

/// SHA-256 hex digest of file content
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Engine for synchronizing external tiddlers
///
/// One engine serves one wiki document. Records stay owned by the host
/// store; entries only hold weak references to them.
pub struct SyncEngine {
    config: EngineConfig,
    location: DocumentLocation,
    formats: FormatRegistry,
    table: RegistrationTable,
    transport: Arc<dyn Transport>,
    extensions: Option<Box<dyn ExtensionLoader>>,
    state: EngineState,
    subscribers: Vec<UnboundedSender<LoadEvent>>,
}

impl SyncEngine {
    /// Create an engine for the document at `location` with the default
    /// config and the built-in formats.
    pub fn new(location: DocumentLocation, transport: Arc<dyn Transport>) -> Self {
        let config = EngineConfig::default();
        Self {
            table: RegistrationTable::with_policy(config.duplicate_policy),
            config,
            location,
            formats: FormatRegistry::with_builtins(),
            transport,
            extensions: None,
            state: EngineState::Idle,
            subscribers: Vec::new(),
        }
    }

    /// Use a specific config (builder pattern).
    ///
    /// Call before registering anything: the duplicate policy is applied
    /// to a fresh table.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.table = RegistrationTable::with_policy(config.duplicate_policy);
        self.config = config;
        self
    }

    /// Replace the format registry (builder pattern).
    pub fn with_formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    /// Install the host's extension loader (builder pattern).
    pub fn with_extension_loader(mut self, loader: Box<dyn ExtensionLoader>) -> Self {
        self.extensions = Some(loader);
        self
    }

    /// Receive a [`LoadEvent`] for every entry as soon as it finishes loading.
    pub fn subscribe(&mut self) -> UnboundedReceiver<LoadEvent> {
        let (tx, rx) = unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn location(&self) -> &DocumentLocation {
        &self.location
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn table(&self) -> &RegistrationTable {
        &self.table
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// First entry matching a title or a live record.
    pub fn find<'a>(&self, key: impl Into<EntryKey<'a>>) -> Option<&ExternalEntry> {
        self.table.find(key)
    }

    pub fn register(&mut self, registration: Registration) -> Result<usize> {
        self.table.register(registration)
    }

    /// Register every directive found in the list tiddler.
    ///
    /// Returns the number of entries registered. A missing or empty list
    /// leaves the engine idle. Rejected duplicates are logged and skipped.
    pub fn announce(&mut self, store: &dyn HostStore) -> usize {
        let Some(markup) = store
            .get_tiddler_text(&self.config.list_tiddler)
            .filter(|text| !text.is_empty())
        else {
            tracing::debug!(list = %self.config.list_tiddler, "no list tiddler; staying idle");
            return 0;
        };

        self.state = EngineState::Announcing;
        let mut registered = 0;
        for directive in scan_directives(&markup) {
            let Some(registration) =
                parse_registration(&directive.params, &self.config.default_format)
            else {
                tracing::debug!(directive = %directive.source, "directive without a tiddler name");
                continue;
            };
            match self.table.register(registration) {
                Ok(_) => registered += 1,
                Err(e) => tracing::warn!(directive = %directive.source, error = %e, "registration rejected"),
            }
        }
        tracing::info!(entries = registered, "announced external tiddlers");
        registered
    }

    /// Start up: announce the list tiddler, then load every entry.
    ///
    /// Runs once per engine. Later calls, or calls after entries were
    /// registered by hand, return an empty report; use
    /// [`load_all`](Self::load_all) or [`retry_failed`](Self::retry_failed)
    /// to fetch again.
    pub async fn init(&mut self, store: &mut dyn HostStore) -> LoadReport {
        if self.state != EngineState::Idle || !self.table.is_empty() {
            tracing::debug!(state = ?self.state, "engine already started");
            return LoadReport::new();
        }
        self.announce(store);
        if self.state == EngineState::Idle {
            return LoadReport::new();
        }
        self.state = EngineState::Loading;
        let report = self.load_all(store).await;
        self.state = EngineState::Ready;
        report
    }

    /// Fetch and internalize every registered entry.
    pub async fn load_all(&mut self, store: &mut dyn HostStore) -> LoadReport {
        let indices = (0..self.table.len()).collect();
        self.load_indices(indices, store).await
    }

    /// Fetch again every entry whose last load failed.
    pub async fn retry_failed(&mut self, store: &mut dyn HostStore) -> LoadReport {
        let indices = self
            .table
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.load_state() == LoadState::Failed)
            .map(|(index, _)| index)
            .collect();
        self.load_indices(indices, store).await
    }

    pub async fn load_entry(
        &mut self,
        index: usize,
        store: &mut dyn HostStore,
    ) -> Result<LoadOutcome> {
        if index >= self.table.len() {
            return Err(Error::EntryNotFound { index });
        }
        let mut report = self.load_indices(vec![index], store).await;
        report
            .entries
            .pop()
            .map(|entry| entry.outcome)
            .ok_or(Error::EntryNotFound { index })
    }

    async fn load_indices(&mut self, indices: Vec<usize>, store: &mut dyn HostStore) -> LoadReport {
        let mut report = LoadReport::new();
        let mut pending = FuturesUnordered::new();

        for index in indices {
            let Some(entry) = self.table.get(index) else {
                continue;
            };
            let path = match self.resolve_path(entry) {
                Ok(path) => path,
                Err(_) => {
                    let outcome = LoadOutcome::UnknownFormat {
                        format: entry.format().to_string(),
                    };
                    tracing::warn!(name = %entry.name(), format = %entry.format(), "unknown format");
                    self.set_load_state(index, LoadState::Failed);
                    self.finish_load(index, outcome, &mut report);
                    continue;
                }
            };

            self.set_load_state(index, LoadState::Loading);
            let transport = Arc::clone(&self.transport);
            pending.push(async move {
                let response = transport.fetch(&path).await;
                (index, path, response)
            });
        }

        while let Some((index, path, response)) = pending.next().await {
            let outcome = self.complete_load(index, path, response, store);
            self.finish_load(index, outcome, &mut report);
        }
        report
    }

    fn complete_load(
        &mut self,
        index: usize,
        path: String,
        response: FetchResponse,
        store: &mut dyn HostStore,
    ) -> LoadOutcome {
        if !response.is_success(self.location.is_file_protocol()) {
            let message = response
                .error
                .unwrap_or_else(|| format!("fetch returned status {}", response.status));
            tracing::warn!(path = %path, status = response.status, %message, "external tiddler not loaded");
            self.set_load_state(index, LoadState::Failed);
            return LoadOutcome::Failed {
                path,
                status: response.status,
                message,
            };
        }

        let body = response.body.unwrap_or_default();
        let tiddler = match self.internalize(index, store, &body) {
            Ok(tiddler) => tiddler,
            Err(Error::Content(tif_content::Error::UnknownFormat(format))) => {
                self.set_load_state(index, LoadState::Failed);
                return LoadOutcome::UnknownFormat { format };
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "external tiddler content not understood");
                self.set_load_state(index, LoadState::Failed);
                return LoadOutcome::Unresolvable {
                    path,
                    message: e.to_string(),
                };
            }
        };

        let mut is_plugin = false;
        if let Some(entry) = self.table.get_mut(index) {
            entry.set_load_state(LoadState::Loaded);
            entry.set_last_synced(Some(compute_checksum(&body)));
            is_plugin = entry.is_plugin();
        }
        let extension = is_plugin.then(|| self.load_plugin(&tiddler));
        tracing::debug!(path = %path, "external tiddler loaded");
        LoadOutcome::Loaded { path, extension }
    }

    fn load_plugin(&mut self, tiddler: &TiddlerRef) -> ExtensionStatus {
        prepare_plugin(&mut tiddler.borrow_mut());

        let loader = match self.extensions.as_mut() {
            Some(loader) if self.config.allow_extensions => loader,
            _ => return ExtensionStatus::Disabled,
        };
        let status = match loader.load_extension(&tiddler.borrow()) {
            Ok(()) => ExtensionStatus::Loaded,
            Err(message) => {
                tracing::warn!(title = %tiddler.borrow().title, %message, "extension failed");
                ExtensionStatus::Failed { message }
            }
        };
        loader.refresh();
        status
    }

    fn finish_load(&mut self, index: usize, outcome: LoadOutcome, report: &mut LoadReport) {
        let name = self
            .table
            .get(index)
            .map(|entry| entry.name().to_string())
            .unwrap_or_default();
        let event = EntryReport {
            index,
            name,
            outcome,
        };
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        report.push(event);
    }

    fn set_load_state(&mut self, index: usize, state: LoadState) {
        if let Some(entry) = self.table.get_mut(index) {
            entry.set_load_state(state);
        }
    }

    /// File extension for an entry's format.
    pub fn extension_for(&self, entry: &ExternalEntry) -> Result<&str> {
        Ok(self.formats.extension(entry.format())?)
    }

    /// Full path of an entry's file.
    pub fn resolve_path(&self, entry: &ExternalEntry) -> Result<String> {
        let extension = self.extension_for(entry)?;
        Ok(resolve_full_path(
            entry.file_spec(),
            entry.name(),
            extension,
            &self.location,
        ))
    }

    /// File content for an entry's resolved tiddler.
    pub fn externalize(&self, entry: &ExternalEntry) -> Result<String> {
        let tiddler = entry
            .tiddler()
            .ok_or_else(|| Error::NotFound(entry.name().to_string()))?;
        let content = self.formats.externalize(entry.format(), &tiddler.borrow())?;
        Ok(content)
    }

    /// Apply file content to the entry's tiddler, creating it if needed.
    ///
    /// The tiddler is added to the store, flagged so the host does not
    /// persist it unless the entry keeps it internal, and linked to the entry.
    pub fn internalize(
        &mut self,
        index: usize,
        store: &mut dyn HostStore,
        source: &str,
    ) -> Result<TiddlerRef> {
        let entry = self.table.get(index).ok_or(Error::EntryNotFound { index })?;
        let name = entry.name().to_string();
        let format = entry.format().to_string();
        let keep_internal = entry.keep_internal();

        let tiddler = store
            .fetch_tiddler(&name)
            .unwrap_or_else(|| store.create_tiddler(&name));
        {
            let mut record = tiddler.borrow_mut();
            self.formats.internalize(&format, &mut record, source)?;
            record.do_not_save = !keep_internal;
        }
        store.add_tiddler(Rc::clone(&tiddler));

        if let Some(entry) = self.table.get_mut(index) {
            entry.set_tiddler(&tiddler);
        }
        Ok(tiddler)
    }

    /// Write one entry's file.
    pub fn save_entry(&mut self, index: usize, store: &dyn HostStore) -> Result<SaveOutcome> {
        let entry = self.table.get(index).ok_or(Error::EntryNotFound { index })?;

        // the tiddler may have been created after registration
        if !entry.is_resolved() {
            let Some(tiddler) = store.fetch_tiddler(entry.name()) else {
                tracing::debug!(name = %entry.name(), "no tiddler to save");
                return Ok(SaveOutcome::Skipped {
                    reason: SkipReason::NoTiddler,
                });
            };
            if let Some(entry) = self.table.get_mut(index) {
                entry.set_tiddler(&tiddler);
            }
        }

        let entry = self.table.get(index).ok_or(Error::EntryNotFound { index })?;
        let path = match self.resolve_path(entry) {
            Ok(path) => path,
            Err(_) => {
                return Ok(SaveOutcome::UnknownFormat {
                    format: entry.format().to_string(),
                });
            }
        };
        if !is_local_absolute_path(&path) {
            tracing::debug!(path = %path, "remote target; not saved");
            return Ok(SaveOutcome::UnsupportedTarget { path });
        }

        let content = match self.externalize(entry) {
            Ok(content) => content,
            Err(Error::Content(tif_content::Error::UnknownFormat(format))) => {
                return Ok(SaveOutcome::UnknownFormat { format });
            }
            Err(e) => {
                return Ok(SaveOutcome::WriteFailed {
                    path,
                    message: e.to_string(),
                });
            }
        };

        let local = match to_local_path(&path) {
            Ok(local) => NormalizedPath::new(local),
            Err(e) => {
                return Ok(SaveOutcome::WriteFailed {
                    path,
                    message: e.to_string(),
                });
            }
        };

        let checksum = compute_checksum(&content);
        // once the file holds the content the host must not persist it too
        let hand_over = |entry: &ExternalEntry| {
            if let Some(tiddler) = entry.tiddler() {
                tiddler.borrow_mut().do_not_save = !entry.keep_internal();
            }
        };

        if self.config.skip_unchanged
            && entry.last_synced() == Some(checksum.as_str())
            && local.is_file()
        {
            tracing::debug!(path = %path, "external file unchanged");
            hand_over(entry);
            return Ok(SaveOutcome::Unchanged { path });
        }

        if let Err(e) = io::write_text(&local, &content) {
            tracing::warn!(path = %path, error = %e, "external file not written");
            return Ok(SaveOutcome::WriteFailed {
                path,
                message: e.to_string(),
            });
        }

        if let Some(entry) = self.table.get_mut(index) {
            entry.set_last_synced(Some(checksum));
            hand_over(entry);
        }
        tracing::info!(path = %path, "external file written");
        Ok(SaveOutcome::Written { path })
    }

    /// Write every entry's file. One entry's failure never stops the rest.
    pub fn save_all(&mut self, store: &dyn HostStore) -> SaveReport {
        let mut report = SaveReport::new();
        for index in 0..self.table.len() {
            let outcome = match self.save_entry(index, store) {
                Ok(outcome) => outcome,
                Err(e) => SaveOutcome::WriteFailed {
                    path: String::new(),
                    message: e.to_string(),
                },
            };
            let name = self
                .table
                .get(index)
                .map(|entry| entry.name().to_string())
                .unwrap_or_default();
            report.push(EntryReport {
                index,
                name,
                outcome,
            });
        }
        report
    }

    /// Unlink every entry from a tiddler the host is deleting.
    pub fn forget_tiddler(&mut self, title: &str) -> usize {
        let cleared = self.table.clear_tiddler(title);
        if cleared > 0 {
            tracing::debug!(title, entries = cleared, "external tiddler deleted");
        }
        cleared
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("location", &self.location)
            .field("state", &self.state)
            .field("entries", &self.table.len())
            .field("formats", &self.formats)
            .finish()
    }
}
