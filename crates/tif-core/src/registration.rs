//! Registration table of externalized tiddlers
//!
//! An entry describes one tiddler declared as external, whether or not its
//! file has been loaded yet.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tif_content::{TextFormat, Tiddler};

use crate::error::{Error, Result};
use crate::store::TiddlerRef;

fn default_format() -> String {
    TextFormat::ID.to_string()
}

/// Options of one registration directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Title of the externalized tiddler
    pub name: String,
    /// Path spec: empty, a directory, or a path with file name
    #[serde(default)]
    pub file: String,
    /// Format identifier
    #[serde(default = "default_format")]
    pub format: String,
    /// Evaluate the tiddler as an extension after loading
    #[serde(default)]
    pub plugin: bool,
    /// Let the host persist the tiddler itself as well
    #[serde(default)]
    pub keep_internal: bool,
}

impl Registration {
    /// Registration with default options (`text` format, next to the wiki).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: String::new(),
            format: default_format(),
            plugin: false,
            keep_internal: false,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_plugin(mut self, plugin: bool) -> Self {
        self.plugin = plugin;
        self
    }

    pub fn with_keep_internal(mut self, keep_internal: bool) -> Self {
        self.keep_internal = keep_internal;
        self
    }
}

/// How far an entry got in its own load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadState {
    /// Registered, no fetch issued yet
    Pending,
    /// Fetch in flight
    Loading,
    /// File content internalized into the store
    Loaded,
    /// Fetch or conversion failed
    Failed,
}

/// What to do when a tiddler is registered a second time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep both entries; each loads and saves on its own
    #[default]
    KeepIndependent,
    /// Refuse the second registration
    Reject,
    /// Overwrite the options of the first entry
    Replace,
}

/// A registered external tiddler
#[derive(Debug, Clone)]
pub struct ExternalEntry {
    registration: Registration,
    tiddler: Option<Weak<RefCell<Tiddler>>>,
    load_state: LoadState,
    last_synced: Option<String>,
}

impl ExternalEntry {
    pub fn new(registration: Registration) -> Self {
        Self {
            registration,
            tiddler: None,
            load_state: LoadState::Pending,
            last_synced: None,
        }
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub fn name(&self) -> &str {
        &self.registration.name
    }

    pub fn file_spec(&self) -> &str {
        &self.registration.file
    }

    pub fn format(&self) -> &str {
        &self.registration.format
    }

    pub fn is_plugin(&self) -> bool {
        self.registration.plugin
    }

    pub fn keep_internal(&self) -> bool {
        self.registration.keep_internal
    }

    /// The live record, if resolved and still held by the store.
    pub fn tiddler(&self) -> Option<TiddlerRef> {
        self.tiddler.as_ref().and_then(Weak::upgrade)
    }

    pub fn is_resolved(&self) -> bool {
        self.tiddler().is_some()
    }

    pub fn set_tiddler(&mut self, tiddler: &TiddlerRef) {
        self.tiddler = Some(Rc::downgrade(tiddler));
    }

    pub fn clear_tiddler(&mut self) {
        self.tiddler = None;
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub(crate) fn set_load_state(&mut self, state: LoadState) {
        self.load_state = state;
    }

    /// Checksum of the content last read from or written to the file
    pub fn last_synced(&self) -> Option<&str> {
        self.last_synced.as_deref()
    }

    pub(crate) fn set_last_synced(&mut self, checksum: Option<String>) {
        self.last_synced = checksum;
    }

    fn matches(&self, key: &EntryKey<'_>) -> bool {
        match key {
            EntryKey::Name(name) => self.registration.name == *name,
            EntryKey::Tiddler(tiddler) => self
                .tiddler()
                .is_some_and(|resolved| Rc::ptr_eq(&resolved, tiddler)),
        }
    }
}

/// Lookup key: a tiddler title or a live record
#[derive(Debug, Clone, Copy)]
pub enum EntryKey<'a> {
    Name(&'a str),
    Tiddler(&'a TiddlerRef),
}

impl<'a> From<&'a str> for EntryKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for EntryKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a TiddlerRef> for EntryKey<'a> {
    fn from(tiddler: &'a TiddlerRef) -> Self {
        Self::Tiddler(tiddler)
    }
}

/// All registered external tiddlers, in registration order
#[derive(Debug, Default)]
pub struct RegistrationTable {
    entries: Vec<ExternalEntry>,
    policy: DuplicatePolicy,
}

impl RegistrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            entries: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Register an external tiddler. Returns the index of its entry.
    pub fn register(&mut self, registration: Registration) -> Result<usize> {
        if let Some(index) = self.position(EntryKey::Name(&registration.name)) {
            match self.policy {
                DuplicatePolicy::KeepIndependent => {
                    tracing::warn!(
                        name = %registration.name,
                        "tiddler registered twice; both entries will load and save"
                    );
                }
                DuplicatePolicy::Reject => {
                    return Err(Error::DuplicateRegistration {
                        name: registration.name,
                    });
                }
                DuplicatePolicy::Replace => {
                    let entry = &mut self.entries[index];
                    entry.registration = registration;
                    entry.last_synced = None;
                    return Ok(index);
                }
            }
        }

        tracing::debug!(
            name = %registration.name,
            file = %registration.file,
            format = %registration.format,
            "registered external tiddler"
        );
        self.entries.push(ExternalEntry::new(registration));
        Ok(self.entries.len() - 1)
    }

    /// Index of the first entry matching the key.
    pub fn position<'a>(&self, key: impl Into<EntryKey<'a>>) -> Option<usize> {
        let key = key.into();
        self.entries.iter().position(|entry| entry.matches(&key))
    }

    /// First entry matching a title or a live record.
    pub fn find<'a>(&self, key: impl Into<EntryKey<'a>>) -> Option<&ExternalEntry> {
        self.position(key).map(|index| &self.entries[index])
    }

    pub fn find_mut<'a>(&mut self, key: impl Into<EntryKey<'a>>) -> Option<&mut ExternalEntry> {
        self.position(key).map(|index| &mut self.entries[index])
    }

    pub fn get(&self, index: usize) -> Option<&ExternalEntry> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ExternalEntry> {
        self.entries.get_mut(index)
    }

    /// Drop the record reference of every entry with this title.
    ///
    /// Returns how many entries were cleared.
    pub fn clear_tiddler(&mut self, title: &str) -> usize {
        let mut cleared = 0;
        for entry in self.entries.iter_mut().filter(|e| e.name() == title) {
            entry.clear_tiddler();
            cleared += 1;
        }
        cleared
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExternalEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
