//! Host store interface and the in-memory reference store
//!
//! The engine never owns records. It reads and writes them through
//! [`HostStore`] and keeps only weak references.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tif_content::Tiddler;
use tif_fs::{NormalizedPath, io};

use crate::Result;

/// Shared handle to a record held by the host store
pub type TiddlerRef = Rc<RefCell<Tiddler>>;

/// Wrap a tiddler into a store handle.
pub fn tiddler_ref(tiddler: Tiddler) -> TiddlerRef {
    Rc::new(RefCell::new(tiddler))
}

/// The operations the engine needs from the host's record store.
pub trait HostStore {
    fn fetch_tiddler(&self, title: &str) -> Option<TiddlerRef>;

    /// Create a fresh record that is not yet part of the store.
    fn create_tiddler(&self, title: &str) -> TiddlerRef {
        tiddler_ref(Tiddler::new(title))
    }

    /// Add a record, replacing any record with the same title.
    fn add_tiddler(&mut self, tiddler: TiddlerRef);

    fn remove_tiddler(&mut self, title: &str) -> Option<TiddlerRef>;

    fn titles(&self) -> Vec<String>;

    /// Text of a record, or of one of its slices with `Title::Slice`.
    fn get_tiddler_text(&self, reference: &str) -> Option<String> {
        match reference.split_once("::") {
            Some((title, slice)) => self.fetch_tiddler(title)?.borrow().slice(slice),
            None => Some(self.fetch_tiddler(reference)?.borrow().text.clone()),
        }
    }
}

/// On-disk layout of the host's own document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WikiFile {
    #[serde(default)]
    pub tiddlers: Vec<Tiddler>,
}

/// In-memory record store with JSON persistence.
///
/// Records flagged `do_not_save` are left out when the store persists
/// itself; their only durable copy is their external file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tiddlers: BTreeMap<String, TiddlerRef>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tiddlers(tiddlers: impl IntoIterator<Item = Tiddler>) -> Self {
        let mut store = Self::new();
        for tiddler in tiddlers {
            store.add_tiddler(tiddler_ref(tiddler));
        }
        store
    }

    /// Load the store from a wiki file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let content = io::read_text(path)?;
        let wiki: WikiFile = serde_json::from_str(&content)?;
        tracing::debug!(path = %path, tiddlers = wiki.tiddlers.len(), "loaded wiki file");
        Ok(Self::from_tiddlers(wiki.tiddlers))
    }

    /// Snapshot of the records the host persists itself.
    pub fn to_wiki_file(&self) -> WikiFile {
        WikiFile {
            tiddlers: self
                .tiddlers
                .values()
                .map(|tiddler| tiddler.borrow())
                .filter(|tiddler| !tiddler.do_not_save)
                .map(|tiddler| tiddler.clone())
                .collect(),
        }
    }

    /// Persist the store as a wiki file. Returns the number of records written.
    pub fn save(&self, path: &NormalizedPath) -> Result<usize> {
        let wiki = self.to_wiki_file();
        let content = serde_json::to_string_pretty(&wiki)?;
        io::write_text(path, &content)?;
        tracing::info!(path = %path, tiddlers = wiki.tiddlers.len(), "saved wiki file");
        Ok(wiki.tiddlers.len())
    }

    pub fn len(&self) -> usize {
        self.tiddlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiddlers.is_empty()
    }
}

impl HostStore for MemoryStore {
    fn fetch_tiddler(&self, title: &str) -> Option<TiddlerRef> {
        self.tiddlers.get(title).cloned()
    }

    fn add_tiddler(&mut self, tiddler: TiddlerRef) {
        let title = tiddler.borrow().title.clone();
        self.tiddlers.insert(title, tiddler);
    }

    fn remove_tiddler(&mut self, title: &str) -> Option<TiddlerRef> {
        self.tiddlers.remove(title)
    }

    fn titles(&self) -> Vec<String> {
        self.tiddlers.keys().cloned().collect()
    }
}
