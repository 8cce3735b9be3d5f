//! Wiki context resolution
//!
//! Works out which wiki file a command acts on, its document location and
//! the engine config sitting next to it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tif_core::{EngineConfig, FileTransport, HostSession, MemoryStore, SyncEngine};
use tif_fs::{DocumentLocation, NormalizedPath};

use crate::error::{CliError, Result};

/// Wiki file used when `--wiki` is not given
pub const DEFAULT_WIKI: &str = "wiki.json";

#[derive(Debug)]
pub struct WikiContext {
    pub wiki: NormalizedPath,
    pub location: DocumentLocation,
    pub config: EngineConfig,
}

impl WikiContext {
    /// Resolve the wiki path against `cwd`. The file itself may not exist yet.
    pub fn resolve(cwd: &Path, wiki: Option<&Path>) -> Result<Self> {
        let path = match wiki {
            Some(path) => cwd.join(path),
            None => cwd.join(DEFAULT_WIKI),
        };
        let path = canonical(&path)?;

        let location = DocumentLocation::from_file(&path)?;
        let wiki = NormalizedPath::new(&path);
        let config = match wiki.parent() {
            Some(dir) => EngineConfig::discover(&dir)?,
            None => EngineConfig::default(),
        };
        tracing::debug!(wiki = %wiki, location = %location, "resolved wiki context");

        Ok(Self {
            wiki,
            location,
            config,
        })
    }

    pub fn exists(&self) -> bool {
        self.wiki.is_file()
    }

    /// Fail with a user error unless the wiki file exists.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.exists() {
            Ok(())
        } else {
            Err(CliError::user(format!("Wiki file not found: {}", self.wiki)))
        }
    }

    pub fn load_store(&self) -> Result<MemoryStore> {
        self.ensure_exists()?;
        Ok(MemoryStore::load(&self.wiki)?)
    }

    /// Engine reading files from local disk.
    pub fn engine(&self) -> SyncEngine {
        SyncEngine::new(self.location.clone(), Arc::new(FileTransport::new()))
            .with_config(self.config.clone())
    }

    /// Session over the wiki file with the engine hooked in.
    pub fn session(&self) -> Result<HostSession<SyncEngine>> {
        let store = self.load_store()?;
        Ok(HostSession::new(store, self.engine()).with_wiki_path(self.wiki.clone()))
    }
}

/// Canonicalize the parent directory, keeping the file name as given.
fn canonical(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(dunce::canonicalize(path)?);
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if parent.exists() => {
            Ok(dunce::canonicalize(parent)?.join(name))
        }
        _ => Err(CliError::user(format!(
            "Directory does not exist: {}",
            path.display()
        ))),
    }
}
