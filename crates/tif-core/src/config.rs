//! Engine configuration
//!
//! Read from an optional `tif.toml` (or `tif.json` / `tif.yaml`) next to the
//! wiki file. Every key is optional.
//!
//! ```toml
//! list_tiddler = "ExternalTiddlersList"
//! default_format = "text"
//! duplicate_policy = "keep-independent"
//! allow_extensions = true
//! skip_unchanged = true
//! ```

use serde::{Deserialize, Serialize};
use tif_content::TextFormat;
use tif_fs::{ConfigStore, NormalizedPath};

use crate::Result;
use crate::directive::LIST_TIDDLER;
use crate::registration::DuplicatePolicy;

/// File names probed by [`EngineConfig::discover`], in order
pub const CONFIG_FILES: &[&str] = &["tif.toml", "tif.json", "tif.yaml", "tif.yml"];

fn default_list_tiddler() -> String {
    LIST_TIDDLER.to_string()
}

fn default_format() -> String {
    TextFormat::ID.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Title of the tiddler holding the registration directives
    #[serde(default = "default_list_tiddler")]
    pub list_tiddler: String,

    /// Format used by directives that name none
    #[serde(default = "default_format")]
    pub default_format: String,

    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Hand plugin tiddlers to the extension loader after loading
    #[serde(default = "default_true")]
    pub allow_extensions: bool,

    /// Skip writing files whose content matches what was last synced
    #[serde(default = "default_true")]
    pub skip_unchanged: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            list_tiddler: default_list_tiddler(),
            default_format: default_format(),
            duplicate_policy: DuplicatePolicy::default(),
            allow_extensions: true,
            skip_unchanged: true,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    /// Load the first config file found in `dir`, or the defaults.
    pub fn discover(dir: &NormalizedPath) -> Result<Self> {
        for name in CONFIG_FILES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                tracing::debug!(path = %candidate, "loading engine config");
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }
}
