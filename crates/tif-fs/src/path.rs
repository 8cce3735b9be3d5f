//! Local paths of wiki and external files

use std::fmt;
use std::path::{Path, PathBuf};

/// A local file path kept with `/` separators.
///
/// Resolved external-file paths and the wiki file path travel in this form;
/// [`to_native`](Self::to_native) converts at the I/O boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(path.as_ref().to_string_lossy().replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }

    /// Append a relative segment such as a config file name.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        if self.0.ends_with('/') {
            Self(format!("{}{segment}", self.0))
        } else {
            Self(format!("{}/{segment}", self.0))
        }
    }

    /// Directory holding this path: `/foo` gives `/`, a bare name has none.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.0.trim_end_matches('/');
        let (dir, _) = trimmed.rsplit_once('/')?;
        Some(Self(if dir.is_empty() { "/".into() } else { dir.into() }))
    }

    pub fn file_name(&self) -> Option<&str> {
        self.0
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
    }

    /// Whether a regular file is present on disk.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Last dotted suffix of the file name (`Foo.tid.html` gives `html`).
    ///
    /// Dot files such as `.hidden` have none.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
