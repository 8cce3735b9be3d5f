//! Location of the host document that relative file specs resolve against

use std::path::Path;

use url::Url;

use crate::resolve::is_local_absolute_path;
use crate::{Error, Result};

/// Where the current wiki document was opened from.
///
/// Either a URL (`file:///home/me/wiki.json`, `https://host/wiki.html`) or a
/// bare absolute path. Relative external-file specs are resolved against
/// [`base`](Self::base).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLocation {
    location: String,
}

impl DocumentLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Build a `file://` location from an absolute native path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let url = Url::from_file_path(path).map_err(|()| Error::InvalidLocation {
            location: path.display().to_string(),
            message: "path must be absolute".to_string(),
        })?;
        Ok(Self::new(url.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.location
    }

    /// Everything up to and including the last `/`.
    pub fn base(&self) -> &str {
        match self.location.rfind('/') {
            Some(idx) => &self.location[..=idx],
            None => "",
        }
    }

    /// True when the document itself was read from local disk.
    ///
    /// Local reads carry no HTTP status, so a zero status counts as success
    /// only under this condition.
    pub fn is_file_protocol(&self) -> bool {
        is_local_absolute_path(&self.location)
    }
}

impl std::fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_strips_document_name() {
        let location = DocumentLocation::new("file:///home/me/wiki.html");
        assert_eq!(location.base(), "file:///home/me/");
    }

    #[test]
    fn test_base_without_slash_is_empty() {
        let location = DocumentLocation::new("wiki.html");
        assert_eq!(location.base(), "");
    }

    #[test]
    fn test_file_protocol_detection() {
        assert!(DocumentLocation::new("file:///home/me/wiki.html").is_file_protocol());
        assert!(DocumentLocation::new("/srv/wiki.json").is_file_protocol());
        assert!(!DocumentLocation::new("https://example.com/wiki.html").is_file_protocol());
    }

    #[cfg(unix)]
    #[test]
    fn test_from_file_builds_file_url() {
        let location = DocumentLocation::from_file("/tmp/my wiki/wiki.json").unwrap();
        assert_eq!(location.as_str(), "file:///tmp/my%20wiki/wiki.json");
        assert_eq!(location.base(), "file:///tmp/my%20wiki/");
    }

    #[test]
    fn test_from_file_rejects_relative() {
        let result = DocumentLocation::from_file("relative/wiki.json");
        assert!(matches!(result, Err(Error::InvalidLocation { .. })));
    }
}
