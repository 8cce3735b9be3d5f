//! Resolution of user-supplied file specs into full paths
//!
//! A file spec may be empty, a directory (`../logs/`), a bare name
//! (`other name`) or a name with its own extension (`MyPlugin.js`). Only the
//! part after the last `/` decides which of these it is.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::{DocumentLocation, Error, Result};

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+:").expect("valid scheme regex"));

static DRIVE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w:").expect("valid drive regex"));

/// True for URLs with any scheme, drive paths (`D:\...`) and `/`-rooted paths.
pub fn is_absolute_path(path: &str) -> bool {
    SCHEME_PREFIX.is_match(path) || path.starts_with('/')
}

/// True when an absolute path can be written with local file I/O.
pub fn is_local_absolute_path(path: &str) -> bool {
    DRIVE_PREFIX.is_match(path) || path.starts_with('/') || path.starts_with("file:")
}

/// Resolve a file spec to a full path.
///
/// * a spec ending in a filename without `.` gets `.{extension}` appended
/// * a spec with no filename (empty or ending in `/`) gets
///   `{fallback_name}.{extension}` appended
/// * absolute results are returned as is, relative ones are prefixed with the
///   document's base location
pub fn resolve_full_path(
    spec: &str,
    fallback_name: &str,
    extension: &str,
    location: &DocumentLocation,
) -> String {
    let file_name_start = spec.rfind('/').map_or(0, |idx| idx + 1);
    let file_name = &spec[file_name_start..];

    let mut path = spec.to_string();
    if file_name.is_empty() {
        path.push_str(fallback_name);
        path.push('.');
        path.push_str(extension);
    } else if !file_name.contains('.') {
        path.push('.');
        path.push_str(extension);
    }

    if is_absolute_path(&path) {
        return path;
    }
    format!("{}{}", location.base(), path)
}

/// Convert a locally writable absolute path into a native path.
///
/// `file:` URLs are percent-decoded; drive and `/` paths pass through.
pub fn to_local_path(full_path: &str) -> Result<PathBuf> {
    if !is_local_absolute_path(full_path) {
        return Err(Error::NotLocal {
            path: full_path.to_string(),
        });
    }
    if full_path.starts_with("file:") {
        let url = Url::parse(full_path).map_err(|e| Error::InvalidLocation {
            location: full_path.to_string(),
            message: e.to_string(),
        })?;
        return url.to_file_path().map_err(|()| Error::NotLocal {
            path: full_path.to_string(),
        });
    }
    Ok(PathBuf::from(full_path))
}
