//! Error types for tif-core

/// Result type for tif-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tif-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A second registration for the same tiddler under the `Reject` policy
    #[error("Tiddler {name} is already registered as external")]
    DuplicateRegistration { name: String },

    /// No registration entry at the given index
    #[error("No registration entry at index {index}")]
    EntryNotFound { index: usize },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from tif-fs
    #[error(transparent)]
    Fs(#[from] tif_fs::Error),

    /// Content error from tif-content
    #[error(transparent)]
    Content(#[from] tif_content::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
