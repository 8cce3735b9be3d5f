//! Error types for tif-content

/// Result type for tif-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tif-content operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {format} content: {message}")]
    ParseError { format: String, message: String },

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            format: format.into(),
            message: message.into(),
        }
    }
}
