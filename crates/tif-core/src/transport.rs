//! Fetching external file content
//!
//! A fetch resolves to a [`FetchResponse`] carrying an HTTP-like status.
//! Reads from local disk carry no real status and report `0`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tif_fs::{NormalizedPath, io, is_local_absolute_path, to_local_path};

/// Outcome of one fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    /// HTTP status, or `0` when the transport has none
    pub status: u16,
    pub body: Option<String>,
    /// Diagnostic for failed fetches
    pub error: Option<String>,
}

impl FetchResponse {
    /// A local read that produced content.
    pub fn local(body: impl Into<String>) -> Self {
        Self {
            status: 0,
            body: Some(body.into()),
            error: None,
        }
    }

    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
            error: None,
        }
    }

    pub fn failed(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            body: None,
            error: Some(error.into()),
        }
    }

    /// Any 2xx, a 304, or a status-less answer while the document itself
    /// was opened from local disk.
    pub fn is_success(&self, file_protocol: bool) -> bool {
        (self.status == 0 && file_protocol)
            || (200..300).contains(&self.status)
            || self.status == 304
    }
}

/// Source of external file content
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, path: &str) -> FetchResponse;
}

/// Reads `file:` URLs and local absolute paths from disk.
#[derive(Debug, Default)]
pub struct FileTransport;

impl FileTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for FileTransport {
    async fn fetch(&self, path: &str) -> FetchResponse {
        if !is_local_absolute_path(path) {
            return FetchResponse::failed(501, format!("unsupported location: {path}"));
        }
        let native = match to_local_path(path) {
            Ok(native) => NormalizedPath::new(native),
            Err(e) => return FetchResponse::failed(400, e.to_string()),
        };

        match io::read_text_async(&native).await {
            Ok(body) => FetchResponse::local(body),
            Err(tif_fs::Error::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                FetchResponse::failed(404, format!("file not found: {native}"))
            }
            Err(e) => FetchResponse::failed(500, e.to_string()),
        }
    }
}

/// Serves preloaded content by path; unknown paths answer 404.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    responses: HashMap<String, FetchResponse>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `path` as a successful local read (builder pattern).
    pub fn with_file(mut self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(path.into(), FetchResponse::local(body));
        self
    }

    /// Serve an arbitrary response at `path` (builder pattern).
    pub fn with_response(mut self, path: impl Into<String>, response: FetchResponse) -> Self {
        self.responses.insert(path.into(), response);
        self
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn fetch(&self, path: &str) -> FetchResponse {
        self.responses
            .get(path)
            .cloned()
            .unwrap_or_else(|| FetchResponse::failed(404, format!("no content at {path}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case(0, true, true)]
    #[case(0, false, false)]
    #[case(200, false, true)]
    #[case(204, false, true)]
    #[case(304, false, true)]
    #[case(404, true, false)]
    #[case(500, true, false)]
    fn test_success_rule(#[case] status: u16, #[case] file_protocol: bool, #[case] expected: bool) {
        let response = FetchResponse {
            status,
            body: None,
            error: None,
        };
        assert_eq!(response.is_success(file_protocol), expected);
    }

    #[tokio::test]
    async fn test_file_transport_reads_plain_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Foo.txt");
        std::fs::write(&path, "bar").unwrap();

        let response = FileTransport::new().fetch(&path.to_string_lossy()).await;
        assert_eq!(response, FetchResponse::local("bar"));
    }

    #[tokio::test]
    async fn test_file_transport_missing_file_is_404() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Missing.txt");

        let response = FileTransport::new().fetch(&path.to_string_lossy()).await;
        assert_eq!(response.status, 404);
        assert!(response.body.is_none());
    }

    #[tokio::test]
    async fn test_file_transport_rejects_remote() {
        let response = FileTransport::new().fetch("https://example.com/Foo.txt").await;
        assert_eq!(response.status, 501);
        assert!(!response.is_success(true));
    }

    #[tokio::test]
    async fn test_memory_transport() {
        let transport = MemoryTransport::new()
            .with_file("file:///w/Foo.txt", "bar")
            .with_response("https://h/x.txt", FetchResponse::http(304, "cached"));

        assert_eq!(transport.fetch("file:///w/Foo.txt").await.body.as_deref(), Some("bar"));
        assert!(transport.fetch("https://h/x.txt").await.is_success(false));
        assert_eq!(transport.fetch("file:///w/Other.txt").await.status, 404);
    }
}
