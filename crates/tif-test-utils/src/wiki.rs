//! [`TestWiki`] fixture for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tif_content::Tiddler;
use tif_fs::{DocumentLocation, NormalizedPath};

/// File name of the wiki document inside the fixture directory
pub const WIKI_FILE: &str = "wiki.json";

/// The list tiddler holding the given directive lines.
pub fn list_tiddler(directives: &[&str]) -> Tiddler {
    Tiddler::new("ExternalTiddlersList").with_text(directives.join("\n"))
}

/// A temporary directory holding a JSON wiki file and its external files.
///
/// # Example
///
/// ```rust,no_run
/// use tif_content::Tiddler;
/// use tif_test_utils::{TestWiki, list_tiddler};
///
/// let wiki = TestWiki::new();
/// wiki.write_wiki(&[list_tiddler(&["<<external [[Foo]]>>"])]);
/// wiki.write_file("Foo.txt", "bar");
/// wiki.assert_file_contains("Foo.txt", "bar");
/// ```
pub struct TestWiki {
    temp_dir: TempDir,
}

impl Default for TestWiki {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWiki {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn wiki_path(&self) -> PathBuf {
        self.root().join(WIKI_FILE)
    }

    pub fn wiki_file(&self) -> NormalizedPath {
        NormalizedPath::new(self.wiki_path())
    }

    /// `file:` URL of the wiki document.
    pub fn location(&self) -> DocumentLocation {
        DocumentLocation::from_file(self.wiki_path())
            .expect("TestWiki::location: temp path is absolute")
    }

    /// Write the wiki document with these tiddlers.
    pub fn write_wiki(&self, tiddlers: &[Tiddler]) {
        let json = serde_json::json!({ "tiddlers": tiddlers });
        fs::write(
            self.wiki_path(),
            serde_json::to_string_pretty(&json).unwrap(),
        )
        .unwrap();
    }

    /// Tiddlers currently stored in the wiki document.
    pub fn read_wiki(&self) -> Vec<Tiddler> {
        let content = self.read_file(WIKI_FILE);
        let mut json: serde_json::Value = serde_json::from_str(&content).unwrap();
        serde_json::from_value(json["tiddlers"].take()).unwrap()
    }

    /// Write `content` to `path` (relative to the root), creating parents.
    pub fn write_file(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }

    pub fn read_file(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.root().join(path).exists()
    }

    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read_file(path);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path,
            content,
            file_content
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wiki_roundtrip() {
        let wiki = TestWiki::new();
        wiki.write_wiki(&[list_tiddler(&["<<external [[A]]>>", "<<external [[B]]>>"])]);

        let tiddlers = wiki.read_wiki();
        assert_eq!(tiddlers.len(), 1);
        assert_eq!(tiddlers[0].text, "<<external [[A]]>>\n<<external [[B]]>>");
    }

    #[test]
    fn test_location_is_file_url() {
        let wiki = TestWiki::new();
        assert!(wiki.location().is_file_protocol());
        assert!(wiki.location().as_str().ends_with("/wiki.json"));
    }

    #[test]
    fn test_write_file_creates_parents() {
        let wiki = TestWiki::new();
        wiki.write_file("sub/dir/x.txt", "x");
        wiki.assert_file_exists("sub/dir/x.txt");
        wiki.assert_file_not_exists("sub/y.txt");
    }
}
