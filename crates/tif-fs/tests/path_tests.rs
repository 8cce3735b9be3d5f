use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tif_fs::NormalizedPath;

#[test]
fn test_normalize_forward_slashes() {
    let path = NormalizedPath::new("foo/bar/baz");
    assert_eq!(path.as_str(), "foo/bar/baz");
}

#[test]
fn test_normalize_backslashes_to_forward() {
    let path = NormalizedPath::new("foo\\bar\\baz");
    assert_eq!(path.as_str(), "foo/bar/baz");
}

#[test]
fn test_join_paths() {
    let base = NormalizedPath::new("foo/bar/");
    assert_eq!(base.join("baz.txt").as_str(), "foo/bar/baz.txt");

    let base = NormalizedPath::new("foo/bar");
    assert_eq!(base.join("baz.txt").as_str(), "foo/bar/baz.txt");
}

#[test]
fn test_parent() {
    let path = NormalizedPath::new("foo/bar/baz");
    assert_eq!(path.parent().unwrap().as_str(), "foo/bar");
    assert_eq!(NormalizedPath::new("/foo").parent().unwrap().as_str(), "/");
    assert!(NormalizedPath::new("foo").parent().is_none());
}

#[test]
fn test_file_name() {
    let path = NormalizedPath::new("foo/bar/baz.txt");
    assert_eq!(path.file_name(), Some("baz.txt"));
}

#[test]
fn test_extension_takes_last_suffix() {
    let path = NormalizedPath::new("notes/Foo.tid.html");
    assert_eq!(path.extension(), Some("html"));
    assert_eq!(NormalizedPath::new("notes/.hidden").extension(), None);
    assert_eq!(NormalizedPath::new("notes/plain").extension(), None);
}

#[test]
fn test_is_file_only_for_regular_files() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("Foo.txt"), "x").unwrap();
    let dir = NormalizedPath::new(temp.path());

    assert!(dir.join("Foo.txt").is_file());
    assert!(!dir.is_file());
    assert!(!dir.join("Missing.txt").is_file());
}
