//! Tests that run the compiled `tif` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tif_content::Tiddler;
use tif_test_utils::{TestWiki, list_tiddler};

/// Get a Command for the tif binary, run inside the wiki's directory
fn tif_cmd(wiki: &TestWiki) -> Command {
    let mut cmd = Command::cargo_bin("tif").expect("Failed to find tif binary");
    cmd.current_dir(wiki.root()).env_remove("TIF_WIKI");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let wiki = TestWiki::new();
    tif_cmd(&wiki)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("register"));
}

#[test]
fn test_formats_lists_builtins() {
    let wiki = TestWiki::new();
    tif_cmd(&wiki)
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("externalized"))
        .stdout(predicate::str::contains("tid.html"));
}

#[test]
fn test_status_without_wiki_fails() {
    let wiki = TestWiki::new();
    tif_cmd(&wiki)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wiki file not found"));
}

#[test]
fn test_register_then_status() {
    let wiki = TestWiki::new();
    tif_cmd(&wiki)
        .args(["register", "Foo", "--file", "notes/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<<external [[Foo]] file:\"notes/\">>"));

    tif_cmd(&wiki)
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Foo\""))
        .stdout(predicate::str::contains("notes/Foo.txt"));
}

#[test]
fn test_load_reports_missing_file() {
    let wiki = TestWiki::new();
    wiki.write_wiki(&[list_tiddler(&["<<external [[Foo]]>>", "<<external [[Bar]]>>"])]);
    wiki.write_file("Foo.txt", "foo");

    tif_cmd(&wiki)
        .arg("load")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 loaded"))
        .stdout(predicate::str::contains("404"));
}

#[test]
fn test_save_writes_external_file_and_wiki() {
    let wiki = TestWiki::new();
    wiki.write_wiki(&[
        list_tiddler(&["<<external [[Foo]] file:\"sub/\">>"]),
        Tiddler::new("Foo").with_text("bar"),
    ]);

    let wiki_titles = || -> Vec<String> { wiki.read_wiki().into_iter().map(|t| t.title).collect() };

    tif_cmd(&wiki).arg("save").assert().success();
    wiki.assert_file_contains("sub/Foo.txt", "bar");
    assert_eq!(wiki_titles(), vec!["ExternalTiddlersList"]);

    // second run loads the file back and finds nothing to write
    tif_cmd(&wiki)
        .arg("save")
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged"));
    assert_eq!(wiki_titles(), vec!["ExternalTiddlersList"]);
}

#[test]
fn test_save_with_explicit_wiki_path() {
    let wiki = TestWiki::new();
    wiki.write_file(
        "w/notes.json",
        &serde_json::json!({
            "tiddlers": [list_tiddler(&["<<external [[Note]] keepInternal:true>>"]), Tiddler::new("Note").with_text("n")]
        })
        .to_string(),
    );

    tif_cmd(&wiki)
        .args(["save", "--wiki", "w/notes.json", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"written\""));
    wiki.assert_file_contains("w/Note.txt", "n");
    wiki.assert_file_contains("w/notes.json", "\"Note\"");
}
