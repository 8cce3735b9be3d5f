//! End-to-end scenarios over real files
//!
//! Each test builds a wiki file in a temporary directory, runs a
//! [`HostSession`] with the [`SyncEngine`] hooked in and checks both the
//! external files and the wiki file afterwards.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tif_content::Tiddler;
use tif_core::{
    DeferredLoader, EngineConfig, FileTransport, HostSession, HostStore, LoadOutcome,
    MemoryStore, SaveOutcome, SyncEngine,
};
use tif_test_utils::{TestWiki, list_tiddler};

fn session(wiki: &TestWiki) -> HostSession<SyncEngine> {
    session_with(wiki, SyncEngine::new(wiki.location(), Arc::new(FileTransport::new())))
}

fn session_with(wiki: &TestWiki, engine: SyncEngine) -> HostSession<SyncEngine> {
    let store = MemoryStore::load(&wiki.wiki_file()).unwrap();
    HostSession::new(store, engine).with_wiki_path(wiki.wiki_file())
}

// =============================================================================
// Startup
// =============================================================================

#[tokio::test]
async fn test_startup_loads_external_file_into_store() {
    let wiki = TestWiki::new();
    wiki.write_wiki(&[list_tiddler(&["<<external [[Foo]]>>"])]);
    wiki.write_file("Foo.txt", "bar");

    let mut session = session(&wiki);
    let report = session.start().await;

    assert!(report.success());
    let foo = session.store().fetch_tiddler("Foo").unwrap();
    assert_eq!(foo.borrow().text, "bar");
    assert!(foo.borrow().do_not_save);
}

#[tokio::test]
async fn test_startup_without_list_does_nothing() {
    let wiki = TestWiki::new();
    wiki.write_wiki(&[Tiddler::new("Other").with_text("<<external [[Foo]]>>")]);
    wiki.write_file("Foo.txt", "bar");

    let mut session = session(&wiki);
    let report = session.start().await;

    assert!(report.is_empty());
    assert!(session.store().fetch_tiddler("Foo").is_none());
}

#[tokio::test]
async fn test_externalized_format_restores_all_fields() {
    let wiki = TestWiki::new();
    let mut original = Tiddler::new("Log")
        .with_text("line 1\nline <2>")
        .with_tags(["journal", "two words"]);
    original.creator = Some("Jane".into());
    original.fields.insert("priority".into(), "high".into());
    wiki.write_wiki(&[
        list_tiddler(&["<<external [[Log]] file:\"logs/\" format:externalized>>"]),
        original.clone(),
    ]);

    // first session writes the snapshot file
    let mut first = session(&wiki);
    first.start().await;
    let saved = first.save_changes().unwrap();
    assert!(saved.external.success);
    wiki.assert_file_contains("logs/Log.tid.html", "<pre>line 1\nline &lt;2&gt;</pre>");

    // second session reads it back into a wiki that no longer holds Log
    wiki.write_wiki(&[list_tiddler(&[
        "<<external [[Log]] file:\"logs/\" format:externalized>>",
    ])]);
    let mut second = session(&wiki);
    second.start().await;

    let restored = second.store().fetch_tiddler("Log").unwrap();
    let mut restored = restored.borrow().clone();
    restored.do_not_save = false;
    assert_eq!(restored, original);
}

#[tokio::test]
async fn test_plugin_loaded_through_extension_loader() {
    let wiki = TestWiki::new();
    wiki.write_wiki(&[list_tiddler(&[
        "<<external [[MyPlugin]] file:\"MyPlugin.js\" plugin:true>>",
    ])]);
    wiki.write_file("MyPlugin.js", "/***\n|Author|Jane|\n***/\nrun();");

    let loader = DeferredLoader::new();
    let engine = SyncEngine::new(wiki.location(), Arc::new(FileTransport::new()))
        .with_extension_loader(Box::new(loader.clone()));
    let mut session = session_with(&wiki, engine);
    session.start().await;

    assert_eq!(loader.titles(), vec!["MyPlugin"]);
    let plugin = session.store().fetch_tiddler("MyPlugin").unwrap();
    assert!(plugin.borrow().has_tag("systemConfig"));
    assert_eq!(plugin.borrow().creator.as_deref(), Some("Jane"));
}

// =============================================================================
// Save
// =============================================================================

#[tokio::test]
async fn test_save_roundtrip_drops_external_tiddlers_from_wiki_file() {
    let wiki = TestWiki::new();
    wiki.write_wiki(&[
        list_tiddler(&[
            "<<external [[Foo]]>>",
            "<<external [[Kept]] keepInternal:true>>",
        ]),
        Tiddler::new("Plain").with_text("stays"),
    ]);
    wiki.write_file("Foo.txt", "foo");
    wiki.write_file("Kept.txt", "kept");

    let mut session = session(&wiki);
    session.start().await;
    session
        .store()
        .fetch_tiddler("Foo")
        .unwrap()
        .borrow_mut()
        .text = "foo edited".into();
    let saved = session.save_changes().unwrap();

    assert!(saved.external.success);
    assert!(matches!(
        saved.external.outcome("Foo"),
        Some(SaveOutcome::Written { .. })
    ));
    assert!(matches!(
        saved.external.outcome("Kept"),
        Some(SaveOutcome::Unchanged { .. })
    ));
    assert_eq!(wiki.read_file("Foo.txt"), "foo edited");

    let mut titles: Vec<_> = wiki.read_wiki().into_iter().map(|t| t.title).collect();
    titles.sort();
    assert_eq!(titles, vec!["ExternalTiddlersList", "Kept", "Plain"]);
}

#[tokio::test]
async fn test_save_writes_custom_file_name() {
    let wiki = TestWiki::new();
    wiki.write_wiki(&[
        list_tiddler(&["<<external Bar file:\"sub/custom\">>"]),
        Tiddler::new("Bar").with_text("bar"),
    ]);

    let mut session = session(&wiki);
    session.start().await;
    session.save_changes().unwrap();

    assert_eq!(wiki.read_file("sub/custom.txt"), "bar");
    wiki.assert_file_not_exists("Bar.txt");
}

#[tokio::test]
async fn test_save_with_config_default_format() {
    let wiki = TestWiki::new();
    wiki.write_wiki(&[
        list_tiddler(&["<<external [[Foo]]>>"]),
        Tiddler::new("Foo").with_text("x").with_tags(["t"]),
    ]);
    wiki.write_file("tif.toml", "default_format = \"externalized\"");

    let config = EngineConfig::discover(&wiki.wiki_file().parent().unwrap()).unwrap();
    let engine = SyncEngine::new(wiki.location(), Arc::new(FileTransport::new()))
        .with_config(config);
    let mut session = session_with(&wiki, engine);
    session.start().await;
    session.save_changes().unwrap();

    wiki.assert_file_contains("Foo.tid.html", "tags=\"t\"");
}

#[tokio::test]
async fn test_missing_and_failed_entries_do_not_block_others() {
    let wiki = TestWiki::new();
    wiki.write_wiki(&[
        list_tiddler(&[
            "<<external [[Ghost]]>>",
            "<<external [[Odd]] format:yaml>>",
            "<<external [[Real]]>>",
        ]),
        Tiddler::new("Odd").with_text("o"),
        Tiddler::new("Real").with_text("r"),
    ]);

    let mut session = session(&wiki);
    let load = session.start().await;
    assert!(matches!(
        load.outcome("Ghost"),
        Some(LoadOutcome::Failed { status: 404, .. })
    ));

    let saved = session.save_changes().unwrap();

    assert!(!saved.external.success);
    assert_eq!(saved.external.failures().count(), 1);
    assert_eq!(wiki.read_file("Real.txt"), "r");
    // the wiki file is written regardless; Real now lives in its file, while
    // Odd could not be written and stays in the wiki
    assert_eq!(saved.wiki_tiddlers, Some(2));
    let mut titles: Vec<_> = wiki.read_wiki().into_iter().map(|t| t.title).collect();
    titles.sort();
    assert_eq!(titles, vec!["ExternalTiddlersList", "Odd"]);
}

#[tokio::test]
async fn test_delete_then_save_leaves_file_alone() {
    let wiki = TestWiki::new();
    wiki.write_wiki(&[list_tiddler(&["<<external [[Foo]]>>"])]);
    wiki.write_file("Foo.txt", "foo");

    let mut session = session(&wiki);
    session.start().await;
    session.delete_tiddler("Foo");
    let saved = session.save_changes().unwrap();

    assert!(saved.external.success);
    assert_eq!(wiki.read_file("Foo.txt"), "foo");
    assert!(session.hooks().find("Foo").is_some());
}

#[tokio::test]
async fn test_write_failure_keeps_tiddler_in_wiki_file() {
    let wiki = TestWiki::new();
    wiki.write_wiki(&[
        list_tiddler(&["<<external [[Foo]]>>", "<<external [[Bar]]>>"]),
        Tiddler::new("Foo").with_text("foo"),
        Tiddler::new("Bar").with_text("bar"),
    ]);
    std::fs::create_dir(wiki.root().join("Foo.txt")).unwrap();

    let mut session = session(&wiki);
    session.start().await;
    let saved = session.save_changes().unwrap();

    assert!(!saved.external.success);
    assert!(matches!(
        saved.external.outcome("Foo"),
        Some(SaveOutcome::WriteFailed { .. })
    ));
    assert_eq!(wiki.read_file("Bar.txt"), "bar");
    let mut titles: Vec<_> = wiki.read_wiki().into_iter().map(|t| t.title).collect();
    titles.sort();
    assert_eq!(titles, vec!["ExternalTiddlersList", "Foo"]);
}
