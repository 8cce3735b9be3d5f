//! Status command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use tif_core::{ExternalEntry, HostStore, MemoryStore, SyncEngine};
use tif_fs::{is_local_absolute_path, to_local_path};

use crate::context::WikiContext;
use crate::error::Result;

/// One registered tiddler as seen from disk
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntryStatus {
    pub name: String,
    pub format: String,
    /// Resolved file path, `None` for unknown formats
    pub path: Option<String>,
    /// Whether the file exists; `None` for remote paths
    pub file_exists: Option<bool>,
    pub in_wiki: bool,
    pub plugin: bool,
    pub keep_internal: bool,
}

/// Registered entries of the wiki's list tiddler
pub fn collect_status(engine: &mut SyncEngine, store: &MemoryStore) -> Vec<EntryStatus> {
    engine.announce(store);
    let engine: &SyncEngine = engine;
    engine
        .table()
        .iter()
        .map(|entry| entry_status(engine, store, entry))
        .collect()
}

fn entry_status(engine: &SyncEngine, store: &MemoryStore, entry: &ExternalEntry) -> EntryStatus {
    let path = engine.resolve_path(entry).ok();
    let file_exists = path
        .as_deref()
        .filter(|path| is_local_absolute_path(path))
        .map(|path| to_local_path(path).is_ok_and(|local| local.is_file()));

    EntryStatus {
        name: entry.name().to_string(),
        format: entry.format().to_string(),
        path,
        file_exists,
        in_wiki: store.fetch_tiddler(entry.name()).is_some(),
        plugin: entry.is_plugin(),
        keep_internal: entry.keep_internal(),
    }
}

/// Run the status command
pub fn run_status(cwd: &Path, wiki: Option<&Path>, json: bool) -> Result<()> {
    let context = WikiContext::resolve(cwd, wiki)?;
    let store = context.load_store()?;
    let mut engine = context.engine();
    let entries = collect_status(&mut engine, &store);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", "Wiki Status".bold());
    println!();
    println!("{}:   {}", "Wiki".dimmed(), context.wiki);
    println!("{}:   {}", "List".dimmed(), context.config.list_tiddler.cyan());
    println!("{}:   {}", "Tiddlers".dimmed(), store.len());
    println!();

    println!("{}:", "External Tiddlers".bold());
    if entries.is_empty() {
        println!("  {} (use {} to add)", "None".dimmed(), "tif register".cyan());
        return Ok(());
    }
    for entry in &entries {
        let file = match entry.file_exists {
            Some(true) => "file present".green(),
            Some(false) => "file missing".yellow(),
            None if entry.path.is_some() => "remote".dimmed(),
            None => "unknown format".red(),
        };
        println!(
            "  {} {} [{}] {} ({})",
            "+".green(),
            entry.name.cyan(),
            entry.format,
            entry.path.as_deref().unwrap_or("-"),
            file
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tif_content::Tiddler;
    use tif_test_utils::{TestWiki, list_tiddler};

    #[test]
    fn test_collect_status() {
        let wiki = TestWiki::new();
        wiki.write_wiki(&[
            list_tiddler(&[
                "<<external [[Foo]]>>",
                "<<external Bar file:\"sub/custom.txt\" keepInternal:true>>",
                "<<external Baz format:yaml>>",
            ]),
            Tiddler::new("Bar").with_text("b"),
        ]);
        wiki.write_file("Foo.txt", "foo");

        let context = WikiContext::resolve(wiki.root(), None).unwrap();
        let store = context.load_store().unwrap();
        let entries = collect_status(&mut context.engine(), &store);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].file_exists, Some(true));
        assert!(!entries[0].in_wiki);
        assert!(entries[1].path.as_deref().unwrap().ends_with("/sub/custom.txt"));
        assert_eq!(entries[1].file_exists, Some(false));
        assert!(entries[1].in_wiki);
        assert!(entries[1].keep_internal);
        assert_eq!(entries[2].path, None);
    }

    #[test]
    fn test_status_without_wiki_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(run_status(temp.path(), None, false).is_err());
    }
}
