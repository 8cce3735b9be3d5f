//! Extension (plugin) tiddlers
//!
//! The engine never evaluates code itself. Plugin tiddlers are handed to an
//! [`ExtensionLoader`] supplied by the host; without one, plugin entries load
//! like any other tiddler.

use std::cell::RefCell;
use std::rc::Rc;

use tif_content::Tiddler;

/// Tag that marks a tiddler as an extension for the host
pub const PLUGIN_TAG: &str = "systemConfig";

/// Host capability to evaluate extension tiddlers
pub trait ExtensionLoader {
    /// Evaluate one extension. The error is the loader's diagnostic.
    fn load_extension(&mut self, tiddler: &Tiddler) -> std::result::Result<(), String>;

    /// Called after each extension load so the host can redraw.
    fn refresh(&mut self) {}
}

/// Loader that only records what it was given.
///
/// Clones share one log, so a host can keep a handle while the engine owns
/// the loader.
#[derive(Debug, Clone, Default)]
pub struct DeferredLoader {
    log: Rc<RefCell<LoaderLog>>,
}

#[derive(Debug, Default)]
struct LoaderLog {
    loaded: Vec<(String, String)>,
    refreshes: usize,
}

impl DeferredLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Titles in load order
    pub fn titles(&self) -> Vec<String> {
        self.log
            .borrow()
            .loaded
            .iter()
            .map(|(title, _)| title.clone())
            .collect()
    }

    /// Source text recorded for a title
    pub fn source(&self, title: &str) -> Option<String> {
        self.log
            .borrow()
            .loaded
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, source)| source.clone())
    }

    pub fn refreshes(&self) -> usize {
        self.log.borrow().refreshes
    }
}

impl ExtensionLoader for DeferredLoader {
    fn load_extension(&mut self, tiddler: &Tiddler) -> std::result::Result<(), String> {
        tracing::debug!(title = %tiddler.title, "deferred extension");
        self.log
            .borrow_mut()
            .loaded
            .push((tiddler.title.clone(), tiddler.text.clone()));
        Ok(())
    }

    fn refresh(&mut self) {
        self.log.borrow_mut().refreshes += 1;
    }
}

/// Prepare a freshly loaded plugin tiddler for the host.
///
/// Tags it [`PLUGIN_TAG`]. When the text has an `Author` slice, it fills
/// in a missing creator and a missing modifier.
pub fn prepare_plugin(tiddler: &mut Tiddler) {
    tiddler.push_unique_tag(PLUGIN_TAG);
    if let Some(author) = tiddler.slice("Author") {
        if tiddler.creator.is_none() {
            tiddler.creator = Some(author);
        }
        if tiddler.modifier.is_none() {
            tiddler.modifier = tiddler.creator.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prepare_plugin_borrows_author() {
        let mut tiddler = Tiddler::new("MyPlugin").with_text("|Author|Jane|\n|Version|1.0|\ncode();");
        prepare_plugin(&mut tiddler);

        assert_eq!(tiddler.tags, vec!["systemConfig"]);
        assert_eq!(tiddler.creator.as_deref(), Some("Jane"));
        assert_eq!(tiddler.modifier.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_prepare_plugin_keeps_existing_fields() {
        let mut tiddler = Tiddler::new("P")
            .with_text("Author: Someone")
            .with_tags(["systemConfig", "x"]);
        tiddler.creator = Some("Jane".into());
        tiddler.modifier = Some("John".into());

        prepare_plugin(&mut tiddler);

        assert_eq!(tiddler.tags, vec!["systemConfig", "x"]);
        assert_eq!(tiddler.creator.as_deref(), Some("Jane"));
        assert_eq!(tiddler.modifier.as_deref(), Some("John"));
    }

    #[test]
    fn test_prepare_plugin_without_author() {
        let mut tiddler = Tiddler::new("P").with_text("code();");
        prepare_plugin(&mut tiddler);
        assert_eq!(tiddler.creator, None);
        assert_eq!(tiddler.modifier, None);
    }

    #[test]
    fn test_deferred_loader_clones_share_log() {
        let handle = DeferredLoader::new();
        let mut loader = handle.clone();
        loader
            .load_extension(&Tiddler::new("A").with_text("a();"))
            .unwrap();
        loader.refresh();

        assert_eq!(handle.titles(), vec!["A"]);
        assert_eq!(handle.source("A").as_deref(), Some("a();"));
        assert_eq!(handle.source("B"), None);
        assert_eq!(handle.refreshes(), 1);
    }
}
