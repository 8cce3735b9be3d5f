//! Per-entry outcomes and the batch reports built from them

use serde::{Deserialize, Serialize};

/// What happened to a plugin tiddler after it loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ExtensionStatus {
    /// Handed to the extension loader
    Loaded,
    /// The loader rejected it
    Failed { message: String },
    /// Extensions disabled or no loader installed
    Disabled,
}

/// Result of loading one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum LoadOutcome {
    Loaded {
        path: String,
        /// Present for plugin entries only
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extension: Option<ExtensionStatus>,
    },
    /// The fetch did not succeed
    Failed {
        path: String,
        status: u16,
        message: String,
    },
    /// The entry's format is not registered, so no path could be built
    UnknownFormat { format: String },
    /// The file was read but its content could not be converted
    Unresolvable { path: String, message: String },
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Why an entry was left alone on save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// No tiddler with the entry's name exists
    NoTiddler,
}

/// Result of saving one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum SaveOutcome {
    Written { path: String },
    /// Content matches what was last synced and the file still exists
    Unchanged { path: String },
    Skipped { reason: SkipReason },
    /// The path is not locally writable; nothing was written
    UnsupportedTarget { path: String },
    UnknownFormat { format: String },
    /// Conversion or the write itself failed
    WriteFailed { path: String, message: String },
}

impl SaveOutcome {
    /// Whether this outcome makes the whole save unsuccessful
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::UnknownFormat { .. } | Self::WriteFailed { .. })
    }
}

/// Outcome of one registration entry, tagged with the entry it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReport<T> {
    /// Position in the registration table
    pub index: usize,
    pub name: String,
    pub outcome: T,
}

/// Emitted as soon as one entry finishes loading
pub type LoadEvent = EntryReport<LoadOutcome>;

/// Report from a load pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Entries in completion order
    pub entries: Vec<EntryReport<LoadOutcome>>,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: EntryReport<LoadOutcome>) {
        self.entries.push(entry);
    }

    /// Whether every entry loaded
    pub fn success(&self) -> bool {
        self.entries.iter().all(|e| e.outcome.is_loaded())
    }

    pub fn loaded(&self) -> impl Iterator<Item = &EntryReport<LoadOutcome>> {
        self.entries.iter().filter(|e| e.outcome.is_loaded())
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryReport<LoadOutcome>> {
        self.entries.iter().filter(|e| !e.outcome.is_loaded())
    }

    /// Outcome for the first entry with this name
    pub fn outcome(&self, name: &str) -> Option<&LoadOutcome> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.outcome)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Report from a save pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReport {
    /// False once any entry failed; skipped entries and unsupported
    /// targets do not count as failures
    pub success: bool,
    /// Entries in registration order
    pub entries: Vec<EntryReport<SaveOutcome>>,
}

impl Default for SaveReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveReport {
    pub fn new() -> Self {
        Self {
            success: true,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: EntryReport<SaveOutcome>) {
        if entry.outcome.is_failure() {
            self.success = false;
        }
        self.entries.push(entry);
    }

    pub fn written(&self) -> impl Iterator<Item = &EntryReport<SaveOutcome>> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, SaveOutcome::Written { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryReport<SaveOutcome>> {
        self.entries.iter().filter(|e| e.outcome.is_failure())
    }

    /// Outcome for the first entry with this name
    pub fn outcome(&self, name: &str) -> Option<&SaveOutcome> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.outcome)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn save_entry(name: &str, outcome: SaveOutcome) -> EntryReport<SaveOutcome> {
        EntryReport {
            index: 0,
            name: name.to_string(),
            outcome,
        }
    }

    #[test]
    fn test_save_report_success_ignores_skips() {
        let mut report = SaveReport::new();
        report.push(save_entry(
            "A",
            SaveOutcome::Skipped {
                reason: SkipReason::NoTiddler,
            },
        ));
        report.push(save_entry(
            "B",
            SaveOutcome::UnsupportedTarget {
                path: "http://h/B.txt".into(),
            },
        ));
        assert!(report.success);

        report.push(save_entry(
            "C",
            SaveOutcome::UnknownFormat {
                format: "yaml".into(),
            },
        ));
        assert!(!report.success);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.written().count(), 0);
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = SaveOutcome::Written {
            path: "file:///w/Foo.txt".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"outcome": "written", "path": "file:///w/Foo.txt"})
        );

        let loaded = LoadOutcome::Loaded {
            path: "p".into(),
            extension: None,
        };
        let json = serde_json::to_value(&loaded).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "loaded", "path": "p"}));
    }

    #[test]
    fn test_load_report_queries() {
        let mut report = LoadReport::new();
        report.push(EntryReport {
            index: 1,
            name: "B".into(),
            outcome: LoadOutcome::Failed {
                path: "p".into(),
                status: 404,
                message: "missing".into(),
            },
        });
        report.push(EntryReport {
            index: 0,
            name: "A".into(),
            outcome: LoadOutcome::Loaded {
                path: "q".into(),
                extension: None,
            },
        });

        assert!(!report.success());
        assert_eq!(report.loaded().count(), 1);
        assert!(matches!(
            report.outcome("B"),
            Some(LoadOutcome::Failed { status: 404, .. })
        ));
    }
}
