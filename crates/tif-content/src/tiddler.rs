//! The tiddler record model
//!
//! A tiddler is the unit the host wiki stores: a titled text body with tags,
//! attribution, timestamps and free-form extended fields.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Timestamp layout used by the host's native serialization.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

static TAG_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]]*)\]\]|(\S+)").expect("valid tag regex"));

/// A single wiki record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tiddler {
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Extended fields not covered by the core attributes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    /// Keeps the record out of the host's own durable store.
    ///
    /// Set for externalized records whose only persistent copy is their file.
    #[serde(skip)]
    pub do_not_save: bool,
}

impl Tiddler {
    /// Create an empty tiddler with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the text body (builder pattern).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the tags (builder pattern).
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Vec::new();
        for tag in tags {
            self.push_unique_tag(tag);
        }
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag unless already present. Returns whether it was added.
    pub fn push_unique_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.has_tag(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Tags in the host's bracketed list syntax: `one [[two words]]`.
    pub fn tag_string(&self) -> String {
        self.tags
            .iter()
            .map(|tag| {
                if tag.contains(char::is_whitespace) {
                    format!("[[{tag}]]")
                } else {
                    tag.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Read a named slice from the text.
    ///
    /// Slices are either table rows (`|Author|Jane|`) or `Name: value` lines.
    pub fn slice(&self, name: &str) -> Option<String> {
        let name = regex::escape(name);
        let table_row = Regex::new(&format!(r"(?m)^\|\s*~?{name}:?\s*\|\s*([^|\n]*?)\s*\|\s*$"))
            .ok()?;
        let colon_line = Regex::new(&format!(r"(?m)^~?{name}:[ \t]*(.*?)[ \t]*$")).ok()?;

        table_row
            .captures(&self.text)
            .or_else(|| colon_line.captures(&self.text))
            .map(|caps| caps[1].to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Parse a bracketed tag list (`one [[two words]] three`).
pub fn parse_tags(source: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for caps in TAG_TOKEN.captures_iter(source) {
        let tag = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Format a timestamp the way the host serializes it.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a host timestamp (`YYYYMMDDHHMM`, optionally with seconds).
pub fn parse_timestamp(source: &str) -> Option<DateTime<Utc>> {
    let source = source.trim();
    let minutes = source.get(..12)?;
    NaiveDateTime::parse_from_str(minutes, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
