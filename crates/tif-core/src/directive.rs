//! Registration directives in the list tiddler
//!
//! The list tiddler holds markup like
//!
//! ```text
//! <<external [[MyLog]] file:"../logs/" format:externalized keepInternal:true>>
//! ```
//!
//! Rendering it in the host registers each directive. Here the markup is
//! scanned directly: every `<<external ...>>` outside code blocks and
//! comments counts as one directive.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tif_content::TextFormat;

use crate::registration::Registration;

/// Conventional title of the tiddler listing the external tiddlers
pub const LIST_TIDDLER: &str = "ExternalTiddlersList";

/// Macro name of a registration directive
pub const MACRO_NAME: &str = "external";

static INERT_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{\{.*?\}\}\}|/%.*?%/").expect("valid inert markup regex"));

static MACRO_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<<external((?:[^>]|>[^>])*)>>").expect("valid macro regex")
});

const TOKEN: &str = r#"(?:"((?:\\"|[^"])+)"|'((?:\\'|[^'])+)'|\[\[([\s\S]*?)\]\]|\{\{([\s\S]*?)\}\}|([^"':\s][^\s:]*)|(""|''))"#;

static PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\s*{TOKEN}\s*(?:(:)\s*{TOKEN})?")).expect("valid parameter regex")
});

/// One `<<external>>` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The whole macro call as written
    pub source: String,
    /// Everything between the macro name and the closing `>>`
    pub params: String,
}

/// A parsed macro parameter; `name` is `None` for positional values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    pub value: String,
}

/// Find every registration directive in list markup, in order.
pub fn scan_directives(markup: &str) -> Vec<Directive> {
    let live = INERT_MARKUP.replace_all(markup, "");
    MACRO_CALL
        .captures_iter(&live)
        .filter_map(|caps| {
            let params = caps.get(1).map_or("", |m| m.as_str());
            // `<<externalFoo>>` is a different macro
            if !params.is_empty() && !params.starts_with(char::is_whitespace) {
                return None;
            }
            Some(Directive {
                source: caps[0].to_string(),
                params: params.trim().to_string(),
            })
        })
        .collect()
}

fn token_value(caps: &Captures<'_>, first_group: usize) -> Option<String> {
    (first_group..first_group + 6).find_map(|group| {
        caps.get(group).map(|m| {
            let raw = m.as_str();
            match group - first_group {
                0 => raw.replace("\\\"", "\""),
                1 => raw.replace("\\'", "'"),
                5 => String::new(),
                _ => raw.to_string(),
            }
        })
    })
}

/// Split a macro parameter string into positional and `name:value` params.
pub fn parse_params(source: &str) -> Vec<Param> {
    PARAM
        .captures_iter(source)
        .filter_map(|caps| {
            let first = token_value(&caps, 1)?;
            if caps.get(7).is_some() {
                let value = token_value(&caps, 8).unwrap_or_default();
                Some(Param {
                    name: Some(first),
                    value,
                })
            } else {
                Some(Param {
                    name: None,
                    value: first,
                })
            }
        })
        .collect()
}

fn named<'a>(params: &'a [Param], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|p| p.name.as_deref() == Some(name))
        .map(|p| p.value.as_str())
}

fn flag(params: &[Param], name: &str) -> bool {
    named(params, name).is_some_and(|value| !value.is_empty() && value != "false")
}

/// Build a registration from a directive's parameter string.
///
/// Returns `None` when no tiddler name is given; such directives register
/// nothing.
pub fn parse_registration(params: &str, default_format: &str) -> Option<Registration> {
    let params = parse_params(params);
    let name = params
        .iter()
        .find(|p| p.name.is_none() || p.name.as_deref() == Some("tiddler"))
        .map(|p| p.value.clone())
        .filter(|name| !name.is_empty())?;

    Some(
        Registration::new(name)
            .with_file(named(&params, "file").unwrap_or_default())
            .with_format(named(&params, "format").unwrap_or(default_format))
            .with_plugin(flag(&params, "plugin"))
            .with_keep_internal(flag(&params, "keepInternal")),
    )
}

/// Canonical directive text for a registration.
pub fn render_directive(registration: &Registration) -> String {
    let mut out = format!("<<{} [[{}]]", MACRO_NAME, registration.name);
    if !registration.file.is_empty() {
        if registration.file.contains('"') {
            out.push_str(&format!(" file:[[{}]]", registration.file));
        } else {
            out.push_str(&format!(" file:\"{}\"", registration.file));
        }
    }
    if registration.format != TextFormat::ID {
        out.push_str(&format!(" format:{}", registration.format));
    }
    if registration.plugin {
        out.push_str(" plugin:true");
    }
    if registration.keep_internal {
        out.push_str(" keepInternal:true");
    }
    out.push_str(">>");
    out
}
