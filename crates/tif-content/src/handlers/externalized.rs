//! Full-snapshot format: the file holds the tiddler in store-area markup
//!
//! ```text
//! <div title="Foo" creator="Jane" modified="202403091405" tags="a [[b c]]">
//! <pre>escaped text</pre>
//! </div>
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::format::FileFormat;
use crate::tiddler::{Tiddler, format_timestamp, parse_tags, parse_timestamp};

static DIV_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<div\b([^>]*)>").expect("valid div regex"));

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z_][\w.\-]*)="([^"]*)""#).expect("valid attribute regex"));

static PRE_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*<pre>(.*?)</pre>").expect("valid pre regex"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos|nbsp);").expect("valid entity regex")
});

/// Stores every field of the tiddler.
#[derive(Debug, Default)]
pub struct ExternalizedFormat;

impl ExternalizedFormat {
    pub const ID: &'static str = "externalized";

    pub fn new() -> Self {
        Self
    }
}

impl FileFormat for ExternalizedFormat {
    fn id(&self) -> &str {
        Self::ID
    }

    fn extension(&self) -> &str {
        "tid.html"
    }

    fn externalize(&self, tiddler: &Tiddler) -> Result<String> {
        let mut attributes = format!(r#" title="{}""#, html_encode(&tiddler.title));
        if let Some(creator) = &tiddler.creator {
            attributes.push_str(&format!(r#" creator="{}""#, html_encode(creator)));
        }
        if let Some(modifier) = &tiddler.modifier {
            attributes.push_str(&format!(r#" modifier="{}""#, html_encode(modifier)));
        }
        if let Some(created) = &tiddler.created {
            attributes.push_str(&format!(r#" created="{}""#, format_timestamp(created)));
        }
        if let Some(modified) = &tiddler.modified {
            attributes.push_str(&format!(r#" modified="{}""#, format_timestamp(modified)));
        }
        attributes.push_str(&format!(r#" tags="{}""#, html_encode(&tiddler.tag_string())));

        for (name, value) in &tiddler.fields {
            if name.starts_with("temp.") {
                continue;
            }
            attributes.push_str(&format!(
                r#" {}="{}""#,
                name,
                html_encode(&escape_line_breaks(value))
            ));
        }

        Ok(format!(
            "<div{}>\n<pre>{}</pre>\n</div>",
            attributes,
            html_encode(&tiddler.text)
        ))
    }

    fn internalize(&self, tiddler: &mut Tiddler, source: &str) -> Result<()> {
        let open = DIV_OPEN
            .captures(source)
            .ok_or_else(|| Error::parse(Self::ID, "no <div> element found"))?;
        let open_end = open.get(0).map_or(0, |m| m.end());
        let attribute_source = open.get(1).map_or("", |m| m.as_str());

        let body = &source[open_end..];
        let body = match body.rfind("</div>") {
            Some(end) => &body[..end],
            None => return Err(Error::parse(Self::ID, "unterminated <div> element")),
        };

        let mut legacy = false;
        let mut tags = Vec::new();
        let mut fields = std::collections::BTreeMap::new();
        for caps in ATTRIBUTE.captures_iter(attribute_source) {
            let name = &caps[1];
            let value = html_decode(&caps[2]);
            match name {
                "tiddler" => legacy = true,
                "title" => {}
                "creator" => tiddler.creator = Some(value),
                "modifier" => tiddler.modifier = Some(value),
                "created" => {
                    if let Some(at) = parse_timestamp(&value) {
                        tiddler.created = Some(at);
                    }
                }
                "modified" => {
                    if let Some(at) = parse_timestamp(&value) {
                        tiddler.modified = Some(at);
                    }
                }
                "tags" => tags = parse_tags(&value),
                // extended field
                _ => {
                    fields.insert(name.to_string(), unescape_line_breaks(&value));
                }
            }
        }

        tiddler.text = match PRE_BODY.captures(body) {
            Some(pre) => html_decode(&pre[1]),
            None if legacy => unescape_line_breaks(&html_decode(body)),
            None => html_decode(body.trim_matches('\n')),
        };
        tiddler.tags = tags;
        tiddler.fields = fields;
        Ok(())
    }
}

fn html_encode(source: &str) -> String {
    source
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn html_decode(source: &str) -> String {
    ENTITY
        .replace_all(source, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => {
                    let code = if let Some(hex) = entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        entity[1..].parse::<u32>().ok()
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

/// Extended field values live on one line: `\` becomes `\s`, newline `\n`.
fn escape_line_breaks(source: &str) -> String {
    source
        .replace('\\', "\\s")
        .replace('\n', "\\n")
        .replace('\r', "")
}

fn unescape_line_breaks(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('b') => out.push(' '),
                Some('s') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
