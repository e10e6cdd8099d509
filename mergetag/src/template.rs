//! Placeholder templating.
//!
//! Templates contain tokens of the form `{{ name }}`, optionally carrying an
//! inline fallback after a pipe: `{{ name || 'there' }}` or
//! `{{ name | "there" }}`.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::{Map, Value};

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*(.*?)\s*\}\}").expect("placeholder pattern is valid"))
}

/// A single `{{ ... }}` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub key: String,
    /// The inline fallback, with surrounding quotes removed.
    pub default: Option<String>,
}

impl Placeholder {
    /// Parses the text between the braces.
    ///
    /// The key ends at the first `|`. A `||` delimiter counts as one, so any
    /// pipes after it are part of the fallback, kept verbatim: `b | x | y`
    /// falls back to `x | y`, not `x || y`.
    pub fn parse(content: &str) -> Self {
        match content.split_once('|') {
            None => Self {
                key: content.trim().to_string(),
                default: None,
            },
            Some((key, rest)) => {
                let rest = rest.strip_prefix('|').unwrap_or(rest);
                Self {
                    key: key.trim().to_string(),
                    default: Some(unquote(rest.trim()).to_string()),
                }
            }
        }
    }

    /// The text this token renders to given the supplied values. Present
    /// values win, including empty strings and zero; then the fallback; then
    /// nothing.
    pub fn resolve(&self, values: &Map<String, Value>) -> String {
        match values.get(&self.key) {
            Some(value) if !value.is_null() => value.to_string(),
            _ => self.default.clone().unwrap_or_default(),
        }
    }
}

// Strips one pair of matching surrounding quotes.
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Every placeholder in the template, in order of appearance.
pub fn extract_placeholders(template: &str) -> Vec<Placeholder> {
    placeholder_regex()
        .captures_iter(template)
        .map(|caps| Placeholder::parse(&caps[1]))
        .collect()
}

/// Replaces every placeholder in `template` with its value from `values`, or
/// its inline fallback, or the empty string.
///
/// Substituted text is not scanned again, so values containing braces are
/// emitted verbatim.
pub fn fill_template(template: &str, values: &Map<String, Value>) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| {
            Placeholder::parse(&caps[1]).resolve(values)
        })
        .into_owned()
}
