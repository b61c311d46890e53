//! Leading-punctuation grammar for inferred quotes and list items.
//!
//! Comment HTML carries no `blockquote`/`li` markup; authors type `> `,
//! `- `, `1. `, `[2] ` and similar at the start of a paragraph instead.

use once_cell::sync::Lazy;
use regex::Regex;

static PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^(?P<marker>>{1,5}|[-+*•]|[a-z]\)|\(\d+\)|\d+[)\-]|\[\d+\]:?|[a-z]\.|\d+\.)(?P<space>\s?)(?P<rest>.*)$",
    )
    .unwrap()
});

static REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());

/// A recognized paragraph prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixMatch<'a> {
    /// The marker itself, e.g. `>>`, `-`, `1.`, `[3]:`
    pub marker: &'a str,
    /// Text after the marker and its separating space
    pub rest: &'a str,
}

impl PrefixMatch<'_> {
    pub fn is_quote(&self) -> bool {
        self.marker.contains('>')
    }

    /// Nesting depth of a quote marker, 0 for list markers
    pub fn quote_depth(&self) -> usize {
        self.marker.chars().filter(|c| *c == '>').count()
    }

    pub fn is_reference(&self) -> bool {
        self.marker.starts_with('[')
    }
}

/// Match the start of a paragraph's first text against the prefix grammar.
///
/// Leading whitespace is ignored. A marker glued to further marker
/// characters (`>>>>>>`, `--`, `->`, `**`) is not a prefix, and markers
/// ending in `.` or `-` need a separating space so that `e.g.`, `1.5` and
/// `2-3` stay plain text.
pub fn match_prefix(text: &str) -> Option<PrefixMatch<'_>> {
    let caps = PREFIX.captures(text.trim_start())?;
    let marker = caps.name("marker")?.as_str();
    let spaced = !caps.name("space")?.as_str().is_empty();
    let rest = caps.name("rest")?.as_str();

    if !spaced && !rest.is_empty() {
        if rest.starts_with(['<', '>', '-', '*']) {
            return None;
        }
        if marker.ends_with(['.', '-']) {
            return None;
        }
    }

    Some(PrefixMatch { marker, rest })
}

/// Count `[n]` reference markers in a text
pub fn count_references(text: &str) -> usize {
    REFERENCE.find_iter(text).count()
}
