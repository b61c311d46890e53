//! Text helpers shared by the transformer and the highlighter.

use once_cell::sync::Lazy;
use regex::Regex;

/// Backtick span whose content neither starts nor ends with whitespace
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\s](?:[^`]*[^`\s])?`").unwrap());

/// A piece of text split around inline code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    /// Includes the surrounding backticks
    Code(&'a str),
}

/// Split text into plain and inline-code segments, in order
pub fn split_inline_code(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in INLINE_CODE.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::Plain(&text[last..m.start()]));
        }
        segments.push(Segment::Code(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment::Plain(&text[last..]));
    }

    segments
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Remove the indentation shared by all non-blank lines
pub fn strip_indent(text: &str) -> String {
    let min = text
        .split('\n')
        .filter(|line| !is_blank(line))
        .map(indent_width)
        .min()
        .unwrap_or(0);

    if min == 0 {
        return text.to_string();
    }

    text.split('\n')
        .map(|line| {
            if indent_width(line) >= min {
                &line[min..]
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prepare code block text: drop the final line terminator, one leading and
/// one trailing blank line, then the shared indentation
pub fn prepare_code(raw: &str) -> String {
    let text = raw.strip_suffix('\n').unwrap_or(raw);
    let mut lines: Vec<&str> = text.split('\n').collect();

    if lines.len() > 1 && lines.first().is_some_and(|l| is_blank(l)) {
        lines.remove(0);
    }
    if lines.len() > 1 && lines.last().is_some_and(|l| is_blank(l)) {
        lines.pop();
    }

    strip_indent(&lines.join("\n"))
}

/// Whether a URL uses the http or https scheme
pub fn is_http_link(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http:") || lower.starts_with("https:")
}
