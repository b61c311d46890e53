//! Plain-text snippets of API HTML, for previews and notifications.

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

static PRE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<pre[\s>].*?</pre>").unwrap());
static PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<p(?:\s[^>]*)?>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Options for [`snippet`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SnippetOptions {
    /// Drop `<pre>` blocks entirely
    pub remove_pre: bool,
    /// Keep only the first line
    pub single_line: bool,
}

/// Strip an HTML fragment down to plain text.
///
/// Paragraph starts become blank lines, tags are removed and entities
/// decoded afterwards, so escaped markup survives as text.
///
/// ```rust
/// use hyperview::{snippet, SnippetOptions};
///
/// let text = snippet("Hello <i>there</i><p>second &amp; last", SnippetOptions::default());
/// assert_eq!(text, "Hello there\n\nsecond & last");
/// ```
pub fn snippet(html: &str, options: SnippetOptions) -> String {
    let html = if options.remove_pre {
        PRE_BLOCK.replace_all(html, "")
    } else {
        html.into()
    };
    let text = PARAGRAPH.replace_all(&html, "\n\n");
    let text = TAG.replace_all(&text, "");
    let text = decode_html_entities(&text);
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    let text = text.trim();

    if options.single_line {
        text.lines().next().unwrap_or("").trim_end().to_string()
    } else {
        text.to_string()
    }
}
