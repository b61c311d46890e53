//! String-level cleanup of API HTML before parsing.

use html_escape::{decode_html_entities, encode_double_quoted_attribute, encode_text};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static LEADING_PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*<p[\s>]").unwrap());
static LEADING_PARAGRAPH_BEFORE_PRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*<p>\s*<pre>").unwrap());
static PARAGRAPH_BEFORE_PRE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<p>\s*<pre>").unwrap());
static PRE_BEFORE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<pre>\s*<code>").unwrap());
static TEXT_AFTER_PRE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</pre>\s*([^<\s])").unwrap());
static CLOSING_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</a>").unwrap());
static STICKY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(<\w)").unwrap());

/// Protocol-prefixed URLs with a dotted host name or IPv4 address.
/// Hosts without a top-level domain (`localhost`) never match.
static BARE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(?:https?|ftp)://(?:(?:[\p{L}\p{N}](?:[\p{L}\p{N}-]*[\p{L}\p{N}])?\.)+\p{L}{2,}|(?:\d{1,3}\.){3}\d{1,3})(?::\d{2,5})?(?:[/?#](?:[^\s<>"']*[^\s<>"'.,;:!?)\]])?)?"#,
    )
    .unwrap()
});

/// Normalize an HTML fragment for parsing.
///
/// Rules run in order over the whole string:
/// 1. prepend `<p>` when the fragment does not open with a paragraph
/// 2. keep `<pre>` out of paragraphs and glue `<pre>` to its `<code>`
/// 3. open a paragraph after `</pre>` when text follows directly
/// 4. with `linkify`, wrap bare URLs in anchors (see [`linkify`])
pub fn normalize(html: &str, linkify_urls: bool) -> String {
    let html = ensure_leading_paragraph(html);
    let html = tidy_pre(&html);
    let html = TEXT_AFTER_PRE.replace_all(&html, "</pre><p>$1").into_owned();

    if linkify_urls {
        linkify(&html)
    } else {
        html
    }
}

fn ensure_leading_paragraph(html: &str) -> String {
    if LEADING_PARAGRAPH.is_match(html) {
        html.to_string()
    } else {
        format!("<p>{}", html)
    }
}

fn tidy_pre(html: &str) -> String {
    let html = LEADING_PARAGRAPH_BEFORE_PRE.replace(html, "<pre>");
    let html = PARAGRAPH_BEFORE_PRE.replace_all(&html, "<pre>");
    PRE_BEFORE_CODE.replace_all(&html, "<pre><code>").into_owned()
}

/// Decode entities and wrap bare URLs in anchors.
///
/// HTML that already contains anchors is returned unchanged so that no URL
/// is ever wrapped twice.
pub fn linkify(html: &str) -> String {
    if CLOSING_ANCHOR.is_match(html) {
        tracing::warn!(html, "HTML contains anchors and linkify was requested, skipping");
        return html.to_string();
    }

    let decoded = decode_html_entities(html);
    let unstuck = STICKY_TAG.replace_all(&decoded, "\n$1");
    BARE_URL
        .replace_all(&unstuck, |caps: &Captures| {
            let url = &caps[0];
            format!(
                "<a href=\"{}\">{}</a>",
                encode_double_quoted_attribute(url),
                encode_text(url)
            )
        })
        .into_owned()
}

/// Find bare URLs in text
pub fn find_urls(text: &str) -> Vec<&str> {
    BARE_URL.find_iter(text).map(|m| m.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepends_paragraph() {
        assert_eq!(normalize("Hello", false), "<p>Hello");
        assert_eq!(normalize("<p>Hello", false), "<p>Hello");
        assert_eq!(normalize("  <P class=\"x\">Hello", false), "  <P class=\"x\">Hello");
    }

    #[test]
    fn test_paragraph_prefix_is_not_a_tag_prefix() {
        assert_eq!(normalize("<pre>x</pre>", false), "<pre>x</pre>");
        assert_eq!(normalize("<param>", false), "<p><param>");
    }

    #[test]
    fn test_pre_is_lifted_out_of_paragraph() {
        assert_eq!(
            normalize("Intro<p> <pre>\n<code>x</code></pre>", false),
            "<p>Intro<pre><code>x</code></pre>"
        );
    }

    #[test]
    fn test_text_after_pre_opens_paragraph() {
        assert_eq!(
            normalize("<p>a<pre><code>x</code></pre>\nafter", false),
            "<p>a<pre><code>x</code></pre><p>after"
        );
        assert_eq!(
            normalize("<p>a<pre><code>x</code></pre><p>after", false),
            "<p>a<pre><code>x</code></pre><p>after"
        );
    }

    #[test]
    fn test_linkify_wraps_urls() {
        let html = normalize("see https://example.com/a?b=1&amp;c=2.", true);
        assert!(html.contains(
            r#"<a href="https://example.com/a?b=1&amp;c=2">https://example.com/a?b=1&amp;c=2</a>."#
        ));
    }

    #[test]
    fn test_linkify_decodes_entities() {
        let html = linkify("https:&#x2F;&#x2F;example.com&#x2F;x");
        assert_eq!(
            html,
            r#"<a href="https://example.com/x">https://example.com/x</a>"#
        );
    }

    #[test]
    fn test_linkify_skips_existing_anchors() {
        let html = r#"<p>http://a.com <a href="http://b.com">b</a>"#;
        assert_eq!(linkify(html), html);
    }

    #[test]
    fn test_linkify_unsticks_tags() {
        assert_eq!(linkify("a<p>b"), "a\n<p>b");
    }

    #[test]
    fn test_url_pattern() {
        assert_eq!(
            find_urls("go to http://example.com, or https://news.ycombinator.com/item?id=1"),
            vec!["http://example.com", "https://news.ycombinator.com/item?id=1"]
        );
        assert!(find_urls("http://localhost:8080/x").is_empty());
        assert!(find_urls("example.com").is_empty());
        assert_eq!(find_urls("http://10.0.0.1:80/"), vec!["http://10.0.0.1:80/"]);
    }
}
