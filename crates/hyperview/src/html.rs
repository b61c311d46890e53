//! HTML fragment parsing.
//!
//! Converts an HTML string into the [`Fragment`] tree consumed by the
//! transformer. Parsing follows the HTML5 fragment algorithm (html5ever via
//! scraper), so implied end tags such as a `<p>` closed by a `<pre>` are
//! resolved the way browsers do.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::{Fragment, Node};

/// Parse an HTML fragment into a node tree.
///
/// # Example
///
/// ```rust
/// use hyperview::parse_html;
///
/// let fragment = parse_html("<p>Hello <i>World</i>");
/// assert_eq!(fragment.children.len(), 1);
/// assert_eq!(fragment.text_content(), "Hello World");
/// ```
pub fn parse_html(html: &str) -> Fragment {
    let document = Html::parse_fragment(html);
    Fragment::new(convert_children(document.root_element()))
}

fn convert_children(element: ElementRef) -> Vec<Node> {
    let mut children = Vec::new();

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                children.push(Node::text(&text.text));
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    children.push(scraper_to_node(child_element));
                }
            }
            _ => {}
        }
    }

    children
}

/// Convert a scraper ElementRef to our Node structure
fn scraper_to_node(element: ElementRef) -> Node {
    let tag = element.value().name();
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();

    let mut node = if attrs.is_empty() {
        Node::element(tag)
    } else {
        Node::element_with_attrs(tag, attrs)
    };

    for child in convert_children(element) {
        node.add_child(child);
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paragraphs() {
        let fragment = parse_html("<p>One<p>Two");
        let tags: Vec<_> = fragment.children.iter().filter_map(Node::tag_name).collect();
        assert_eq!(tags, vec!["p", "p"]);
    }

    #[test]
    fn test_pre_closes_paragraph() {
        let fragment = parse_html("<p>Intro<pre><code>x = 1</code></pre>");
        let tags: Vec<_> = fragment.children.iter().filter_map(Node::tag_name).collect();
        assert_eq!(tags, vec!["p", "pre"]);
    }

    #[test]
    fn test_entities_are_decoded() {
        let fragment = parse_html("<p>a &amp; b &#x27;c&#x27;");
        assert_eq!(fragment.text_content(), "a & b 'c'");
    }

    #[test]
    fn test_attributes_are_kept() {
        let fragment = parse_html(r#"<p><a href="https://example.com" rel="nofollow">x</a>"#);
        let a = &fragment.children[0].children()[0];
        assert_eq!(a.attr("href"), Some("https://example.com"));
        assert_eq!(a.attr("rel"), Some("nofollow"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_html("").children.is_empty());
    }
}
