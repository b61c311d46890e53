//! Plain-text flattening of a render tree

use crate::ast::{CodeBlockContent, LinkLabel, RenderNode};

/// Concatenate all visible text of a render tree.
///
/// Prefix labels are kept and separated from their body by a space, block
/// nodes (paragraphs, code blocks) end with a newline.
pub fn plain_text(nodes: &[RenderNode]) -> String {
    let mut out = String::new();
    write_nodes(nodes, &mut out);
    out.trim_end_matches('\n').to_string()
}

fn write_nodes(nodes: &[RenderNode], out: &mut String) {
    for node in nodes {
        write_node(node, out);
    }
}

fn write_node(node: &RenderNode, out: &mut String) {
    match node {
        RenderNode::Paragraph(p) => {
            start_block(out);
            if let Some(prefix) = &p.prefix {
                out.push_str(prefix);
                out.push(' ');
            }
            write_nodes(&p.children, out);
            out.push('\n');
        }
        RenderNode::Text(run) => out.push_str(&run.text),
        RenderNode::InlineCode(code) => out.push_str(&code.text),
        RenderNode::Span(span) => write_nodes(&span.children, out),
        RenderNode::Link(link) => match &link.label {
            LinkLabel::Text(text) => out.push_str(text),
            LinkLabel::Nodes(nodes) => write_nodes(nodes, out),
        },
        RenderNode::CodeBlock(block) => {
            start_block(out);
            match &block.content {
                CodeBlockContent::Highlighted(_) => out.push_str(&block.raw_text),
                CodeBlockContent::Plain(nodes) => write_nodes(nodes, out),
            }
            out.push('\n');
        }
    }
}

fn start_block(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Collapse runs of whitespace into a single space
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}
