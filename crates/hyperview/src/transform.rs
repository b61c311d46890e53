//! Convert a parsed fragment into the render tree
//!
//! This module walks the [`Node`] tree produced by the parser and builds the
//! render nodes defined in hyperview-core. The walk is a pure function of
//! the input tree, the context and the options: prefix stripping builds a
//! substituted copy of a paragraph's children instead of editing the tree.

use hyperview_core::{
    CodeBlock, CodeBlockContent, InlineCode, Link, LinkLabel, Paragraph, RenderNode,
    RenderOptions, Span, StyleTable, TextContext, TextRun,
};

use crate::highlight::highlight_node;
use crate::link::VisitedLinks;
use crate::node::{Element, Node, Tag};
use crate::prefix::{count_references, match_prefix};
use crate::utilities::{prepare_code, split_inline_code, strip_indent, Segment};

/// Position of a node list in the tree
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    /// Tag of the element whose children are transformed, `None` at the root
    pub parent_tag: Option<String>,
    /// Nesting depth, 0 at the root
    pub level: usize,
    pub font_size: f32,
}

impl Context {
    pub fn root(font_size: f32) -> Self {
        Self {
            parent_tag: None,
            level: 0,
            font_size,
        }
    }

    fn child(&self, tag: &str, font_size: f32) -> Self {
        Self {
            parent_tag: Some(tag.to_string()),
            level: self.level + 1,
            font_size,
        }
    }

    fn is_root(&self) -> bool {
        self.level == 0 && self.parent_tag.is_none()
    }

    /// Text below `pre` or `code` is preformatted
    fn is_code(&self) -> bool {
        matches!(self.parent_tag.as_deref(), Some("pre" | "code"))
    }
}

/// Tree transformer bound to one set of options
pub struct Transformer<'a> {
    options: &'a RenderOptions,
    styles: &'a StyleTable,
    visited: Option<&'a dyn VisitedLinks>,
}

impl<'a> Transformer<'a> {
    pub fn new(options: &'a RenderOptions, styles: &'a StyleTable) -> Self {
        Self {
            options,
            styles,
            visited: None,
        }
    }

    /// Query this store for the visited state of links
    pub fn with_visited(mut self, visited: &'a dyn VisitedLinks) -> Self {
        self.visited = Some(visited);
        self
    }

    /// Transform a sibling list.
    ///
    /// Returns `None` when the list produces nothing, so that empty
    /// containers vanish instead of rendering as blank space.
    pub fn transform(&self, nodes: &[Node], ctx: &Context) -> Option<Vec<RenderNode>> {
        if nodes.is_empty() {
            return None;
        }

        // Accumulator: whether the previous rendered sibling was a blockquote
        let (rendered, _) = nodes.iter().fold(
            (Vec::new(), false),
            |(mut rendered, after_quote), node| {
                let produced = self.transform_node(node, ctx, after_quote);
                let after_quote = match produced.last() {
                    Some(RenderNode::Paragraph(p)) => p.is_blockquote(),
                    Some(last) if !last.is_blank() => false,
                    _ => after_quote,
                };
                rendered.extend(produced);
                (rendered, after_quote)
            },
        );

        if rendered.is_empty() {
            None
        } else {
            Some(rendered)
        }
    }

    fn transform_node(&self, node: &Node, ctx: &Context, after_quote: bool) -> Vec<RenderNode> {
        match node {
            Node::Text(text) => self.transform_text(text, ctx),
            Node::Element(element) => match element.tag() {
                Tag::Pre => self.transform_pre(node, element, ctx),
                Tag::A => self.transform_link(element, ctx),
                Tag::P => self.transform_paragraph(element, ctx, after_quote),
                Tag::Code => {
                    let code_ctx = ctx.child("code", self.options.code_font_size());
                    self.span(element, &code_ctx)
                }
                Tag::I | Tag::Other => {
                    let child_ctx = ctx.child(&element.tag_name, ctx.font_size);
                    self.span(element, &child_ctx)
                }
            },
        }
    }

    fn span(&self, element: &Element, child_ctx: &Context) -> Vec<RenderNode> {
        match self.transform(&element.children, child_ctx) {
            Some(children) => vec![RenderNode::Span(Span {
                tag: element.tag_name.clone(),
                style: self.styles.resolve(&element.tag_name),
                font_size: child_ctx.font_size,
                children,
            })],
            None => Vec::new(),
        }
    }

    fn transform_text(&self, text: &str, ctx: &Context) -> Vec<RenderNode> {
        let parent = ctx.parent_tag.as_deref();

        if ctx.is_code() {
            let code = strip_indent(text);
            let code = code.strip_suffix('\n').unwrap_or(&code);
            if code.is_empty() {
                return Vec::new();
            }
            return vec![RenderNode::Text(TextRun::new(
                code,
                TextContext::code(parent, ctx.font_size),
            ))];
        }

        if ctx.is_root() && text.trim().is_empty() {
            return Vec::new();
        }

        let collapsed = collapse_spaces(text);
        let runs: Vec<RenderNode> = split_inline_code(&collapsed)
            .into_iter()
            .map(|segment| match segment {
                Segment::Plain(plain) => {
                    RenderNode::Text(TextRun::new(plain, TextContext::new(parent, ctx.font_size)))
                }
                Segment::Code(code) => RenderNode::InlineCode(InlineCode {
                    text: code.to_string(),
                    style: self.styles.resolve("inline-code"),
                    font_size: self.options.code_font_size(),
                }),
            })
            .collect();

        if ctx.is_root() && !runs.is_empty() {
            return vec![self.styled(Paragraph::normal(runs, ctx.font_size))];
        }
        runs
    }

    fn transform_pre(&self, node: &Node, element: &Element, ctx: &Context) -> Vec<RenderNode> {
        let pre_ctx = ctx.child("pre", self.options.code_font_size());
        let mut fallback = self.transform(&element.children, &pre_ctx).unwrap_or_default();
        trim_leading_blank_line(&mut fallback);
        let raw_text = prepare_code(&element_text(element));
        let style = self.styles.resolve("pre");

        if fallback.is_empty() && raw_text.trim().is_empty() {
            return Vec::new();
        }

        let block = if self.options.syntax_highlighting {
            match highlight_node(node, self.options.color_scheme) {
                Ok((code, highlighted)) => CodeBlock {
                    raw_text: code,
                    style,
                    content: CodeBlockContent::Highlighted(highlighted),
                },
                Err(error) => {
                    tracing::warn!(%error, "highlighting failed, rendering plain code block");
                    CodeBlock {
                        raw_text,
                        style,
                        content: CodeBlockContent::Plain(fallback),
                    }
                }
            }
        } else {
            CodeBlock {
                raw_text,
                style,
                content: CodeBlockContent::Plain(fallback),
            }
        };

        vec![RenderNode::CodeBlock(block)]
    }

    fn transform_link(&self, element: &Element, ctx: &Context) -> Vec<RenderNode> {
        let link_ctx = ctx.child("a", ctx.font_size);
        let Some(url) = element.attr("href") else {
            return self.span(element, &link_ctx);
        };

        let label = match element.children.as_slice() {
            [Node::Text(text)] => LinkLabel::Text(text.clone()),
            children => LinkLabel::Nodes(self.transform(children, &link_ctx).unwrap_or_default()),
        };
        let visited = self.visited.is_some_and(|v| v.is_visited(url));
        let style = self.styles.resolve(if visited { "a-visited" } else { "a" });

        vec![RenderNode::Link(Link {
            url: url.to_string(),
            label,
            visited,
            style,
            font_size: ctx.font_size,
        })]
    }

    fn transform_paragraph(
        &self,
        element: &Element,
        ctx: &Context,
        after_quote: bool,
    ) -> Vec<RenderNode> {
        let p_ctx = ctx.child("p", self.options.font_size);
        let font_size = p_ctx.font_size;

        // A paragraph that is entirely italic is a quote without punctuation
        if let Some(only) = sole_element(&element.children) {
            if only.tag() == Tag::I && !only.children.is_empty() {
                let Some(children) = self.transform(&element.children, &p_ctx) else {
                    return Vec::new();
                };
                if children.iter().all(RenderNode::is_blank) {
                    return Vec::new();
                }
                let mut quote = Paragraph::blockquote(None, children, font_size);
                quote.collapse_spacing = after_quote;
                return vec![self.styled(quote)];
            }
        }

        if let Some(path) = first_text(&element.children) {
            let text = path.text(&element.children);
            if let Some(prefix) = match_prefix(text) {
                let multi_reference = prefix.is_reference()
                    && count_references(&element_text(element)) >= 2;

                if !multi_reference {
                    let substituted = path.substitute(&element.children, prefix.rest);
                    let children = self.transform(&substituted, &p_ctx).unwrap_or_default();

                    let paragraph = if prefix.is_quote() {
                        let mut quote = Paragraph::blockquote(Some(prefix.marker), children, font_size);
                        quote.collapse_spacing = after_quote;
                        quote
                    } else {
                        Paragraph::list_item(prefix.marker, children, font_size)
                    };
                    return vec![self.styled(paragraph)];
                }
            }
        }

        match self.transform(&element.children, &p_ctx) {
            Some(children) if !children.iter().all(RenderNode::is_blank) => {
                vec![self.styled(Paragraph::normal(children, font_size))]
            }
            _ => Vec::new(),
        }
    }

    fn styled(&self, paragraph: Paragraph) -> RenderNode {
        let style = self.styles.resolve(paragraph.variant.style_key());
        RenderNode::Paragraph(paragraph.with_style(style))
    }
}

/// The only element among `children`, ignoring whitespace-only text
fn sole_element(children: &[Node]) -> Option<&Element> {
    let mut significant = children.iter().filter(|c| !is_whitespace_text(c));
    match (significant.next(), significant.next()) {
        (Some(Node::Element(element)), None) => Some(element),
        _ => None,
    }
}

/// Drop a leading line that holds only whitespace from a code fallback
fn trim_leading_blank_line(nodes: &mut [RenderNode]) {
    let Some(first) = nodes.first_mut() else {
        return;
    };
    let run = match first {
        RenderNode::Text(run) => run,
        RenderNode::Span(span) => match span.children.first_mut() {
            Some(RenderNode::Text(run)) => run,
            _ => return,
        },
        _ => return,
    };
    if let Some((line, rest)) = run.text.split_once('\n') {
        if line.trim().is_empty() && !rest.is_empty() {
            run.text = rest.to_string();
        }
    }
}

/// Location of a paragraph's first text, at most one `i` deep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextPath {
    Direct(usize),
    Italic(usize, usize),
}

impl TextPath {
    fn text<'n>(&self, children: &'n [Node]) -> &'n str {
        let node = match *self {
            TextPath::Direct(i) => children.get(i),
            TextPath::Italic(i, j) => children.get(i).and_then(|c| c.children().get(j)),
        };
        node.and_then(Node::as_text).unwrap_or("")
    }

    /// Copy of `children` with the addressed text replaced
    fn substitute(&self, children: &[Node], text: &str) -> Vec<Node> {
        let mut substituted = children.to_vec();
        match *self {
            TextPath::Direct(i) => substituted[i] = Node::text(text),
            TextPath::Italic(i, j) => {
                if let Node::Element(italic) = &mut substituted[i] {
                    italic.children[j] = Node::text(text);
                }
            }
        }
        substituted
    }
}

fn first_text(children: &[Node]) -> Option<TextPath> {
    let (i, first) = children
        .iter()
        .enumerate()
        .find(|(_, c)| !is_whitespace_text(c))?;

    match first {
        Node::Text(_) => Some(TextPath::Direct(i)),
        Node::Element(element) if element.tag() == Tag::I => {
            let (j, inner) = element
                .children
                .iter()
                .enumerate()
                .find(|(_, c)| !is_whitespace_text(c))?;
            inner.is_text().then_some(TextPath::Italic(i, j))
        }
        Node::Element(_) => None,
    }
}

fn is_whitespace_text(node: &Node) -> bool {
    node.as_text().is_some_and(|t| t.trim().is_empty())
}

fn element_text(element: &Element) -> String {
    element.children.iter().map(Node::text_content).collect()
}

fn collapse_spaces(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_run = false;

    for c in text.chars() {
        if matches!(c, ' ' | '\n' | '\t' | '\r') {
            if !in_run {
                result.push(' ');
                in_run = true;
            }
        } else {
            result.push(c);
            in_run = false;
        }
    }

    result
}
