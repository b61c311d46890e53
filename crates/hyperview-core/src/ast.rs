//! Render tree
//!
//! The nodes produced by one transform call. A tree is rebuilt from scratch
//! for every HTML input and is never mutated after construction.

use std::fmt;

use crate::style::{Rgba, Style};

/// A node of the render tree
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    /// Block of inline content, optionally inferred as a list item or quote
    Paragraph(Paragraph),

    /// Plain text with its style context
    Text(TextRun),

    /// Backtick-delimited span rendered in monospace
    InlineCode(InlineCode),

    /// Generic styled container keyed by tag name (`i`, unknown tags, ...)
    Span(Span),

    /// Interactive link; activation is handled by the link resolver
    Link(Link),

    /// Scrollable code block, highlighted or plain
    CodeBlock(CodeBlock),
}

/// Style variant of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParagraphVariant {
    #[default]
    Normal,
    Blockquote,
    ListItem,
}

impl ParagraphVariant {
    /// Style table key for this variant
    pub fn style_key(&self) -> &'static str {
        match self {
            ParagraphVariant::Normal => "p",
            ParagraphVariant::Blockquote => "blockquote",
            ParagraphVariant::ListItem => "li",
        }
    }
}

/// A paragraph with an optional prefix label (`>`, `-`, `1.`, `[2]` ...)
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub variant: ParagraphVariant,

    /// Label rendered separately from the body text
    pub prefix: Option<String>,

    /// Set when the previous sibling was a blockquote too, so the two are
    /// drawn as one quote
    pub collapse_spacing: bool,

    pub style: Style,
    pub font_size: f32,
    pub children: Vec<RenderNode>,
}

impl Paragraph {
    pub fn normal(children: Vec<RenderNode>, font_size: f32) -> Self {
        Self {
            variant: ParagraphVariant::Normal,
            prefix: None,
            collapse_spacing: false,
            style: Style::default(),
            font_size,
            children,
        }
    }

    pub fn blockquote(prefix: Option<&str>, children: Vec<RenderNode>, font_size: f32) -> Self {
        Self {
            variant: ParagraphVariant::Blockquote,
            prefix: prefix.map(str::to_string),
            collapse_spacing: false,
            style: Style::default(),
            font_size,
            children,
        }
    }

    pub fn list_item(prefix: &str, children: Vec<RenderNode>, font_size: f32) -> Self {
        Self {
            variant: ParagraphVariant::ListItem,
            prefix: Some(prefix.to_string()),
            collapse_spacing: false,
            style: Style::default(),
            font_size,
            children,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn is_blockquote(&self) -> bool {
        self.variant == ParagraphVariant::Blockquote
    }
}

/// Style context of a text run
#[derive(Debug, Clone, PartialEq)]
pub struct TextContext {
    /// Tag of the element that directly contains the text, `None` at the root
    pub parent_tag: Option<String>,
    pub font_size: f32,
    /// Preformatted text inside `code`/`pre`
    pub code: bool,
}

impl TextContext {
    pub fn new(parent_tag: Option<&str>, font_size: f32) -> Self {
        Self {
            parent_tag: parent_tag.map(str::to_string),
            font_size,
            code: false,
        }
    }

    pub fn code(parent_tag: Option<&str>, font_size: f32) -> Self {
        Self {
            code: true,
            ..Self::new(parent_tag, font_size)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub context: TextContext,
}

impl TextRun {
    pub fn new(text: impl Into<String>, context: TextContext) -> Self {
        Self {
            text: text.into(),
            context,
        }
    }
}

/// Inline code, backticks included
#[derive(Debug, Clone, PartialEq)]
pub struct InlineCode {
    pub text: String,
    pub style: Style,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub tag: String,
    pub style: Style,
    pub font_size: f32,
    pub children: Vec<RenderNode>,
}

/// Link label: either the anchor's raw text or its transformed children
#[derive(Debug, Clone, PartialEq)]
pub enum LinkLabel {
    Text(String),
    Nodes(Vec<RenderNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub url: String,
    pub label: LinkLabel,
    /// Queried from the visited-links store at render time
    pub visited: bool,
    /// `a` or `a-visited` from the style table
    pub style: Style,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Code text with shared indentation and blank edge lines removed
    pub raw_text: String,
    pub style: Style,
    pub content: CodeBlockContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CodeBlockContent {
    /// Highlighting disabled: the transformed children of the `pre`
    Plain(Vec<RenderNode>),
    Highlighted(Highlighted),
}

impl CodeBlock {
    /// Long-press diagnostics for this block
    pub fn info(&self) -> CodeBlockInfo {
        let (language, second_best) = match &self.content {
            CodeBlockContent::Highlighted(h) => (
                Some(LanguageGuess {
                    language: h.language.clone(),
                    relevance: h.relevance,
                }),
                h.second_best.clone(),
            ),
            CodeBlockContent::Plain(_) => (None, None),
        };
        CodeBlockInfo {
            characters: self.raw_text.chars().count(),
            lines: self.raw_text.split('\n').count(),
            language,
            second_best,
        }
    }
}

/// A language detection candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageGuess {
    pub language: String,
    pub relevance: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Highlighted {
    /// Detected language, `"plaintext"` when nothing scored
    pub language: String,
    pub relevance: u32,
    pub second_best: Option<LanguageGuess>,
    pub runs: Vec<HighlightRun>,
}

/// A flat run of highlighted text
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightRun {
    pub text: String,
    /// Scope names from outermost to innermost
    pub class_path: Vec<String>,
    pub color: Rgba,
}

/// Character/line statistics and detection results for a code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockInfo {
    pub characters: usize,
    pub lines: usize,
    pub language: Option<LanguageGuess>,
    pub second_best: Option<LanguageGuess>,
}

impl CodeBlockInfo {
    pub fn title(&self) -> String {
        format!(
            "Characters: {}  Lines: {}",
            group_thousands(self.characters),
            group_thousands(self.lines)
        )
    }

    pub fn message(&self) -> Option<String> {
        let first = self.language.as_ref()?;
        let mut message = format!(
            "Detected languages (relevance score):\n{} ({})",
            first.language.to_uppercase(),
            first.relevance
        );
        if let Some(second) = &self.second_best {
            message.push_str(&format!(
                ", {} ({})",
                second.language.to_uppercase(),
                second.relevance
            ));
        }
        Some(message)
    }
}

impl fmt::Display for CodeBlockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())?;
        if let Some(message) = self.message() {
            write!(f, "\n{}", message)?;
        }
        Ok(())
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl RenderNode {
    /// Check if this node renders no visible text
    pub fn is_blank(&self) -> bool {
        match self {
            RenderNode::Paragraph(p) => p.prefix.is_none() && p.children.iter().all(|c| c.is_blank()),
            RenderNode::Text(run) => run.text.trim().is_empty(),
            RenderNode::InlineCode(code) => code.text.is_empty(),
            RenderNode::Span(span) => span.children.iter().all(|c| c.is_blank()),
            RenderNode::Link(_) => false,
            RenderNode::CodeBlock(block) => block.raw_text.trim().is_empty(),
        }
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            RenderNode::Paragraph(p) => Some(p),
            _ => None,
        }
    }
}
