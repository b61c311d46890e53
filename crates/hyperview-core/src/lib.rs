//! hyperview-core - render tree and styling primitives
//!
//! This crate provides the data structures produced by the `hyperview`
//! renderer: a tree of styled, interactive display nodes that a presentation
//! layer maps onto its own visual primitives.
//!
//! # Architecture
//!
//! ```text
//! HTML fragment ──normalize──▶ ┌─────────────┐
//!                              │ parser tree │ ──transform──▶ Render tree
//!                              └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use hyperview_core::{plain_text, Paragraph, RenderNode, TextContext, TextRun};
//!
//! let tree = vec![RenderNode::Paragraph(Paragraph::list_item(
//!     "1.",
//!     vec![RenderNode::Text(TextRun::new("first item", TextContext::new(Some("p"), 15.0)))],
//!     15.0,
//! ))];
//!
//! assert_eq!(plain_text(&tree), "1. first item");
//! ```

mod ast;
mod options;
mod style;
mod text;

pub use ast::{
    CodeBlock, CodeBlockContent, CodeBlockInfo, Highlighted, HighlightRun, InlineCode,
    LanguageGuess, Link, LinkLabel, Paragraph, ParagraphVariant, RenderNode, Span, TextContext,
    TextRun,
};
pub use options::{ColorScheme, RenderOptions, BASE_FONT_SIZE};
pub use style::{Rgba, Style, StyleTable, Themed};
pub use text::{collapse_whitespace, plain_text};
