//! # hyperview
//!
//! Render the HTML fragments of a news aggregator's content API (story
//! bodies, comment bodies, user "about" text) into a tree of styled,
//! interactive display nodes.
//!
//! ## Design
//!
//! The API emits a small, loosely structured vocabulary: `p`, `a`, `i`,
//! `pre` and `code`. Lists and quotes carry no markup at all; authors type
//! `> `, `- ` or `1. ` at the start of a paragraph. Rendering therefore runs
//! in three steps:
//!
//! - **Normalize**: string-level fixes (missing first `<p>`, text swallowed
//!   after `</pre>`, optional linkification)
//! - **Parse**: an HTML5 fragment parse into a generic [`Node`] tree
//! - **Transform**: tag rules, prefix-based quote and list inference,
//!   inline-code splitting and code block highlighting
//!
//! Link activation is not decided while rendering. The [`LinkResolver`]
//! classifies an activated URL later, asynchronously.
//!
//! ## Example
//!
//! ```rust
//! use hyperview::{Renderer, RenderNode, ParagraphVariant};
//!
//! let renderer = Renderer::new();
//! let tree = renderer.render("> quoted text<p>1. first item").unwrap();
//!
//! let quote = tree[0].as_paragraph().unwrap();
//! assert_eq!(quote.variant, ParagraphVariant::Blockquote);
//! assert_eq!(quote.prefix.as_deref(), Some(">"));
//!
//! let item = tree[1].as_paragraph().unwrap();
//! assert_eq!(item.variant, ParagraphVariant::ListItem);
//! assert_eq!(item.prefix.as_deref(), Some("1."));
//!
//! assert!(renderer.render("   ").is_none());
//! ```

use std::time::Duration;

pub mod highlight;
#[cfg(feature = "html")]
pub mod html;
pub mod link;
pub mod node;
pub mod normalize;
pub mod prefix;
mod service;
pub mod snippet;
pub mod transform;
mod utilities;
pub mod visited;

pub use highlight::{detect_language, highlight, highlight_blocking, Detection, PLAINTEXT};
#[cfg(feature = "html")]
pub use html::parse_html;
pub use link::{
    Activation, CachedItemSource, ItemKind, ItemSource, LinkResolver, LinkResolverConfig,
    MinimalItem, Navigator, RouteParams, Tab, VisitedLinks,
};
pub use node::{Element, Fragment, Node, Tag};
pub use normalize::normalize;
pub use service::Renderer;
#[cfg(feature = "html")]
pub use service::render;
pub use snippet::{snippet, SnippetOptions};
pub use transform::{Context, Transformer};
pub use utilities::*;
pub use visited::RecentLinks;

pub use hyperview_core::*;

/// Error type for hyperview operations
#[derive(Debug, thiserror::Error)]
pub enum HyperviewError {
    #[error("Item lookup failed: {0}")]
    Lookup(String),

    #[error("Item lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed item payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Highlighting failed: {0}")]
    Highlight(String),
}

pub type Result<T> = std::result::Result<T, HyperviewError>;
