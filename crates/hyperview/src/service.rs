//! Renderer - the main entry point for HTML to render tree conversion.

use std::sync::Arc;

use hyperview_core::{RenderNode, RenderOptions, StyleTable};

use crate::link::VisitedLinks;
use crate::node::Fragment;
use crate::transform::{Context, Transformer};

/// Renders API HTML fragments into render trees
pub struct Renderer {
    options: RenderOptions,
    styles: StyleTable,
    visited: Option<Arc<dyn VisitedLinks>>,
}

impl Renderer {
    /// Create a renderer with default options
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    /// Create a renderer with custom options
    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            options,
            styles: StyleTable::new(),
            visited: None,
        }
    }

    /// Mark links found in this store as visited
    pub fn with_visited(mut self, visited: Arc<dyn VisitedLinks>) -> Self {
        self.visited = Some(visited);
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// Style table, for registering per-tag overrides
    pub fn styles_mut(&mut self) -> &mut StyleTable {
        &mut self.styles
    }

    /// Render an HTML fragment.
    ///
    /// Returns `None` for empty or blank input and for fragments that
    /// render nothing. Never fails: unexpected markup degrades to the
    /// generic styled container.
    #[cfg(feature = "html")]
    pub fn render(&self, html: &str) -> Option<Vec<RenderNode>> {
        if html.trim().is_empty() {
            return None;
        }

        let normalized = crate::normalize::normalize(html, self.options.linkify);
        if self.options.debug_log {
            tracing::debug!(html = %normalized, "normalized HTML");
        }

        let fragment = crate::html::parse_html(&normalized);
        self.render_fragment(&fragment)
    }

    /// Render an already parsed fragment
    pub fn render_fragment(&self, fragment: &Fragment) -> Option<Vec<RenderNode>> {
        let mut transformer = Transformer::new(&self.options, &self.styles);
        if let Some(visited) = &self.visited {
            transformer = transformer.with_visited(visited.as_ref());
        }

        let tree = transformer.transform(&fragment.children, &Context::root(self.options.font_size));
        if self.options.debug_log {
            tracing::debug!(
                nodes = tree.as_ref().map_or(0, Vec::len),
                "rendered fragment"
            );
        }
        tree
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render an HTML fragment with the given options
#[cfg(feature = "html")]
pub fn render(html: &str, options: &RenderOptions) -> Option<Vec<RenderNode>> {
    Renderer::with_options(options.clone()).render(html)
}
