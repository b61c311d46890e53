//! Configuration options for rendering

/// Body text size used when no size is configured
pub const BASE_FONT_SIZE: f32 = 15.0;

/// Light or dark appearance, selects the color table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

/// Options for a single render call
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Wrap bare URLs in anchors (skipped when the HTML already has anchors)
    pub linkify: bool,

    /// Base font size for body text; code is drawn two points smaller
    pub font_size: f32,

    /// Log intermediate results through `tracing`
    pub debug_log: bool,

    /// Hand `pre` blocks to the code highlighter instead of rendering
    /// them as plain preformatted text
    pub syntax_highlighting: bool,

    /// Color table used for highlighted code
    pub color_scheme: ColorScheme,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            linkify: false,
            font_size: BASE_FONT_SIZE,
            debug_log: false,
            syntax_highlighting: false,
            color_scheme: ColorScheme::Light,
        }
    }
}

impl RenderOptions {
    pub fn code_font_size(&self) -> f32 {
        self.font_size - 2.0
    }
}
