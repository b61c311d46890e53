//! Tag-keyed style table.
//!
//! Styles are looked up by tag name. Tags without a registered style fall
//! back to the `default` entry.

use indexmap::IndexMap;

use crate::options::ColorScheme;

/// An RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xff)
    }

    /// `#rrggbb` or `#rrggbbaa` when not fully opaque
    pub fn to_hex(&self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// A color with a light and a dark variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Themed {
    pub light: Rgba,
    pub dark: Rgba,
}

impl Themed {
    pub const fn new(light: Rgba, dark: Rgba) -> Self {
        Self { light, dark }
    }

    pub fn resolve(&self, scheme: ColorScheme) -> Rgba {
        match scheme {
            ColorScheme::Light => self.light,
            ColorScheme::Dark => self.dark,
        }
    }
}

/// Visual attributes of a node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    pub margin_bottom: f32,
    pub padding: f32,
    pub italic: bool,
    pub monospace: bool,
    pub underline: bool,
    /// Lay children out horizontally (prefix label beside the body)
    pub row: bool,
    pub opacity: Option<f32>,
    pub color: Option<Themed>,
    pub background: Option<Themed>,
}

const SUBTLE_BACKGROUND: Themed = Themed::new(
    Rgba::new(0, 0, 0, 13),
    Rgba::new(255, 255, 255, 13),
);
const LINK_COLOR: Themed = Themed::new(Rgba::opaque(0, 122, 255), Rgba::opaque(10, 132, 255));
const VISITED_COLOR: Themed = Themed::new(Rgba::opaque(88, 86, 214), Rgba::opaque(94, 92, 230));

/// Styles keyed by tag name
#[derive(Debug, Clone)]
pub struct StyleTable {
    styles: IndexMap<String, Style>,
}

impl StyleTable {
    /// Create a table with the built-in styles
    pub fn new() -> Self {
        let mut styles = IndexMap::new();
        styles.insert("default".to_string(), Style::default());
        styles.insert(
            "p".to_string(),
            Style {
                margin_bottom: 12.0,
                ..Style::default()
            },
        );
        styles.insert(
            "li".to_string(),
            Style {
                margin_bottom: 12.0,
                row: true,
                ..Style::default()
            },
        );
        styles.insert(
            "blockquote".to_string(),
            Style {
                margin_bottom: 12.0,
                padding: 8.0,
                opacity: Some(0.9),
                row: true,
                background: Some(SUBTLE_BACKGROUND),
                ..Style::default()
            },
        );
        styles.insert(
            "pre".to_string(),
            Style {
                margin_bottom: 12.0,
                padding: 10.0,
                background: Some(SUBTLE_BACKGROUND),
                ..Style::default()
            },
        );
        styles.insert(
            "code".to_string(),
            Style {
                monospace: true,
                ..Style::default()
            },
        );
        styles.insert(
            "inline-code".to_string(),
            Style {
                monospace: true,
                background: Some(SUBTLE_BACKGROUND),
                ..Style::default()
            },
        );
        styles.insert(
            "a".to_string(),
            Style {
                underline: true,
                color: Some(LINK_COLOR),
                ..Style::default()
            },
        );
        styles.insert(
            "a-visited".to_string(),
            Style {
                underline: true,
                color: Some(VISITED_COLOR),
                ..Style::default()
            },
        );
        styles.insert(
            "i".to_string(),
            Style {
                italic: true,
                ..Style::default()
            },
        );
        Self { styles }
    }

    /// Register or replace the style for a tag
    pub fn register(&mut self, tag: &str, style: Style) -> &mut Self {
        self.styles.insert(tag.to_lowercase(), style);
        self
    }

    /// Get the style registered for a tag, if any
    pub fn get(&self, tag: &str) -> Option<&Style> {
        self.styles.get(&tag.to_lowercase())
    }

    /// Get the style for a tag, falling back to `default`
    pub fn resolve(&self, tag: &str) -> Style {
        self.get(tag)
            .or_else(|| self.styles.get("default"))
            .cloned()
            .unwrap_or_default()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new()
    }
}
