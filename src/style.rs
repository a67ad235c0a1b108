//! Presentation rules for the rendered tree.
//!
//! The on-screen theme uses `oklch()` colors. The rasterizer only understands
//! hex, `rgb()`/`rgba()` and named colors, so captures swap in
//! [`Stylesheet::fallback`] for their duration.

use crate::views::{Node, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Start edge; right for RTL content.
    #[default]
    Start,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(Tag),
    Class(String),
    Id(String),
}

impl Selector {
    fn matches(&self, node: &Node) -> bool {
        match self {
            Self::Tag(tag) => node.tag == *tag,
            Self::Class(class) => node.has_class(class),
            Self::Id(id) => node.id.as_deref() == Some(id.as_str()),
        }
    }
}

/// Declarations of one rule. Unset properties leave the cascade alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Declarations {
    pub color: Option<String>,
    pub background: Option<String>,
    pub border_color: Option<String>,
    pub font_size: Option<f32>,
    pub bold: Option<bool>,
    pub align: Option<TextAlign>,
    pub margin_bottom: Option<f32>,
    pub padding: Option<f32>,
    pub line_height: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: Selector,
    pub declarations: Declarations,
}

/// Resolved style of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub color: String,
    pub background: Option<String>,
    pub border_color: Option<String>,
    pub font_size: f32,
    pub bold: bool,
    pub align: TextAlign,
    pub margin_bottom: f32,
    pub padding: f32,
    /// Multiple of the font size.
    pub line_height: f32,
}

impl ComputedStyle {
    /// Style of the root's parent.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            color: "#000000".to_string(),
            background: None,
            border_color: None,
            font_size: 16.0,
            bold: false,
            align: TextAlign::Start,
            margin_bottom: 0.0,
            padding: 0.0,
            line_height: 1.6,
        }
    }

    /// Inherited properties carry over; box properties reset.
    fn inherit(&self) -> Self {
        Self {
            color: self.color.clone(),
            background: None,
            border_color: None,
            font_size: self.font_size,
            bold: self.bold,
            align: self.align,
            margin_bottom: 0.0,
            padding: 0.0,
            line_height: self.line_height,
        }
    }

    fn apply(&mut self, d: &Declarations) {
        if let Some(v) = &d.color {
            self.color.clone_from(v);
        }
        if let Some(v) = &d.background {
            self.background = Some(v.clone());
        }
        if let Some(v) = &d.border_color {
            self.border_color = Some(v.clone());
        }
        if let Some(v) = d.font_size {
            self.font_size = v;
        }
        if let Some(v) = d.bold {
            self.bold = v;
        }
        if let Some(v) = d.align {
            self.align = v;
        }
        if let Some(v) = d.margin_bottom {
            self.margin_bottom = v;
        }
        if let Some(v) = d.padding {
            self.padding = v;
        }
        if let Some(v) = d.line_height {
            self.line_height = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

/// Modern CSS color functions the rasterizer rejects.
pub const MODERN_COLOR_FUNCTIONS: [&str; 5] = ["oklch(", "oklab(", "lch(", "lab(", "color("];

#[must_use]
pub fn is_modern_color(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    MODERN_COLOR_FUNCTIONS.iter().any(|f| lower.starts_with(f))
}

fn rule(selector: Selector, declarations: Declarations) -> Rule {
    Rule {
        selector,
        declarations,
    }
}

fn class(name: &str) -> Selector {
    Selector::Class(name.to_string())
}

struct Palette {
    page: &'static str,
    text: &'static str,
    muted: &'static str,
    strong: &'static str,
    card: &'static str,
    border: &'static str,
    religious: &'static str,
    political: &'static str,
    overall: &'static str,
    quote_bg: &'static str,
}

fn themed(p: &Palette) -> Stylesheet {
    let text = |c: &str| Some(c.to_string());
    let heading = |size: f32, color: &str| Declarations {
        color: text(color),
        font_size: Some(size),
        bold: Some(true),
        margin_bottom: Some(12.0),
        ..Declarations::default()
    };
    let card = |border: &str| Declarations {
        background: text(p.card),
        border_color: text(border),
        padding: Some(24.0),
        margin_bottom: Some(24.0),
        ..Declarations::default()
    };

    Stylesheet {
        rules: vec![
            rule(
                Selector::Id(crate::views::SUMMARY_ROOT_ID.to_string()),
                Declarations {
                    color: text(p.text),
                    background: text(p.page),
                    padding: Some(40.0),
                    font_size: Some(17.0),
                    ..Declarations::default()
                },
            ),
            rule(
                class("preamble"),
                Declarations {
                    align: Some(TextAlign::Center),
                    margin_bottom: Some(24.0),
                    ..Declarations::default()
                },
            ),
            rule(class("bismillah"), heading(22.0, p.strong)),
            rule(
                class("intro"),
                Declarations {
                    color: text(p.muted),
                    font_size: Some(17.0),
                    ..Declarations::default()
                },
            ),
            rule(
                Selector::Tag(Tag::H1),
                Declarations {
                    align: Some(TextAlign::Center),
                    margin_bottom: Some(28.0),
                    ..heading(28.0, p.strong)
                },
            ),
            rule(class("sermon"), card(p.border)),
            rule(class("overall"), card(p.overall)),
            rule(
                class("section-title"),
                Declarations {
                    color: None,
                    ..heading(22.0, p.strong)
                },
            ),
            rule(
                class("religious"),
                Declarations {
                    color: text(p.religious),
                    ..Declarations::default()
                },
            ),
            rule(
                class("political"),
                Declarations {
                    color: text(p.political),
                    ..Declarations::default()
                },
            ),
            rule(
                Selector::Tag(Tag::Li),
                Declarations {
                    margin_bottom: Some(10.0),
                    ..Declarations::default()
                },
            ),
            rule(
                class("point-heading"),
                Declarations {
                    color: text(p.strong),
                    bold: Some(true),
                    ..Declarations::default()
                },
            ),
            rule(
                class("point-explanation"),
                Declarations {
                    color: text(p.muted),
                    ..Declarations::default()
                },
            ),
            rule(
                class("highlight-quote"),
                Declarations {
                    background: text(p.quote_bg),
                    border_color: text(p.religious),
                    padding: Some(12.0),
                    ..Declarations::default()
                },
            ),
            rule(
                class("quote-caption"),
                Declarations {
                    font_size: Some(13.0),
                    ..Declarations::default()
                },
            ),
            rule(
                class("quote-text"),
                Declarations {
                    color: text(p.strong),
                    ..Declarations::default()
                },
            ),
            rule(
                class("overall-text"),
                Declarations {
                    color: text(p.text),
                    ..Declarations::default()
                },
            ),
            rule(
                class("export-controls"),
                Declarations {
                    align: Some(TextAlign::Center),
                    margin_bottom: Some(16.0),
                    ..Declarations::default()
                },
            ),
        ],
    }
}

impl Default for Stylesheet {
    /// On-screen theme.
    fn default() -> Self {
        themed(&Palette {
            page: "oklch(0.145 0.01 285)",
            text: "oklch(0.929 0.013 255.5)",
            muted: "oklch(0.869 0.022 252.9)",
            strong: "oklch(0.985 0 0)",
            card: "oklch(0.208 0.042 265.8)",
            border: "oklch(0.279 0.041 260)",
            religious: "oklch(0.707 0.165 254.6)",
            political: "oklch(0.765 0.177 163.2)",
            overall: "oklch(0.585 0.233 277.1)",
            quote_bg: "oklch(0.262 0.051 172.6)",
        })
    }
}

impl Stylesheet {
    /// Explicit hex colors on a light page.
    #[must_use]
    pub fn fallback() -> Self {
        themed(&Palette {
            page: "#ffffff",
            text: "#1f2937",
            muted: "#374151",
            strong: "#111827",
            card: "#f9fafb",
            border: "#e5e7eb",
            religious: "#1d4ed8",
            political: "#047857",
            overall: "#6366f1",
            quote_bg: "#ecfdf5",
        })
    }

    /// Whether any rule uses a color function the rasterizer cannot parse.
    #[must_use]
    pub fn uses_modern_colors(&self) -> bool {
        self.rules.iter().any(|r| {
            let d = &r.declarations;
            [&d.color, &d.background, &d.border_color]
                .into_iter()
                .flatten()
                .any(|v| is_modern_color(v))
        })
    }

    /// Resolve the style of `node` given its parent's computed style. Later
    /// rules win.
    #[must_use]
    pub fn compute(&self, node: &Node, parent: &ComputedStyle) -> ComputedStyle {
        let mut style = parent.inherit();
        if matches!(node.tag, Tag::Strong | Tag::H1 | Tag::H2 | Tag::H3) {
            style.bold = true;
        }
        for rule in self.rules.iter().filter(|r| r.selector.matches(node)) {
            style.apply(&rule.declarations);
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_screen_theme_uses_modern_colors() {
        assert!(Stylesheet::default().uses_modern_colors());
        assert!(!Stylesheet::fallback().uses_modern_colors());
    }

    #[test]
    fn detects_color_functions_case_insensitively() {
        assert!(is_modern_color("OKLCH(0.5 0.1 20)"));
        assert!(is_modern_color(" lab(50% 40 59)"));
        assert!(!is_modern_color("#fff"));
        assert!(!is_modern_color("rgb(1, 2, 3)"));
    }

    #[test]
    fn cascade_inherits_text_properties_but_not_boxes() {
        let sheet = Stylesheet::fallback();
        let root = Node::new(Tag::Div).id(crate::views::SUMMARY_ROOT_ID);
        let root_style = sheet.compute(&root, &ComputedStyle::initial());
        assert_eq!(root_style.background.as_deref(), Some("#ffffff"));

        let para = Node::new(Tag::P);
        let para_style = sheet.compute(&para, &root_style);
        assert_eq!(para_style.color, root_style.color);
        assert!(para_style.background.is_none());
        assert!((para_style.font_size - 17.0).abs() < f32::EPSILON);
    }

    #[test]
    fn strong_is_bold_without_rules() {
        let sheet = Stylesheet { rules: Vec::new() };
        let style = sheet.compute(&Node::new(Tag::Strong), &ComputedStyle::initial());
        assert!(style.bold);
    }
}
