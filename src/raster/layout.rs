//! Block layout of a rendered tree into a flat display list.
//!
//! Every element is a block except inline elements, which join their inline
//! siblings into one wrapped run. Text is right-aligned unless centered.
//! Colors are parsed here, so an unsupported color fails the whole layout
//! before any pixel is drawn.

use tiny_skia::Color;

use super::color::parse_color;
use super::surface::{Anchor, FontSpec, SkiaSurface, TextMeasure, wrap_text};
use crate::errors::ExportError;
use crate::style::{ComputedStyle, Stylesheet, TextAlign};
use crate::views::Node;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    Border {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    Text {
        x: f32,
        baseline: f32,
        text: String,
        font: FontSpec,
        anchor: Anchor,
        color: Color,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    pub width: f32,
    pub height: f32,
    pub background: Option<Color>,
    pub ops: Vec<DrawOp>,
}

struct Layout<'a, M: TextMeasure + ?Sized> {
    sheet: &'a Stylesheet,
    measure: &'a M,
    ops: Vec<DrawOp>,
}

fn optional_color(value: Option<&str>) -> Result<Option<Color>, ExportError> {
    value.map(parse_color).transpose()
}

impl<M: TextMeasure + ?Sized> Layout<'_, M> {
    fn text_lines(
        &mut self,
        text: &str,
        style: &ComputedStyle,
        x: f32,
        width: f32,
        mut y: f32,
    ) -> Result<f32, ExportError> {
        let color = parse_color(&style.color)?;
        let font = FontSpec::new(style.font_size, style.bold);
        let line_height = style.font_size * style.line_height;
        let (anchor, anchor_x) = match style.align {
            TextAlign::Start => (Anchor::Right, x + width),
            TextAlign::Center => (Anchor::Center, x + width / 2.0),
        };

        for line in wrap_text(self.measure, text, font, width) {
            // baseline sits roughly where a browser would put it in the line box
            let baseline = y + (line_height + style.font_size * 0.7) / 2.0;
            self.ops.push(DrawOp::Text {
                x: anchor_x,
                baseline,
                text: line,
                font,
                anchor,
                color,
            });
            y += line_height;
        }
        Ok(y)
    }

    fn inline_run(
        &mut self,
        run: &[&Node],
        parent: &ComputedStyle,
        x: f32,
        width: f32,
        y: f32,
    ) -> Result<f32, ExportError> {
        let Some(last) = run.last() else {
            return Ok(y);
        };
        let text = run
            .iter()
            .filter_map(|n| n.text.as_deref())
            .collect::<Vec<_>>()
            .join(" ");
        let style = self.sheet.compute(last, parent);
        self.text_lines(&text, &style, x, width, y)
    }

    fn block(
        &mut self,
        node: &Node,
        parent: &ComputedStyle,
        x: f32,
        width: f32,
        y: f32,
    ) -> Result<f32, ExportError> {
        if node.hidden {
            return Ok(y);
        }

        let style = self.sheet.compute(node, parent);
        let background = optional_color(style.background.as_deref())?;
        let border = optional_color(style.border_color.as_deref())?;
        let first_op = self.ops.len();

        let pad = style.padding;
        let inner_x = x + pad;
        let inner_w = (width - 2.0 * pad).max(1.0);
        let mut cursor = y + pad;

        if let Some(text) = node.text.as_deref() {
            cursor = self.text_lines(text, &style, inner_x, inner_w, cursor)?;
        }

        let mut run: Vec<&Node> = Vec::new();
        for child in node.children.iter().filter(|c| !c.hidden) {
            if child.tag.is_inline() {
                run.push(child);
                continue;
            }
            cursor = self.inline_run(&run, &style, inner_x, inner_w, cursor)?;
            run.clear();
            cursor = self.block(child, &style, inner_x, inner_w, cursor)?;
        }
        cursor = self.inline_run(&run, &style, inner_x, inner_w, cursor)?;
        cursor += pad;

        let height = cursor - y;
        if let Some(color) = background {
            self.ops.insert(
                first_op,
                DrawOp::Rect {
                    x,
                    y,
                    w: width,
                    h: height,
                    color,
                },
            );
        }
        if let Some(color) = border {
            self.ops.push(DrawOp::Border {
                x,
                y,
                w: width,
                h: height,
                color,
            });
        }

        Ok(cursor + style.margin_bottom)
    }
}

/// Lay out `root` at a fixed `width`.
///
/// # Errors
///
/// `ExportError::Rasterize` when a style carries a color the rasterizer cannot
/// parse.
pub fn layout<M: TextMeasure + ?Sized>(
    root: &Node,
    sheet: &Stylesheet,
    measure: &M,
    width: f32,
) -> Result<DisplayList, ExportError> {
    let mut layout = Layout {
        sheet,
        measure,
        ops: Vec::new(),
    };
    let initial = ComputedStyle::initial();
    let height = layout.block(root, &initial, 0.0, width, 0.0)?;

    let root_style = sheet.compute(root, &initial);
    Ok(DisplayList {
        width,
        height: height.ceil().max(1.0),
        background: optional_color(root_style.background.as_deref())?,
        ops: layout.ops,
    })
}

impl DisplayList {
    /// Draw every op, in order, onto `surface` scaled by `scale`.
    pub fn paint(&self, surface: &mut SkiaSurface<'_>, scale: f32) {
        surface.clear(self.background.unwrap_or(Color::WHITE));
        for op in &self.ops {
            match op {
                DrawOp::Rect { x, y, w, h, color } => {
                    surface.fill_rect(x * scale, y * scale, w * scale, h * scale, *color);
                }
                DrawOp::Border { x, y, w, h, color } => {
                    surface.stroke_rect(x * scale, y * scale, w * scale, h * scale, *color, scale);
                }
                DrawOp::Text {
                    x,
                    baseline,
                    text,
                    font,
                    anchor,
                    color,
                } => {
                    let font = FontSpec::new(font.size * scale, font.bold);
                    surface.fill_text(text, x * scale, baseline * scale, font, *anchor, *color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::Tag;

    struct Fixed;

    impl TextMeasure for Fixed {
        fn measure(&self, text: &str, font: FontSpec) -> f32 {
            text.chars().count() as f32 * font.size * 0.5
        }
    }

    fn texts(list: &DisplayList) -> Vec<&str> {
        list.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn hidden_nodes_are_skipped() {
        let mut button = Node::new(Tag::Button).text("hide me");
        button.hidden = true;
        let root = Node::new(Tag::Div)
            .child(Node::new(Tag::P).text("shown"))
            .child(button);
        let list = layout(&root, &Stylesheet::fallback(), &Fixed, 400.0).unwrap();
        assert_eq!(texts(&list), vec!["shown"]);
    }

    #[test]
    fn inline_siblings_share_a_line() {
        let root = Node::new(Tag::Div).child(
            Node::new(Tag::Li)
                .child(Node::new(Tag::Span).text("۱."))
                .child(Node::new(Tag::Strong).text("head"))
                .child(Node::new(Tag::P).text("body")),
        );
        let list = layout(&root, &Stylesheet::fallback(), &Fixed, 400.0).unwrap();
        assert_eq!(texts(&list), vec!["۱. head", "body"]);
    }

    #[test]
    fn background_is_drawn_beneath_content() {
        let root = Node::new(Tag::Div).id(crate::views::SUMMARY_ROOT_ID).child(Node::new(Tag::P).text("x"));
        let list = layout(&root, &Stylesheet::fallback(), &Fixed, 400.0).unwrap();
        assert!(matches!(list.ops.first(), Some(DrawOp::Rect { .. })));
    }

    #[test]
    fn screen_theme_fails_layout() {
        let root = Node::new(Tag::Div).id(crate::views::SUMMARY_ROOT_ID).text("x");
        let err = layout(&root, &Stylesheet::default(), &Fixed, 400.0).unwrap_err();
        assert!(matches!(err, ExportError::Rasterize(_)));
    }
}
