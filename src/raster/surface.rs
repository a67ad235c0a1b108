//! Drawing surface shared by the page capture and the poster compositor.

use image::{Rgba, RgbaImage};
use tiny_skia::{
    Color, ColorU8, FillRule, IntSize, LineJoin, Paint, Pixmap, PixmapPaint, Rect, Stroke,
    Transform,
};

use super::font::FontSystem;
use super::text;
use crate::errors::ExportError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub size: f32,
    pub bold: bool,
}

impl FontSpec {
    #[must_use]
    pub const fn new(size: f32, bold: bool) -> Self {
        Self { size, bold }
    }
}

/// Anything that can tell how wide a line of text is.
pub trait TextMeasure {
    fn measure(&self, text: &str, font: FontSpec) -> f32;
}

impl TextMeasure for FontSystem {
    fn measure(&self, text: &str, font: FontSpec) -> f32 {
        text::measure(self.face(font.bold), text, font.size)
    }
}

/// Greedy word wrap. Words are added to the current line while the measured
/// line fits in `max_width`; a word wider than `max_width` on its own still
/// gets a line of its own. Nothing is dropped.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    measure: &M,
    text: &str,
    font: FontSpec,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure.measure(&candidate, font) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Horizontal anchor of a text draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Left,
    Center,
    Right,
}

/// A pixel canvas owned by exactly one export call.
pub struct SkiaSurface<'f> {
    pixmap: Pixmap,
    fonts: &'f FontSystem,
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

impl<'f> SkiaSurface<'f> {
    /// # Errors
    ///
    /// `ExportError::Rasterize` for a zero-sized or oversized canvas.
    pub fn new(width: u32, height: u32, fonts: &'f FontSystem) -> Result<Self, ExportError> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ExportError::Rasterize(format!("cannot allocate a {width}x{height} canvas"))
        })?;
        Ok(Self { pixmap, fonts })
    }

    /// A canvas holding `image` at its native size.
    ///
    /// # Errors
    ///
    /// `ExportError::Rasterize` when the image has no pixels.
    pub fn from_image(image: &RgbaImage, fonts: &'f FontSystem) -> Result<Self, ExportError> {
        let mut surface = Self::new(image.width(), image.height(), fonts)?;
        surface.draw_image(image, 0, 0)?;
        Ok(surface)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(color);
    }

    /// # Errors
    ///
    /// `ExportError::Rasterize` when the image has no pixels.
    pub fn draw_image(&mut self, image: &RgbaImage, x: i32, y: i32) -> Result<(), ExportError> {
        let size = IntSize::from_wh(image.width(), image.height())
            .ok_or_else(|| ExportError::Rasterize("image has no pixels".to_string()))?;
        let data: Vec<u8> = image
            .pixels()
            .flat_map(|Rgba([r, g, b, a])| {
                let p = ColorU8::from_rgba(*r, *g, *b, *a).premultiply();
                [p.red(), p.green(), p.blue(), p.alpha()]
            })
            .collect();
        let source = Pixmap::from_vec(data, size)
            .ok_or_else(|| ExportError::Rasterize("invalid image buffer".to_string()))?;
        self.pixmap.draw_pixmap(
            x,
            y,
            source.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        Ok(())
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if let Some(rect) = Rect::from_xywh(x, y, w, h) {
            self.pixmap
                .fill_rect(rect, &paint(color), Transform::identity(), None);
        }
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, width: f32) {
        if let Some(rect) = Rect::from_xywh(x, y, w, h) {
            let path = tiny_skia::PathBuilder::from_rect(rect);
            let stroke = Stroke {
                width,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }

    fn text_path(
        &self,
        text: &str,
        x: f32,
        baseline: f32,
        font: FontSpec,
        anchor: Anchor,
    ) -> Option<tiny_skia::Path> {
        let face = self.fonts.face(font.bold);
        let run = text::shape(face, text, font.size)?;
        let left = match anchor {
            Anchor::Left => x,
            Anchor::Center => x - run.width / 2.0,
            Anchor::Right => x - run.width,
        };
        run.to_path(face, left, baseline)
    }

    pub fn fill_text(
        &mut self,
        text: &str,
        x: f32,
        baseline: f32,
        font: FontSpec,
        anchor: Anchor,
        color: Color,
    ) {
        if let Some(path) = self.text_path(text, x, baseline, font, anchor) {
            self.pixmap.fill_path(
                &path,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn stroke_text(
        &mut self,
        text: &str,
        x: f32,
        baseline: f32,
        font: FontSpec,
        anchor: Anchor,
        color: Color,
        width: f32,
    ) {
        if let Some(path) = self.text_path(text, x, baseline, font, anchor) {
            let stroke = Stroke {
                width,
                line_join: LineJoin::Round,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }

    /// Un-premultiplied copy of the pixels.
    #[must_use]
    pub fn to_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width(), self.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }
}

impl TextMeasure for SkiaSurface<'_> {
    fn measure(&self, text: &str, font: FontSpec) -> f32 {
        self.fonts.measure(text, font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 10px wide.
    struct Fixed;

    impl TextMeasure for Fixed {
        fn measure(&self, text: &str, _font: FontSpec) -> f32 {
            text.chars().count() as f32 * 10.0
        }
    }

    #[test]
    fn wraps_greedily() {
        let lines = wrap_text(&Fixed, "aa bb cc dd", FontSpec::new(10.0, false), 50.0);
        assert_eq!(lines, vec!["aa bb", "cc dd"]);
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let lines = wrap_text(&Fixed, "a bbbbbbbbbb c", FontSpec::new(10.0, false), 30.0);
        assert_eq!(lines, vec!["a", "bbbbbbbbbb", "c"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_text(&Fixed, "  \n ", FontSpec::new(10.0, false), 30.0).is_empty());
    }
}
