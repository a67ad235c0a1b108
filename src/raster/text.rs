//! Text shaping and glyph outlines.
//!
//! Runs are shaped with rustybuzz so Arabic-script letters join and the
//! line comes out in visual order. Outlines go straight into a tiny-skia
//! path in pixel space.

use rustybuzz::ttf_parser::{GlyphId, OutlineBuilder};
use rustybuzz::{Face, UnicodeBuffer};
use tiny_skia::{Path, PathBuilder};

use super::font::ResolvedFace;

/// One glyph placed on the pen line, in pixels.
#[derive(Debug, Clone, Copy)]
struct PlacedGlyph {
    id: u16,
    x: f32,
    y: f32,
}

/// A shaped single-line run.
#[derive(Debug, Clone)]
pub struct ShapedRun {
    glyphs: Vec<PlacedGlyph>,
    pub width: f32,
    pub ascent: f32,
    scale: f32,
}

/// Shape `text` at `size` pixels. Returns `None` when the face cannot be parsed.
#[must_use]
pub fn shape(face: &ResolvedFace, text: &str, size: f32) -> Option<ShapedRun> {
    let parsed = Face::from_slice(&face.bytes, face.index)?;
    let scale = size / parsed.units_per_em() as f32;

    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.guess_segment_properties();
    let output = rustybuzz::shape(&parsed, &[], buffer);

    let mut pen = 0.0_f32;
    let glyphs = output
        .glyph_infos()
        .iter()
        .zip(output.glyph_positions())
        .map(|(info, pos)| {
            let glyph = PlacedGlyph {
                id: u16::try_from(info.glyph_id).unwrap_or(0),
                x: pen + pos.x_offset as f32 * scale,
                y: pos.y_offset as f32 * scale,
            };
            pen += pos.x_advance as f32 * scale;
            glyph
        })
        .collect();

    Some(ShapedRun {
        glyphs,
        width: pen,
        ascent: f32::from(parsed.ascender()) * scale,
        scale,
    })
}

/// Width of `text` in pixels, zero when the face is unusable.
#[must_use]
pub fn measure(face: &ResolvedFace, text: &str, size: f32) -> f32 {
    shape(face, text, size).map_or(0.0, |run| run.width)
}

struct SkiaOutline<'a> {
    builder: &'a mut PathBuilder,
    scale: f32,
    x: f32,
    y: f32,
}

impl OutlineBuilder for SkiaOutline<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder
            .move_to(self.x + x * self.scale, self.y - y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder
            .line_to(self.x + x * self.scale, self.y - y * self.scale);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(
            self.x + x1 * self.scale,
            self.y - y1 * self.scale,
            self.x + x * self.scale,
            self.y - y * self.scale,
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.x + x1 * self.scale,
            self.y - y1 * self.scale,
            self.x + x2 * self.scale,
            self.y - y2 * self.scale,
            self.x + x * self.scale,
            self.y - y * self.scale,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

impl ShapedRun {
    /// Outline of the whole run with its left edge at `x` and baseline at
    /// `baseline`. `None` for runs without visible glyphs.
    #[must_use]
    pub fn to_path(&self, face: &ResolvedFace, x: f32, baseline: f32) -> Option<Path> {
        let parsed = Face::from_slice(&face.bytes, face.index)?;
        let mut builder = PathBuilder::new();
        for glyph in &self.glyphs {
            let mut outline = SkiaOutline {
                builder: &mut builder,
                scale: self.scale,
                x: x + glyph.x,
                y: baseline - glyph.y,
            };
            parsed.outline_glyph(GlyphId(glyph.id), &mut outline);
        }
        builder.finish()
    }
}
