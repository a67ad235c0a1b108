//! CPU rasterization: fonts, shaping, colors, layout and the pixel surface.

pub mod color;
pub mod font;
pub mod layout;
pub mod surface;
pub mod text;

pub use font::FontSystem;
pub use surface::{Anchor, FontSpec, SkiaSurface, TextMeasure, wrap_text};
