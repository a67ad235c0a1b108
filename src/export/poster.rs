//! Quote poster compositor.
//!
//! A [`PosterJob`] walks `Idle -> ImageLoading -> ImageReady -> Composited ->
//! Exported`, or ends in `ImageLoadFailed` when the background cannot be
//! fetched or decoded. Every job owns its own canvas, so any number can run
//! at once.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use reqwest::Client;
use tiny_skia::Color;
use tracing::{info, warn};

use crate::core::boilerplate::{POSTER_AUTHOR, POSTER_DATE_PREFIX, POSTER_DATE_SUFFIX};
use crate::core::models::SectionKind;
use crate::errors::{ExportError, ImageLoadError};
use crate::raster::{Anchor, FontSpec, FontSystem, SkiaSurface, wrap_text};
use crate::utils::jalali::JalaliDate;
use crate::utils::persian::to_persian_digits;

/// Canvas width the font sizes and offsets below are tuned for.
pub const REFERENCE_WIDTH: f32 = 800.0;

const TEXT_TOP: f32 = 0.82;
const DATE_SIZE: f32 = 14.0;
const AUTHOR_SIZE: f32 = 20.0;
const AUTHOR_OFFSET: f32 = 25.0;
const QUOTE_SIZE: f32 = 22.0;
const QUOTE_OFFSET: f32 = 60.0;
const QUOTE_LINE_HEIGHT: f32 = 35.0;
const QUOTE_MAX_WIDTH: f32 = 0.85;
const STROKE_RATIO: f32 = 0.2;

pub const JPEG_QUALITY: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterState {
    Idle,
    ImageLoading,
    ImageReady,
    Composited,
    Exported,
    ImageLoadFailed,
}

impl PosterState {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ImageLoading => "loading",
            Self::ImageReady => "ready",
            Self::Composited => "composited",
            Self::Exported => "exported",
            Self::ImageLoadFailed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterFormat {
    Jpeg,
    Png,
}

impl PosterFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// `khutbah_poster_<kind>_<timestamp>.<ext>`
#[must_use]
pub fn poster_filename(kind: SectionKind, format: PosterFormat, timestamp_ms: i64) -> String {
    format!(
        "khutbah_poster_{}_{}.{}",
        kind.slug(),
        timestamp_ms,
        format.extension()
    )
}

/// Date line in the local calendar, e.g. `نماز جمعه ۲۶ مهر ۱۴۰۵ دهستان ...`.
#[must_use]
pub fn date_line(date: &JalaliDate) -> String {
    to_persian_digits(&format!(
        "{POSTER_DATE_PREFIX} {} {POSTER_DATE_SUFFIX}",
        date.to_long_string()
    ))
}

/// Fetch the background anonymously over HTTP(S), or read it from disk for
/// any other source.
///
/// # Errors
///
/// `ImageLoadError` for transport failures, non-2xx answers and undecodable
/// bytes.
pub async fn load_background(http: &Client, source: &str) -> Result<RgbaImage, ImageLoadError> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        let response = http
            .get(source)
            .send()
            .await
            .map_err(|e| ImageLoadError::Fetch(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageLoadError::Status(status.as_u16()));
        }
        response
            .bytes()
            .await
            .map_err(|e| ImageLoadError::Fetch(e.to_string()))?
            .to_vec()
    } else {
        tokio::fs::read(source)
            .await
            .map_err(|e| ImageLoadError::Fetch(format!("{source}: {e}")))?
    };

    image::load_from_memory(&bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| ImageLoadError::Decode(e.to_string()))
}

pub struct PosterJob {
    state: PosterState,
    background: Option<RgbaImage>,
    canvas: Option<RgbaImage>,
}

impl Default for PosterJob {
    fn default() -> Self {
        Self::new()
    }
}

impl PosterJob {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: PosterState::Idle,
            background: None,
            canvas: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> PosterState {
        self.state
    }

    fn require_state(&self, expected: PosterState) -> Result<(), ExportError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ExportError::PosterState {
                expected: expected.name(),
                actual: self.state.name(),
            })
        }
    }

    /// Accept an already decoded background.
    ///
    /// # Errors
    ///
    /// `PosterState` unless the job is idle.
    pub fn set_background(&mut self, image: RgbaImage) -> Result<(), ExportError> {
        self.require_state(PosterState::Idle)?;
        self.background = Some(image);
        self.state = PosterState::ImageReady;
        Ok(())
    }

    /// # Errors
    ///
    /// `PosterState` unless the job is idle; `ImageLoad` when the background
    /// cannot be loaded, leaving the job in `ImageLoadFailed`.
    pub async fn load(&mut self, http: &Client, source: &str) -> Result<(), ExportError> {
        self.require_state(PosterState::Idle)?;
        self.state = PosterState::ImageLoading;

        match load_background(http, source).await {
            Ok(image) => {
                info!(width = image.width(), height = image.height(), "Poster background loaded");
                self.background = Some(image);
                self.state = PosterState::ImageReady;
                Ok(())
            }
            Err(e) => {
                warn!(source, "Poster background failed to load: {}", e);
                self.state = PosterState::ImageLoadFailed;
                Err(e.into())
            }
        }
    }

    /// Draw, in order: background, date line, author line, wrapped quote.
    ///
    /// # Errors
    ///
    /// `MissingQuote` for a blank quote, `PosterState` unless the background
    /// is ready, `Rasterize` when the canvas cannot be allocated.
    pub fn composite(
        &mut self,
        fonts: &FontSystem,
        quote: &str,
        date: &JalaliDate,
    ) -> Result<(), ExportError> {
        if quote.trim().is_empty() {
            return Err(ExportError::MissingQuote);
        }
        self.require_state(PosterState::ImageReady)?;
        let background = self.background.as_ref().ok_or(ExportError::PosterState {
            expected: PosterState::ImageReady.name(),
            actual: self.state.name(),
        })?;

        let mut surface = SkiaSurface::from_image(background, fonts)?;
        let width = surface.width() as f32;
        let scale = width / REFERENCE_WIDTH;
        let center = width / 2.0;
        let top = surface.height() as f32 * TEXT_TOP;

        let white = Color::WHITE;
        let yellow = Color::from_rgba8(255, 255, 0, 255);

        draw_outlined(&mut surface, &date_line(date), center, top, DATE_SIZE * scale, white);
        draw_outlined(
            &mut surface,
            POSTER_AUTHOR,
            center,
            top + AUTHOR_OFFSET * scale,
            AUTHOR_SIZE * scale,
            white,
        );

        let quote_font = FontSpec::new(QUOTE_SIZE * scale, true);
        let lines = wrap_text(
            &surface,
            &to_persian_digits(quote),
            quote_font,
            width * QUOTE_MAX_WIDTH,
        );
        let mut y = top + QUOTE_OFFSET * scale;
        for line in &lines {
            draw_outlined(&mut surface, line, center, y, quote_font.size, yellow);
            y += QUOTE_LINE_HEIGHT * scale;
        }

        info!(lines = lines.len(), "Poster composited");
        self.canvas = Some(surface.to_image());
        self.state = PosterState::Composited;
        Ok(())
    }

    /// The composited canvas.
    #[must_use]
    pub fn canvas(&self) -> Option<&RgbaImage> {
        self.canvas.as_ref()
    }

    /// Encode the composited canvas.
    ///
    /// # Errors
    ///
    /// `PosterState` before compositing, `Encode` when encoding fails.
    pub fn export(&mut self, format: PosterFormat) -> Result<Vec<u8>, ExportError> {
        self.require_state(PosterState::Composited)?;
        let canvas = self.canvas.as_ref().ok_or(ExportError::PosterState {
            expected: PosterState::Composited.name(),
            actual: self.state.name(),
        })?;

        let bytes = encode(canvas, format).inspect_err(|e| warn!("Poster export failed: {}", e))?;
        self.state = PosterState::Exported;
        Ok(bytes)
    }
}

/// Stroke then fill, centered on `x` with `y` as the vertical middle.
fn draw_outlined(surface: &mut SkiaSurface<'_>, text: &str, x: f32, y: f32, size: f32, fill: Color) {
    let font = FontSpec::new(size, true);
    let baseline = y + size * 0.35;
    surface.stroke_text(
        text,
        x,
        baseline,
        font,
        Anchor::Center,
        Color::BLACK,
        size * STROKE_RATIO,
    );
    surface.fill_text(text, x, baseline, font, Anchor::Center, fill);
}

/// # Errors
///
/// `ExportError::Encode` when the encoder rejects the image.
pub fn encode(image: &RgbaImage, format: PosterFormat) -> Result<Vec<u8>, ExportError> {
    let mut out = Cursor::new(Vec::new());
    match format {
        PosterFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)?;
        }
        PosterFormat::Png => image.write_to(&mut out, ImageFormat::Png)?,
    }
    Ok(out.into_inner())
}

/// Load, composite and encode one poster.
///
/// # Errors
///
/// Whatever step fails first; see [`PosterJob`].
pub async fn render_poster(
    http: &Client,
    fonts: &FontSystem,
    background: &str,
    quote: &str,
    date: &JalaliDate,
    format: PosterFormat,
) -> Result<Vec<u8>, ExportError> {
    if quote.trim().is_empty() {
        return Err(ExportError::MissingQuote);
    }
    let mut job = PosterJob::new();
    job.load(http, background).await?;
    job.composite(fonts, quote, date)?;
    job.export(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_carry_kind_and_timestamp() {
        assert_eq!(
            poster_filename(SectionKind::Political, PosterFormat::Jpeg, 1_700_000_000_000),
            "khutbah_poster_political_1700000000000.jpg"
        );
    }

    #[test]
    fn date_line_uses_persian_calendar_and_digits() {
        let date = JalaliDate { year: 1405, month: 7, day: 26 };
        let line = date_line(&date);
        assert!(line.starts_with("نماز جمعه ۲۶ مهر ۱۴۰۵"));
        assert!(!line.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut job = PosterJob::new();
        assert!(matches!(job.export(PosterFormat::Png), Err(ExportError::PosterState { .. })));
        job.set_background(RgbaImage::new(4, 4)).unwrap();
        assert_eq!(job.state(), PosterState::ImageReady);
        assert!(job.set_background(RgbaImage::new(4, 4)).is_err());
    }

    #[test]
    fn encodes_both_formats() {
        let image = RgbaImage::from_pixel(8, 8, image::Rgba([10, 20, 30, 255]));
        let jpeg = encode(&image, PosterFormat::Jpeg).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let png = encode(&image, PosterFormat::Png).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[tokio::test]
    async fn missing_file_ends_in_load_failed() {
        let mut job = PosterJob::new();
        let err = job
            .load(&Client::new(), "/definitely/not/here.png")
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::ImageLoad(ImageLoadError::Fetch(_))));
        assert_eq!(job.state(), PosterState::ImageLoadFailed);
    }
}
