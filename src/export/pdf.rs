//! Raster exports of the rendered page: PDF (one image per page) and PNG.
//!
//! A capture hides the export controls inside the captured subtree and swaps
//! in the fallback stylesheet. [`CaptureScope`] undoes both when dropped, so
//! the page is restored whether the capture succeeds or fails.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use tracing::{debug, error, info};

use crate::errors::ExportError;
use crate::raster::layout::layout;
use crate::raster::{FontSystem, SkiaSurface};
use crate::style::Stylesheet;
use crate::views::{Node, Page};

pub const PDF_FILENAME: &str = "khutbah_summary.pdf";
pub const PNG_FILENAME: &str = "khutbah_summary.png";

/// Layout width of a capture, in CSS pixels.
pub const CAPTURE_WIDTH: f32 = 800.0;
/// Device pixels per CSS pixel.
pub const CAPTURE_SCALE: f32 = 2.0;

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const MM_PER_INCH: f32 = 25.4;

/// Capture state of a page. Restores the subtree and the stylesheet on drop.
pub struct CaptureScope<'p> {
    page: &'p mut Page,
    subtree_id: String,
    saved_subtree: Node,
    saved_stylesheet: Option<Stylesheet>,
}

impl<'p> CaptureScope<'p> {
    /// # Errors
    ///
    /// `ExportError::SubtreeNotFound` when no node has `subtree_id`; the page
    /// is left untouched.
    pub fn enter(page: &'p mut Page, subtree_id: &str) -> Result<Self, ExportError> {
        let node = page
            .root
            .find_by_id_mut(subtree_id)
            .ok_or_else(|| ExportError::SubtreeNotFound(subtree_id.to_string()))?;
        let saved_subtree = node.clone();
        let hidden = node.set_controls_hidden(true);

        let saved_stylesheet = Some(std::mem::replace(
            &mut page.stylesheet,
            Stylesheet::fallback(),
        ));
        debug!(subtree_id, hidden, "Entered capture scope");

        Ok(Self {
            page,
            subtree_id: subtree_id.to_string(),
            saved_subtree,
            saved_stylesheet,
        })
    }

    #[must_use]
    pub fn subtree(&self) -> &Node {
        self.page
            .root
            .find_by_id(&self.subtree_id)
            .unwrap_or(&self.page.root)
    }

    #[must_use]
    pub fn stylesheet(&self) -> &Stylesheet {
        &self.page.stylesheet
    }
}

impl Drop for CaptureScope<'_> {
    fn drop(&mut self) {
        if let Some(node) = self.page.root.find_by_id_mut(&self.subtree_id) {
            *node = self.saved_subtree.clone();
        }
        if let Some(sheet) = self.saved_stylesheet.take() {
            self.page.stylesheet = sheet;
        }
        debug!(subtree_id = %self.subtree_id, "Left capture scope");
    }
}

/// Rasterize the subtree with id `subtree_id`.
///
/// # Errors
///
/// `SubtreeNotFound` or `Rasterize`.
pub fn capture(
    page: &mut Page,
    subtree_id: &str,
    fonts: &FontSystem,
) -> Result<RgbaImage, ExportError> {
    let scope = CaptureScope::enter(page, subtree_id)?;
    let list = layout(scope.subtree(), scope.stylesheet(), fonts, CAPTURE_WIDTH)?;

    let width = (list.width * CAPTURE_SCALE).ceil() as u32;
    let height = (list.height * CAPTURE_SCALE).ceil() as u32;
    let mut surface = SkiaSurface::new(width, height, fonts)?;
    list.paint(&mut surface, CAPTURE_SCALE);

    info!(width, height, "Captured subtree");
    Ok(surface.to_image())
}

/// Split a tall capture into A4-proportioned slices, top to bottom.
fn page_slices(image: &RgbaImage) -> Vec<RgbaImage> {
    let width = image.width();
    let page_height = ((width as f32) * A4_HEIGHT_MM / A4_WIDTH_MM).floor().max(1.0) as u32;

    (0..image.height())
        .step_by(page_height as usize)
        .map(|top| {
            let h = page_height.min(image.height() - top);
            image::imageops::crop_imm(image, 0, top, width, h).to_image()
        })
        .collect()
}

fn to_pdf_image(slice: &RgbaImage) -> Result<Image, ExportError> {
    let rgb: Vec<u8> = slice
        .pixels()
        .flat_map(|p| {
            // captures are opaque; composite any stray alpha over white
            let a = u16::from(p[3]);
            let over = |c: u8| ((u16::from(c) * a + 255 * (255 - a)) / 255) as u8;
            [over(p[0]), over(p[1]), over(p[2])]
        })
        .collect();
    let buffer = printpdf::image_crate::RgbImage::from_raw(slice.width(), slice.height(), rgb)
        .ok_or_else(|| ExportError::Pdf("page image buffer has the wrong size".to_string()))?;
    Ok(Image::from_dynamic_image(
        &printpdf::image_crate::DynamicImage::ImageRgb8(buffer),
    ))
}

/// Embed `image` in an A4 PDF, one slice per page, scaled to the page width.
///
/// # Errors
///
/// `ExportError::Pdf` when the document cannot be written.
pub fn images_to_pdf(image: &RgbaImage, title: &str) -> Result<Vec<u8>, ExportError> {
    let slices = page_slices(image);
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");

    let dpi = image.width() as f32 * MM_PER_INCH / A4_WIDTH_MM;
    for (i, slice) in slices.iter().enumerate() {
        let (page, layer) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1")
        };
        let slice_height_mm = slice.height() as f32 * MM_PER_INCH / dpi;
        let layer = doc.get_page(page).get_layer(layer);

        to_pdf_image(slice)?.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm(A4_HEIGHT_MM - slice_height_mm)),
                dpi: Some(dpi),
                ..ImageTransform::default()
            },
        );
    }

    debug!(pages = slices.len(), "Writing PDF");
    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

/// Capture `subtree_id` and return it as a PDF.
///
/// # Errors
///
/// Any capture or PDF error; its user message recommends the Word export.
pub fn to_pdf(page: &mut Page, subtree_id: &str, fonts: &FontSystem) -> Result<Vec<u8>, ExportError> {
    let result = capture(page, subtree_id, fonts)
        .and_then(|image| images_to_pdf(&image, "خلاصه خطبه"));
    result.inspect_err(|e| error!("PDF export failed: {}", e))
}

/// Capture `subtree_id` and return it as a PNG.
///
/// # Errors
///
/// Any capture or encoding error.
pub fn to_png(page: &mut Page, subtree_id: &str, fonts: &FontSystem) -> Result<Vec<u8>, ExportError> {
    let result = capture(page, subtree_id, fonts).and_then(|image| {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    });
    result.inspect_err(|e| error!("PNG export failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fixtures::sample_record;
    use crate::views::SUMMARY_ROOT_ID;

    #[test]
    fn scope_swaps_and_restores() {
        let mut page = Page::new(&sample_record());
        let before = page.clone();
        {
            let scope = CaptureScope::enter(&mut page, SUMMARY_ROOT_ID).unwrap();
            assert!(!scope.stylesheet().uses_modern_colors());
            let mut visible_controls = 0;
            scope.subtree().walk(&mut |n| {
                if n.is_control() && !n.hidden {
                    visible_controls += 1;
                }
            });
            assert_eq!(visible_controls, 0);
        }
        assert_eq!(page, before);
    }

    #[test]
    fn unknown_subtree_leaves_page_untouched() {
        let mut page = Page::new(&sample_record());
        let before = page.clone();
        let err = CaptureScope::enter(&mut page, "missing").err().unwrap();
        assert!(matches!(err, ExportError::SubtreeNotFound(_)));
        assert_eq!(page, before);
    }

    #[test]
    fn slices_cover_the_whole_capture() {
        let image = RgbaImage::new(210, 700);
        let slices = page_slices(&image);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices.iter().map(RgbaImage::height).sum::<u32>(), 700);
        assert_eq!(slices[0].height(), 297);
    }

    #[test]
    fn writes_a_pdf_document() {
        let image = RgbaImage::from_pixel(105, 300, image::Rgba([255, 255, 255, 255]));
        let bytes = images_to_pdf(&image, "t").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
