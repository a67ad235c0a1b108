//! Exporters: Word document, raster PDF/PNG and quote posters

pub mod docx;
pub mod pdf;
pub mod poster;

pub use docx::to_document;
pub use pdf::{to_pdf, to_png};
pub use poster::{PosterFormat, PosterJob, PosterState, render_poster};
