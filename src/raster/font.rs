//! Font discovery and face resolution.

use std::path::Path;
use std::sync::Arc;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use tracing::{debug, warn};

use crate::errors::ExportError;

/// Families tried in order; all cover Arabic script.
pub const PREFERRED_FAMILIES: [&str; 6] = [
    "Vazirmatn",
    "B Nazanin",
    "Tahoma",
    "Noto Naskh Arabic",
    "Noto Sans Arabic",
    "DejaVu Sans",
];

/// A face's bytes plus its index within a collection file.
#[derive(Debug, Clone)]
pub struct ResolvedFace {
    pub bytes: Arc<[u8]>,
    pub index: u32,
}

/// Regular and bold faces used for every draw in one export.
#[derive(Debug, Clone)]
pub struct FontSystem {
    pub regular: ResolvedFace,
    pub bold: ResolvedFace,
}

fn resolve(db: &Database, weight: Weight) -> Option<ResolvedFace> {
    let mut families: Vec<Family<'_>> = PREFERRED_FAMILIES.iter().map(|f| Family::Name(f)).collect();
    families.push(Family::SansSerif);

    let id = db
        .query(&Query {
            families: &families,
            weight,
            style: Style::Normal,
            stretch: Stretch::Normal,
        })
        .or_else(|| db.faces().next().map(|f| f.id))?;

    db.with_face_data(id, |data, index| ResolvedFace {
        bytes: Arc::from(data),
        index,
    })
}

impl FontSystem {
    /// Load system fonts, plus `extra` when given, and pick the faces.
    ///
    /// # Errors
    ///
    /// `ExportError::Rasterize` when no usable face exists.
    pub fn new(extra: Option<&Path>) -> Result<Self, ExportError> {
        let mut db = Database::new();
        db.load_system_fonts();

        if let Some(path) = extra {
            if let Err(e) = db.load_font_file(path) {
                warn!(path = %path.display(), "Failed to load font file: {}", e);
            }
        }

        debug!(faces = db.len(), "Font database loaded");

        let regular = resolve(&db, Weight::NORMAL)
            .ok_or_else(|| ExportError::Rasterize("no usable font face found".to_string()))?;
        let bold = resolve(&db, Weight::BOLD).unwrap_or_else(|| regular.clone());

        Ok(Self { regular, bold })
    }

    /// Build from one font file, used for both weights.
    ///
    /// # Errors
    ///
    /// `ExportError::Rasterize` when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ExportError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ExportError::Rasterize(format!("{}: {e}", path.display())))?;
        rustybuzz::Face::from_slice(&bytes, 0)
            .ok_or_else(|| ExportError::Rasterize(format!("{}: not a font", path.display())))?;
        let face = ResolvedFace {
            bytes: Arc::from(bytes),
            index: 0,
        };
        Ok(Self {
            regular: face.clone(),
            bold: face,
        })
    }

    #[must_use]
    pub const fn face(&self, bold: bool) -> &ResolvedFace {
        if bold { &self.bold } else { &self.regular }
    }
}
