//! Coordinate-space annotation.
//!
//! Maps a bounding box from the segmentation backend's coordinate space
//! into PDF page space and renders a highlight overlay (stroked rectangle
//! plus caption) merged onto a single-page extract of the original PDF.

pub mod coords;
pub mod pdf;

pub use coords::{parse_point_list, CoordinateTransform, HighlightRect};
pub use pdf::{page_dimensions, AnnotationRequest, PdfAnnotator};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Page {page} out of range 1..={total}")]
    PageOutOfRange { page: usize, total: usize },

    #[error("Malformed coordinates {input:?}: {reason}")]
    BadCoordinates { input: String, reason: String },

    #[error("Page has no MediaBox")]
    MissingMediaBox,

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}
