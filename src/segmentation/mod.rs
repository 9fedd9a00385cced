//! Document Segmentation Service contract.
//!
//! A segmentation backend (cloud OCR, local engine) turns a scanned PDF
//! into positioned text elements per page. The core never talks to such a
//! service directly — it consumes `SegmentedDocument` values through the
//! `DocumentSegmenter` trait, so tests run against fixtures and the CLI
//! can load pre-computed segmentation output from JSON.

pub mod batch;
pub mod types;

pub use batch::segment_batched;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed segmentation output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Segmentation backend failed: {0}")]
    Backend(String),

    #[error("Invalid page range {start}..{end} for a {total}-page document")]
    PageRange {
        start: usize,
        end: usize,
        total: usize,
    },

    #[error("Document {index} reports zero pages")]
    EmptyDocument { index: usize },
}
