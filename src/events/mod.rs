//! Event extraction and deduplication.
//!
//! Scans the reconstructed layout text for date-anchored clinical events,
//! collapses near-identical mentions by content hash, and produces the
//! chronological timeline with page/position provenance.

pub mod dedup;
pub mod export;
pub mod extractor;
pub mod types;

pub use dedup::{content_hash, EventDeduplicator};
pub use extractor::EventExtractor;
pub use types::{CanonicalEvent, DedupConfig, RawEvent, Timeline};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("Page {page} span {start}..{end} is outside the layout text (len {len})")]
    SpanOutOfBounds {
        page: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
