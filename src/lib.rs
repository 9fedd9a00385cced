//! Caseline reconstructs scanned medical records into a chronological,
//! deduplicated timeline of clinical events with page-level provenance,
//! and renders highlight annotations back onto the original PDF.
//!
//! Segmentation (OCR) and retrieval (vector search) are external
//! collaborators behind narrow traits; everything in this crate is the
//! processing core between them.

pub mod annotate;
pub mod config;
pub mod events;
pub mod layout;
pub mod processor;
pub mod retrieval;
pub mod segmentation;

pub use processor::{
    ProcessingError, ProcessingOutput, ProcessingSummary, ProcessorConfig, RecordProcessor,
};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the CLI. Honors `RUST_LOG`, falling back to the
/// crate default filter. Call at most once per process.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
