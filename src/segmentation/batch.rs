//! Batch decomposition for large documents.
//!
//! Segmentation backends often cap the page count per request. Documents
//! over the limit are split into sequential page ranges, each submitted
//! independently, and the surviving results concatenated in original
//! order. A failed batch is logged and skipped, and every surviving
//! batch keeps its physical page numbers, so a skip never shifts the
//! provenance of the pages that follow it.

use std::path::Path;

use tracing::{info, warn};

use super::types::{DocumentSegmenter, SegmentedDocument};
use super::SegmentationError;

/// Segment `path`, splitting into batches of at most `page_limit` pages.
///
/// Returns one `SegmentedDocument` per batch, in page order, each
/// renumbered back to its absolute position in the document. Errors only
/// if the page count cannot be determined or the document is empty;
/// individual batch failures are logged and that batch is skipped.
pub fn segment_batched<S: DocumentSegmenter + ?Sized>(
    segmenter: &S,
    path: &Path,
    page_limit: usize,
) -> Result<Vec<SegmentedDocument>, SegmentationError> {
    let total = segmenter.page_count(path)?;
    if total == 0 {
        return Err(SegmentationError::EmptyDocument { index: 0 });
    }
    let limit = page_limit.max(1);

    if total <= limit {
        return Ok(vec![segmenter.segment_range(path, 0..total)?]);
    }

    info!(total_pages = total, page_limit = limit, "splitting document into batches");

    let mut results = Vec::new();
    let mut start = 0;
    while start < total {
        let end = (start + limit).min(total);
        match segmenter.segment_range(path, start..end) {
            Ok(mut doc) => {
                // Backend numbers the batch from 1; anchor to the document
                doc.renumber_from(start);
                results.push(doc);
            }
            Err(e) => {
                warn!(
                    batch_start = start,
                    batch_end = end,
                    error = %e,
                    "segmentation batch failed, skipping"
                );
            }
        }
        start = end;
    }

    Ok(results)
}
