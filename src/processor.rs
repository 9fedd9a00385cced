//! Record processing orchestrator.
//!
//! Single entry point that drives the full pipeline: segmentation (with
//! batch decomposition) → layout reconstruction (+ audit artifact) →
//! event extraction → deduplication → timeline. The annotation path is a
//! separate entry taking one retrieval match.
//!
//! Everything here is synchronous and stateless across calls; the layout
//! grid and page index are built fresh per run and discarded.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::annotate::{AnnotateError, AnnotationRequest, PdfAnnotator};
use crate::config::{DEFAULT_BATCH_PAGE_LIMIT, DEFAULT_EVENT_WINDOW};
use crate::events::{
    DedupConfig, EventDeduplicator, EventError, EventExtractor, Timeline,
};
use crate::layout::{
    reconstruct_all, write_layout_artifact, LayoutError, LayoutOptions, LayoutResult,
};
use crate::retrieval::RetrievalMatch;
use crate::segmentation::{
    segment_batched, CoordinateSystem, DocumentSegmenter, SegmentationError, SegmentedDocument,
};

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Segmentation failed: {0}")]
    Segmentation(#[from] SegmentationError),

    #[error("Layout reconstruction failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Event processing failed: {0}")]
    Event(#[from] EventError),

    #[error("Annotation failed: {0}")]
    Annotate(#[from] AnnotateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Context window for event descriptions, in characters.
    pub max_event_length: usize,
    pub layout: LayoutOptions,
    /// Documents over this many pages are segmented in batches.
    pub batch_page_limit: usize,
    pub dedup: DedupConfig,
    /// Where to persist the layout blob for audit; `None` skips the write.
    pub layout_artifact: Option<PathBuf>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_event_length: DEFAULT_EVENT_WINDOW,
            layout: LayoutOptions::default(),
            batch_page_limit: DEFAULT_BATCH_PAGE_LIMIT,
            dedup: DedupConfig::default(),
            layout_artifact: None,
        }
    }
}

/// Run summary for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingSummary {
    pub documents: usize,
    pub pages: usize,
    pub elements: usize,
    pub raw_events: usize,
    pub canonical_events: usize,
    pub duplicate_mentions: usize,
}

pub struct ProcessingOutput {
    pub timeline: Timeline,
    pub layout: LayoutResult,
    pub summary: ProcessingSummary,
}

pub struct RecordProcessor {
    config: ProcessorConfig,
}

impl Default for RecordProcessor {
    fn default() -> Self {
        Self::new(ProcessorConfig::default())
    }
}

impl RecordProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// Segment `path` through the given backend (batched as configured)
    /// and process the result.
    pub fn process_file<S: DocumentSegmenter + ?Sized>(
        &self,
        segmenter: &S,
        path: &Path,
    ) -> Result<ProcessingOutput, ProcessingError> {
        let documents = segment_batched(segmenter, path, self.config.batch_page_limit)?;
        self.process(&documents)
    }

    /// Build the timeline from already-segmented documents.
    pub fn process(
        &self,
        documents: &[SegmentedDocument],
    ) -> Result<ProcessingOutput, ProcessingError> {
        let layout = reconstruct_all(documents, &self.config.layout)?;

        if let Some(path) = &self.config.layout_artifact {
            write_layout_artifact(path, &layout.text)?;
        }

        let extractor = EventExtractor::new(self.config.max_event_length);
        let raw_events = extractor.extract(&layout.text, &layout.index);
        let raw_count = raw_events.len();

        let timeline = EventDeduplicator::new(self.config.dedup).organize(raw_events);
        let duplicate_mentions: usize = timeline.iter().map(|e| e.duplicate_count).sum();

        let summary = ProcessingSummary {
            documents: documents.len(),
            pages: layout.index.page_count(),
            elements: documents.iter().map(|d| d.element_count()).sum(),
            raw_events: raw_count,
            canonical_events: timeline.len(),
            duplicate_mentions,
        };

        info!(
            documents = summary.documents,
            pages = summary.pages,
            raw_events = summary.raw_events,
            canonical_events = summary.canonical_events,
            "record processed"
        );

        Ok(ProcessingOutput {
            timeline,
            layout,
            summary,
        })
    }

    /// Highlight one retrieval match on the original case PDF. `source`
    /// is the coordinate system the match's box is expressed in (from the
    /// layout result).
    pub fn annotate_match(
        &self,
        pdf_path: &Path,
        matched: &RetrievalMatch,
        caption: &str,
        output_dir: &Path,
        source: CoordinateSystem,
    ) -> Result<PathBuf, ProcessingError> {
        let request = AnnotationRequest {
            pdf_path,
            page: matched.page,
            coordinates: &matched.coordinates,
            caption,
            output_dir,
            identifier: caption,
        };
        Ok(PdfAnnotator::default().annotate(&request, source)?)
    }
}
