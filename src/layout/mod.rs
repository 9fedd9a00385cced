//! Layout reconstruction.
//!
//! Turns the bag of positioned OCR text fragments into a 2D character
//! grid that preserves visual layout (tables, columns, page structure),
//! then serializes the grid into one linearizable text blob with a
//! page/offset index. The blob doubles as an audit artifact and as the
//! event scanner's input.

pub mod artifact;
pub mod canvas;
pub mod page_index;

pub use artifact::write_layout_artifact;
pub use canvas::{reconstruct, LayoutOptions, ReconstructedDocument, RowPlacement};
pub use page_index::{PageIndex, PageSpan};

use thiserror::Error;

use crate::segmentation::SegmentedDocument;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document {index} reports zero pages")]
    EmptyDocument { index: usize },
}

/// Fully reconstructed layout for a set of documents: one text blob plus
/// the index mapping global offsets back to page numbers.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub text: String,
    pub index: PageIndex,
    /// Source coordinate-system dimensions, reported by the segmentation
    /// backend and needed later for annotation scaling.
    pub source_width: f64,
    pub source_height: f64,
}

/// Reconstruct every document and build the combined page index.
///
/// The coordinate system of the first document is taken as the source
/// canvas size for the whole set — batches of one scanned record share a
/// single coordinate system.
pub fn reconstruct_all(
    documents: &[SegmentedDocument],
    options: &LayoutOptions,
) -> Result<LayoutResult, LayoutError> {
    let first = documents
        .first()
        .ok_or(LayoutError::EmptyDocument { index: 0 })?;
    let source_width = first.coordinate_system.width;
    let source_height = first.coordinate_system.height;

    let per_doc: Vec<Vec<(usize, String)>> = documents
        .iter()
        .map(|doc| {
            let r = reconstruct(doc, options);
            r.page_numbers.into_iter().zip(r.page_texts).collect()
        })
        .collect();

    let (text, index) = PageIndex::build(&per_doc)?;

    Ok(LayoutResult {
        text,
        index,
        source_width,
        source_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::{
        BoundingBox, CoordinateSystem, Point, PositionedElement, SegmentedPage,
    };

    fn doc(pages: Vec<SegmentedPage>) -> SegmentedDocument {
        SegmentedDocument {
            coordinate_system: CoordinateSystem {
                width: 100.0,
                height: 100.0,
            },
            pages,
        }
    }

    fn element(text: &str, page: usize, x: f64, y: f64) -> PositionedElement {
        PositionedElement {
            text: text.to_string(),
            page_number: page,
            bounding_box: BoundingBox::from_corners(
                Point::new(x, y),
                Point::new(x + 10.0, y + 10.0),
            ),
        }
    }

    #[test]
    fn reconstruct_all_spans_cover_both_documents() {
        let a = doc(vec![SegmentedPage {
            page_number: 1,
            elements: vec![element("first doc", 1, 0.0, 10.0)],
        }]);
        let b = doc(vec![SegmentedPage {
            page_number: 2,
            elements: vec![element("second doc", 2, 0.0, 10.0)],
        }]);

        let result = reconstruct_all(&[a, b], &LayoutOptions::default()).unwrap();
        assert_eq!(result.index.page_count(), 2);
        assert!(result.text.contains("first doc"));
        assert!(result.text.contains("second doc"));

        let pos = result.text.find("second doc").unwrap();
        assert_eq!(result.index.lookup(pos), 2);
    }

    #[test]
    fn index_keeps_physical_numbers_across_a_gap() {
        // Two surviving batches of a larger document, the middle one lost:
        // offsets in the second batch must resolve to its physical pages.
        let a = doc(vec![SegmentedPage {
            page_number: 1,
            elements: vec![element("intake note", 1, 0.0, 10.0)],
        }]);
        let b = doc(vec![SegmentedPage {
            page_number: 21,
            elements: vec![element("discharge note", 21, 0.0, 10.0)],
        }]);

        let result = reconstruct_all(&[a, b], &LayoutOptions::default()).unwrap();
        let pos = result.text.find("discharge note").unwrap();
        assert_eq!(result.index.lookup(pos), 21);
        assert!(result.text.contains("--- Page 21 ---"));
    }

    #[test]
    fn reconstruct_all_requires_a_document() {
        let err = reconstruct_all(&[], &LayoutOptions::default()).unwrap_err();
        assert!(matches!(err, LayoutError::EmptyDocument { index: 0 }));
    }
}
