use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::SegmentationError;

/// A point in the segmentation backend's coordinate space (top-left origin,
/// y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Quadrilateral around a text fragment, ordered top-left, top-right,
/// bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub points: [Point; 4],
}

impl BoundingBox {
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Axis-aligned box from opposing corners.
    pub fn from_corners(top_left: Point, bottom_right: Point) -> Self {
        Self {
            points: [
                top_left,
                Point::new(bottom_right.x, top_left.y),
                bottom_right,
                Point::new(top_left.x, bottom_right.y),
            ],
        }
    }

    /// Anchor corner used for layout placement.
    pub fn top_left(&self) -> Point {
        self.points[0]
    }

    /// Diagonal corner of `top_left`.
    pub fn bottom_right(&self) -> Point {
        self.points[2]
    }
}

/// One OCR-recognized text fragment with its position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedElement {
    pub text: String,
    /// 1-based within the owning document.
    pub page_number: usize,
    pub bounding_box: BoundingBox,
}

/// The pixel/unit system bounding boxes are expressed in. Reported once
/// per document by the segmentation backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    pub width: f64,
    pub height: f64,
}

/// All elements recognized on one page. A page with no recognized text
/// still appears, with an empty element list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedPage {
    /// 1-based within the owning document.
    pub page_number: usize,
    pub elements: Vec<PositionedElement>,
}

/// Segmentation output for one document (or one batch of a large
/// document). Backends number pages from 1 per request; callers that
/// split or combine requests anchor the numbers back to the physical
/// document with [`SegmentedDocument::renumber_from`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedDocument {
    pub coordinate_system: CoordinateSystem,
    pub pages: Vec<SegmentedPage>,
}

impl SegmentedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Highest page number carried by any page, 0 when empty.
    pub fn max_page_number(&self) -> usize {
        self.pages.iter().map(|p| p.page_number).max().unwrap_or(0)
    }

    /// Shift every page (and its elements) forward by `offset` physical
    /// pages. Used to anchor a batch's 1-based numbering into the full
    /// document.
    pub fn renumber_from(&mut self, offset: usize) {
        if offset == 0 {
            return;
        }
        for page in &mut self.pages {
            page.page_number += offset;
            for element in &mut page.elements {
                element.page_number += offset;
            }
        }
    }

    pub fn element_count(&self) -> usize {
        self.pages.iter().map(|p| p.elements.len()).sum()
    }

    /// All elements across pages, in page order then recognition order.
    pub fn elements(&self) -> impl Iterator<Item = &PositionedElement> {
        self.pages.iter().flat_map(|p| p.elements.iter())
    }
}

/// Segmentation backend abstraction (allows mocking for tests).
///
/// `segment_range` takes 0-based half-open page ranges so large documents
/// can be submitted in batches; the returned document renumbers its pages
/// from 1.
pub trait DocumentSegmenter {
    fn page_count(&self, path: &Path) -> Result<usize, SegmentationError>;

    fn segment_range(
        &self,
        path: &Path,
        pages: Range<usize>,
    ) -> Result<SegmentedDocument, SegmentationError>;

    fn segment(&self, path: &Path) -> Result<SegmentedDocument, SegmentationError> {
        let total = self.page_count(path)?;
        self.segment_range(path, 0..total)
    }
}

/// Load pre-computed segmentation output from a JSON file (the CLI's
/// input format; also what fixtures serialize to).
///
/// Each document on disk numbers its pages from 1; on load, every
/// document after the first is shifted past the highest page number seen
/// so far, so the set carries one continuous physical numbering.
pub fn load_segmented_documents(path: &Path) -> Result<Vec<SegmentedDocument>, SegmentationError> {
    let raw = std::fs::read_to_string(path)?;
    let mut documents: Vec<SegmentedDocument> = serde_json::from_str(&raw)?;
    let mut offset = 0;
    for doc in &mut documents {
        doc.renumber_from(offset);
        offset = offset.max(doc.max_page_number());
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn bounding_box_corners() {
        let b = BoundingBox::from_corners(Point::new(1.0, 2.0), Point::new(9.0, 8.0));
        assert_eq!(b.top_left(), Point::new(1.0, 2.0));
        assert_eq!(b.bottom_right(), Point::new(9.0, 8.0));
        // top-right and bottom-left are derived
        assert_eq!(b.points[1], Point::new(9.0, 2.0));
        assert_eq!(b.points[3], Point::new(1.0, 8.0));
    }

    #[test]
    fn element_count_sums_pages() {
        let doc = SegmentedDocument {
            coordinate_system: CoordinateSystem {
                width: 100.0,
                height: 100.0,
            },
            pages: vec![
                SegmentedPage {
                    page_number: 1,
                    elements: vec![element("a", 1, 0.0, 0.0), element("b", 1, 0.0, 20.0)],
                },
                SegmentedPage {
                    page_number: 2,
                    elements: vec![element("c", 2, 0.0, 0.0)],
                },
            ],
        };

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.element_count(), 3);
        assert_eq!(doc.elements().count(), 3);
    }

    #[test]
    fn segmented_documents_roundtrip_json() {
        let doc = SegmentedDocument {
            coordinate_system: CoordinateSystem {
                width: 1700.0,
                height: 2200.0,
            },
            pages: vec![SegmentedPage {
                page_number: 1,
                elements: vec![element("Visit on 01/15/2021", 1, 120.0, 340.0)],
            }],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elements.json");
        std::fs::write(&path, serde_json::to_string(&vec![doc.clone()]).unwrap()).unwrap();

        let loaded = load_segmented_documents(&path).unwrap();
        assert_eq!(loaded, vec![doc]);
    }

    #[test]
    fn renumber_shifts_pages_and_elements_together() {
        let mut doc = SegmentedDocument {
            coordinate_system: CoordinateSystem {
                width: 100.0,
                height: 100.0,
            },
            pages: vec![SegmentedPage {
                page_number: 1,
                elements: vec![element("a", 1, 0.0, 0.0)],
            }],
        };

        doc.renumber_from(10);
        assert_eq!(doc.pages[0].page_number, 11);
        assert_eq!(doc.pages[0].elements[0].page_number, 11);
        assert_eq!(doc.max_page_number(), 11);
    }

    #[test]
    fn loaded_documents_carry_continuous_page_numbers() {
        let make = |text: &str| SegmentedDocument {
            coordinate_system: CoordinateSystem {
                width: 100.0,
                height: 100.0,
            },
            pages: vec![
                SegmentedPage {
                    page_number: 1,
                    elements: vec![element(text, 1, 0.0, 0.0)],
                },
                SegmentedPage {
                    page_number: 2,
                    elements: vec![],
                },
            ],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elements.json");
        let docs = vec![make("first"), make("second")];
        std::fs::write(&path, serde_json::to_string(&docs).unwrap()).unwrap();

        let loaded = load_segmented_documents(&path).unwrap();
        let numbers: Vec<usize> = loaded
            .iter()
            .flat_map(|d| d.pages.iter().map(|p| p.page_number))
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(loaded[1].pages[0].elements[0].page_number, 3);
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elements.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_segmented_documents(&path).unwrap_err();
        assert!(matches!(err, SegmentationError::Json(_)));
    }
}
