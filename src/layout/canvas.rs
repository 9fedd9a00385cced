//! 2D character grid synthesis.
//!
//! Paints each positioned element's text onto a character grid at scaled
//! pixel-to-character coordinates, inserts page separators, and serializes
//! the grid into per-page text sections. Writes outside the grid are
//! silently dropped — the grid never grows and never panics on a noisy
//! coordinate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{DEFAULT_PAGE_WIDTH_PTS, DEFAULT_ROWS_PER_PAGE};
use crate::segmentation::{PositionedElement, SegmentedDocument};

/// How elements map to grid rows.
///
/// Scanned forms with noisy y-coordinates reconstruct more robustly with
/// one row per element; documents needing vertical proportions intact can
/// opt into scaled-y placement instead. Downstream consumers differ on
/// which they want, so it is a knob rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPlacement {
    /// Each element occupies its own row, in recognition order.
    #[default]
    PerElement,
    /// Row index proportional to the element's y coordinate.
    ScaledY,
}

#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Physical width of the target PDF page, in points. Also the grid
    /// width in character cells.
    pub target_page_width: f64,
    pub row_placement: RowPlacement,
    /// Rows allotted per page in `ScaledY` mode.
    pub rows_per_page: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            target_page_width: DEFAULT_PAGE_WIDTH_PTS,
            row_placement: RowPlacement::default(),
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

/// Mutable character grid. Owned by `reconstruct` during synthesis and
/// discarded after serialization.
struct LayoutCanvas {
    width: usize,
    height: usize,
    grid: Vec<Vec<char>>,
}

impl LayoutCanvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            grid: vec![vec![' '; width]; height],
        }
    }

    /// Write one character, silently dropping out-of-bounds cells.
    fn put(&mut self, row: usize, col: i64, ch: char) {
        if row >= self.height || col < 0 {
            return;
        }
        let col = col as usize;
        if col < self.width {
            self.grid[row][col] = ch;
        }
    }

    /// Write a string one character per cell starting at `col`.
    fn write_str(&mut self, row: usize, col: i64, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            self.put(row, col + i as i64, ch);
        }
    }

    /// Serialize rows `[start, end)` with trailing blanks trimmed per row.
    fn rows_to_string(&self, start: usize, end: usize) -> String {
        let end = end.min(self.height);
        let start = start.min(end);
        self.grid[start..end]
            .iter()
            .map(|row| {
                let line: String = row.iter().collect();
                line.trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Per-page serialized layout for one document.
#[derive(Debug, Clone)]
pub struct ReconstructedDocument {
    /// One text section per page, ascending page order. Each section
    /// carries its separator line, its element rows, and two trailing
    /// blank rows.
    pub page_texts: Vec<String>,
    /// Physical page number of each section, parallel to `page_texts`.
    pub page_numbers: Vec<usize>,
    pub source_width: f64,
    pub source_height: f64,
}

/// Synthesize the layout grid for one document and serialize it per page.
///
/// Elements are regrouped by their own `page_number` and pages processed
/// in ascending numeric order — OCR output order is not guaranteed
/// monotonic. The horizontal scale is shared across all pages of the
/// document (single coordinate system per scanned record).
pub fn reconstruct(doc: &SegmentedDocument, options: &LayoutOptions) -> ReconstructedDocument {
    let mut pages: BTreeMap<usize, Vec<&PositionedElement>> = BTreeMap::new();
    for element in doc.elements() {
        pages.entry(element.page_number).or_default().push(element);
    }
    // Pages with zero recognized elements still get their separator
    for page in &doc.pages {
        pages.entry(page.page_number).or_default();
    }

    let source_width = doc.coordinate_system.width;
    let source_height = doc.coordinate_system.height;
    let scale_x = if source_width > 0.0 {
        options.target_page_width / source_width
    } else {
        warn!(source_width, "non-positive coordinate system width, using scale 1.0");
        1.0
    };

    let width = (options.target_page_width.floor() as usize).max(1);
    let total_elements: usize = pages.values().map(|v| v.len()).sum();
    let height = match options.row_placement {
        RowPlacement::PerElement => total_elements + 3 * pages.len(),
        RowPlacement::ScaledY => pages.len() * (options.rows_per_page + 3),
    };

    let mut canvas = LayoutCanvas::new(width, height);
    let mut page_texts = Vec::with_capacity(pages.len());
    let mut page_numbers = Vec::with_capacity(pages.len());
    let mut y_offset = 0usize;

    for (page_number, elements) in &pages {
        page_numbers.push(*page_number);
        let page_start = y_offset;

        let separator = format!("--- Page {page_number} ---");
        let start_x = width.saturating_sub(separator.chars().count()) / 2;
        canvas.write_str(y_offset, start_x as i64, &separator);
        y_offset += 1;

        match options.row_placement {
            RowPlacement::PerElement => {
                for element in elements {
                    let col = (element.bounding_box.top_left().x * scale_x).floor() as i64;
                    canvas.write_str(y_offset, col, &element.text);
                    y_offset += 1;
                }
            }
            RowPlacement::ScaledY => {
                let row_scale = if source_height > 0.0 {
                    options.rows_per_page as f64 / source_height
                } else {
                    0.0
                };
                for element in elements {
                    let anchor = element.bounding_box.top_left();
                    let row_in_page = (anchor.y.max(0.0) * row_scale).floor() as usize;
                    let row = y_offset + row_in_page.min(options.rows_per_page.saturating_sub(1));
                    let col = (anchor.x * scale_x).floor() as i64;
                    canvas.write_str(row, col, &element.text);
                }
                y_offset += options.rows_per_page;
            }
        }

        // Two blank separator rows after each page
        y_offset += 2;
        page_texts.push(canvas.rows_to_string(page_start, y_offset));
    }

    ReconstructedDocument {
        page_texts,
        page_numbers,
        source_width,
        source_height,
    }
}
