//! Coordinate parsing and mapping.
//!
//! Retrieval matches carry their bounding box as a serialized point list,
//! e.g. `(120.0, 340.5),(480.0, 340.5),(480.0, 390.0),(120.0, 390.0)`.
//! The parser accepts exactly that grammar (optionally bracket-wrapped)
//! and rejects everything else — the metadata is untrusted, so nothing
//! short of four numeric tuples goes through.

use crate::segmentation::{BoundingBox, CoordinateSystem, Point};

use super::AnnotateError;

fn bad(input: &str, reason: impl Into<String>) -> AnnotateError {
    AnnotateError::BadCoordinates {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Parse a serialized 4-point list. Strict: four `(x, y)` tuples of plain
/// decimal numbers, comma-separated, with an optional surrounding
/// `[` `]` or `(` `)` wrapper. Anything else is an error.
pub fn parse_point_list(raw: &str) -> Result<[Point; 4], AnnotateError> {
    let mut s = raw.trim();
    if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        s = inner.trim();
    } else if s.starts_with("((") && s.ends_with("))") {
        // Tuple-of-tuples rendering: strip one outer layer
        s = s[1..s.len() - 1].trim();
    }

    let mut points = Vec::new();
    let mut rest = s;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        if !points.is_empty() {
            rest = rest
                .strip_prefix(',')
                .ok_or_else(|| bad(raw, "expected ',' between points"))?
                .trim_start();
        }
        let inner = rest
            .strip_prefix('(')
            .ok_or_else(|| bad(raw, "expected '('"))?;
        let close = inner
            .find(')')
            .ok_or_else(|| bad(raw, "unterminated point"))?;
        let body = &inner[..close];
        rest = &inner[close + 1..];

        let mut parts = body.split(',');
        let x = parse_number(raw, parts.next())?;
        let y = parse_number(raw, parts.next())?;
        if parts.next().is_some() {
            return Err(bad(raw, "point has more than two components"));
        }
        points.push(Point::new(x, y));
    }

    if points.len() != 4 {
        return Err(bad(raw, format!("expected 4 points, found {}", points.len())));
    }
    Ok([points[0], points[1], points[2], points[3]])
}

fn parse_number(input: &str, token: Option<&str>) -> Result<f64, AnnotateError> {
    let token = token.ok_or_else(|| bad(input, "point is missing a component"))?.trim();
    token
        .parse::<f64>()
        .map_err(|_| bad(input, format!("not a number: {token:?}")))
}

/// A highlight rectangle in PDF page space: bottom-left origin, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Per-request transform from the segmentation backend's coordinate space
/// (top-left origin) into the target page's point space (bottom-left
/// origin). Horizontal and vertical scales are independent — scans are
/// not assumed uniform.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub source_width: f64,
    pub source_height: f64,
    pub target_width: f64,
    pub target_height: f64,
}

impl CoordinateTransform {
    pub fn new(
        source: CoordinateSystem,
        target_width: f64,
        target_height: f64,
    ) -> Result<Self, AnnotateError> {
        if source.width <= 0.0 || source.height <= 0.0 {
            return Err(AnnotateError::InvalidGeometry(format!(
                "source canvas {}x{} is degenerate",
                source.width, source.height
            )));
        }
        if target_width <= 0.0 || target_height <= 0.0 {
            return Err(AnnotateError::InvalidGeometry(format!(
                "target page {target_width}x{target_height} is degenerate"
            )));
        }
        Ok(Self {
            scale_x: target_width / source.width,
            scale_y: target_height / source.height,
            source_width: source.width,
            source_height: source.height,
            target_width,
            target_height,
        })
    }

    pub fn map_point(&self, p: Point) -> Point {
        Point::new(p.x * self.scale_x, p.y * self.scale_y)
    }

    /// Map the box's diagonal corners (points 0 and 2) and flip the
    /// vertical axis: the OCR origin is top-left, the PDF origin
    /// bottom-left.
    pub fn highlight_rect(&self, bbox: &BoundingBox) -> HighlightRect {
        let top_left = self.map_point(bbox.top_left());
        let bottom_right = self.map_point(bbox.bottom_right());
        HighlightRect {
            x: top_left.x,
            y: self.target_height - bottom_right.y,
            width: bottom_right.x - top_left.x,
            height: bottom_right.y - top_left.y,
        }
    }
}
