//! PDF highlight rendering.
//!
//! Loads the original case PDF, draws a stroked rectangle plus caption at
//! the mapped coordinates on the requested page, and writes a single-page
//! extract to the output directory. The source file is never modified.

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::info;

use super::coords::{parse_point_list, CoordinateTransform, HighlightRect};
use super::AnnotateError;
use crate::config::{CAPTION_FONT_SIZE, CAPTION_OFFSET_PTS};
use crate::segmentation::{BoundingBox, CoordinateSystem};

/// Font resource name used by the overlay content stream.
const CAPTION_FONT: &str = "FCaseline";

/// One annotation request against the original case PDF.
#[derive(Debug, Clone)]
pub struct AnnotationRequest<'a> {
    pub pdf_path: &'a Path,
    /// 1-based page number, as reported by retrieval metadata.
    pub page: usize,
    /// Serialized point list from retrieval metadata (untrusted).
    pub coordinates: &'a str,
    pub caption: &'a str,
    pub output_dir: &'a Path,
    /// Output file is `<output_dir>/<identifier>.pdf`.
    pub identifier: &'a str,
}

#[derive(Debug, Clone)]
pub struct PdfAnnotator {
    pub font_size: f64,
    pub caption_offset: f64,
}

impl Default for PdfAnnotator {
    fn default() -> Self {
        Self {
            font_size: CAPTION_FONT_SIZE,
            caption_offset: CAPTION_OFFSET_PTS,
        }
    }
}

impl PdfAnnotator {
    /// Render the highlight and write the single-page extract.
    ///
    /// `source` is the coordinate system the box is expressed in (the
    /// segmentation backend's canvas). Coordinate or page errors surface
    /// immediately — a silently wrong highlight is worse than a failed
    /// request.
    pub fn annotate(
        &self,
        request: &AnnotationRequest<'_>,
        source: CoordinateSystem,
    ) -> Result<PathBuf, AnnotateError> {
        let points = parse_point_list(request.coordinates)?;

        let mut doc = Document::load(request.pdf_path)?;
        let pages = doc.get_pages();
        let total = pages.len();
        if request.page < 1 || request.page > total {
            return Err(AnnotateError::PageOutOfRange {
                page: request.page,
                total,
            });
        }
        let page_id = *pages
            .get(&(request.page as u32))
            .ok_or(AnnotateError::PageOutOfRange {
                page: request.page,
                total,
            })?;

        let (page_width, page_height) = page_media_box(&doc, page_id)?;
        let transform = CoordinateTransform::new(source, page_width, page_height)?;
        let rect = transform.highlight_rect(&BoundingBox::new(points));

        ensure_caption_font(&mut doc, page_id)?;
        let overlay = self.overlay_content(&rect, request.caption, page_height)?;
        append_content(&mut doc, page_id, overlay)?;

        // Single-page extract: drop every other page, keep shared resources
        let others: Vec<u32> = pages
            .keys()
            .copied()
            .filter(|n| *n != request.page as u32)
            .collect();
        if !others.is_empty() {
            doc.delete_pages(&others);
        }
        doc.prune_objects();

        std::fs::create_dir_all(request.output_dir)?;
        let output_path = request
            .output_dir
            .join(format!("{}.pdf", sanitize_identifier(request.identifier)));
        doc.save(&output_path)?;

        info!(
            page = request.page,
            path = %output_path.display(),
            "annotated PDF written"
        );
        Ok(output_path)
    }

    /// Overlay stream: stroked unfilled rectangle plus the caption text a
    /// fixed offset above the box, both in red.
    fn overlay_content(
        &self,
        rect: &HighlightRect,
        caption: &str,
        page_height: f64,
    ) -> Result<Vec<u8>, AnnotateError> {
        let caption_y =
            (rect.y + rect.height + self.caption_offset).min(page_height - self.font_size);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("RG", vec![1.into(), 0.into(), 0.into()]),
                Operation::new("rg", vec![1.into(), 0.into(), 0.into()]),
                Operation::new("w", vec![1.5_f64.into()]),
                Operation::new(
                    "re",
                    vec![
                        rect.x.into(),
                        rect.y.into(),
                        rect.width.into(),
                        rect.height.into(),
                    ],
                ),
                Operation::new("S", vec![]),
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![CAPTION_FONT.into(), self.font_size.into()],
                ),
                Operation::new("Td", vec![rect.x.into(), caption_y.into()]),
                Operation::new("Tj", vec![Object::string_literal(caption)]),
                Operation::new("ET", vec![]),
                Operation::new("Q", vec![]),
            ],
        };
        Ok(content.encode()?)
    }
}

/// Physical page size in points, 1-based page number. Used by callers
/// that need the target width before reconstruction.
pub fn page_dimensions(pdf_path: &Path, page: usize) -> Result<(f64, f64), AnnotateError> {
    let doc = Document::load(pdf_path)?;
    let pages = doc.get_pages();
    let total = pages.len();
    let page_id = *pages
        .get(&(page as u32))
        .ok_or(AnnotateError::PageOutOfRange { page, total })?;
    page_media_box(&doc, page_id)
}

/// Resolve the page's MediaBox, walking up the Pages tree for inherited
/// values. Returns (width, height) in points. A cyclic Parent chain in a
/// malformed file terminates the walk instead of spinning.
fn page_media_box(doc: &Document, page_id: ObjectId) -> Result<(f64, f64), AnnotateError> {
    let mut current = page_id;
    let mut visited: Vec<ObjectId> = Vec::new();
    loop {
        if visited.contains(&current) {
            return Err(AnnotateError::MissingMediaBox);
        }
        visited.push(current);
        let dict = doc.get_object(current)?.as_dict()?;
        if let Ok(media_box) = dict.get(b"MediaBox") {
            let array = match media_box {
                Object::Reference(id) => doc.get_object(*id)?.as_array()?,
                other => other.as_array()?,
            };
            if array.len() != 4 {
                return Err(AnnotateError::MissingMediaBox);
            }
            let mut nums = [0.0f64; 4];
            for (i, obj) in array.iter().enumerate() {
                nums[i] = object_to_f64(obj)?;
            }
            return Ok((nums[2] - nums[0], nums[3] - nums[1]));
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(id)) => current = *id,
            _ => return Err(AnnotateError::MissingMediaBox),
        }
    }
}

fn object_to_f64(obj: &Object) -> Result<f64, AnnotateError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(r) => Ok(f64::from(*r)),
        _ => Err(AnnotateError::MissingMediaBox),
    }
}

/// Where a page's Resources dictionary lives.
#[derive(Clone, Copy)]
enum ResourcesSlot {
    OnPage,
    Indirect(ObjectId),
}

fn resources_dict(
    doc: &Document,
    page_id: ObjectId,
    slot: ResourcesSlot,
) -> Result<&lopdf::Dictionary, AnnotateError> {
    match slot {
        ResourcesSlot::Indirect(id) => Ok(doc.get_object(id)?.as_dict()?),
        ResourcesSlot::OnPage => Ok(doc
            .get_object(page_id)?
            .as_dict()?
            .get(b"Resources")?
            .as_dict()?),
    }
}

fn resources_dict_mut(
    doc: &mut Document,
    page_id: ObjectId,
    slot: ResourcesSlot,
) -> Result<&mut lopdf::Dictionary, AnnotateError> {
    match slot {
        ResourcesSlot::Indirect(id) => Ok(doc.get_object_mut(id)?.as_dict_mut()?),
        ResourcesSlot::OnPage => Ok(doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .get_mut(b"Resources")?
            .as_dict_mut()?),
    }
}

/// Make sure the page's resources carry a Helvetica font under our
/// resource name, creating or extending dictionaries as needed. Both the
/// Resources entry and its Font entry may be direct or indirect; an
/// existing font dictionary is extended in place so the page's own fonts
/// survive into the extract.
fn ensure_caption_font(doc: &mut Document, page_id: ObjectId) -> Result<(), AnnotateError> {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    // Read phase: where do the page's resources live?
    let slot = {
        let page = doc.get_object(page_id)?.as_dict()?;
        match page.get(b"Resources") {
            Ok(Object::Reference(id)) => Some(ResourcesSlot::Indirect(*id)),
            Ok(_) => Some(ResourcesSlot::OnPage),
            Err(_) => None,
        }
    };
    let slot = match slot {
        Some(slot) => slot,
        None => {
            let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
            page.set(
                "Resources",
                dictionary! {
                    "Font" => dictionary! { CAPTION_FONT => Object::Reference(font_id) },
                },
            );
            return Ok(());
        }
    };

    // Second read phase: is the Font entry inline or shared by reference?
    #[derive(Clone, Copy)]
    enum FontSlot {
        Inline,
        Shared(ObjectId),
        Missing,
    }
    let font_slot = match resources_dict(doc, page_id, slot)?.get(b"Font") {
        Ok(Object::Reference(id)) => FontSlot::Shared(*id),
        Ok(Object::Dictionary(_)) => FontSlot::Inline,
        _ => FontSlot::Missing,
    };

    match font_slot {
        FontSlot::Shared(fonts_id) => {
            let fonts = doc.get_object_mut(fonts_id)?.as_dict_mut()?;
            fonts.set(CAPTION_FONT, Object::Reference(font_id));
        }
        FontSlot::Inline => {
            let resources = resources_dict_mut(doc, page_id, slot)?;
            if let Ok(Object::Dictionary(fonts)) = resources.get_mut(b"Font") {
                fonts.set(CAPTION_FONT, Object::Reference(font_id));
            }
        }
        FontSlot::Missing => {
            let resources = resources_dict_mut(doc, page_id, slot)?;
            resources.set(
                "Font",
                dictionary! { CAPTION_FONT => Object::Reference(font_id) },
            );
        }
    }
    Ok(())
}

/// Append the overlay stream after the page's existing content, so the
/// highlight draws over the original page.
fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    overlay: Vec<u8>,
) -> Result<(), AnnotateError> {
    let stream_id = doc.add_object(Stream::new(dictionary! {}, overlay));

    enum Contents {
        Single(ObjectId),
        Array,
        Missing,
    }
    let disposition = {
        let page = doc.get_object(page_id)?.as_dict()?;
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => Contents::Single(*id),
            Ok(Object::Array(_)) => Contents::Array,
            _ => Contents::Missing,
        }
    };

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    match disposition {
        Contents::Single(existing) => {
            page.set(
                "Contents",
                vec![Object::Reference(existing), Object::Reference(stream_id)],
            );
        }
        Contents::Array => {
            if let Ok(Object::Array(array)) = page.get_mut(b"Contents") {
                array.push(Object::Reference(stream_id));
            }
        }
        Contents::Missing => {
            page.set("Contents", Object::Reference(stream_id));
        }
    }
    Ok(())
}

/// Identifiers come from caller-supplied queries; keep them filename-safe.
fn sanitize_identifier(identifier: &str) -> String {
    let cleaned: String = identifier
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.trim().is_empty() {
        "annotated".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal valid PDF: Pages node carries the MediaBox (exercises the
    /// inheritance walk), each page an empty content stream.
    fn write_minimal_pdf(path: &Path, page_count: usize, width: f64, height: f64) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for _ in 0..page_count {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    fn source() -> CoordinateSystem {
        CoordinateSystem {
            width: 1700.0,
            height: 2200.0,
        }
    }

    const BOX: &str = "(100.0, 200.0),(500.0, 200.0),(500.0, 300.0),(100.0, 300.0)";

    #[test]
    fn annotate_writes_single_page_extract() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("case.pdf");
        write_minimal_pdf(&pdf, 3, 612.0, 792.0);

        let out_dir = dir.path().join("out");
        let request = AnnotationRequest {
            pdf_path: &pdf,
            page: 2,
            coordinates: BOX,
            caption: "Question: shoulder history?",
            output_dir: &out_dir,
            identifier: "shoulder",
        };

        let written = PdfAnnotator::default().annotate(&request, source()).unwrap();
        assert_eq!(written, out_dir.join("shoulder.pdf"));

        let annotated = Document::load(&written).unwrap();
        assert_eq!(annotated.get_pages().len(), 1);

        // Original file untouched
        let original = Document::load(&pdf).unwrap();
        assert_eq!(original.get_pages().len(), 3);
    }

    #[test]
    fn page_out_of_range_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("case.pdf");
        write_minimal_pdf(&pdf, 2, 612.0, 792.0);

        let request = AnnotationRequest {
            pdf_path: &pdf,
            page: 5,
            coordinates: BOX,
            caption: "q",
            output_dir: dir.path(),
            identifier: "x",
        };

        let err = PdfAnnotator::default().annotate(&request, source()).unwrap_err();
        assert!(matches!(
            err,
            AnnotateError::PageOutOfRange { page: 5, total: 2 }
        ));
    }

    #[test]
    fn malformed_coordinates_fail_before_touching_output() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("case.pdf");
        write_minimal_pdf(&pdf, 1, 612.0, 792.0);

        let out_dir = dir.path().join("out");
        let request = AnnotationRequest {
            pdf_path: &pdf,
            page: 1,
            coordinates: "not coordinates at all",
            caption: "q",
            output_dir: &out_dir,
            identifier: "x",
        };

        let err = PdfAnnotator::default().annotate(&request, source()).unwrap_err();
        assert!(matches!(err, AnnotateError::BadCoordinates { .. }));
        assert!(!out_dir.exists(), "no output on a failed request");
    }

    #[test]
    fn shared_font_dictionary_is_extended_not_replaced() {
        // Real PDFs often point Resources/Font at a shared indirect
        // dictionary; the page's own fonts must survive annotation.
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let body_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Times-Roman",
        });
        let fonts_id = doc.add_object(dictionary! {
            "F1" => Object::Reference(body_font_id),
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => Object::Reference(fonts_id) },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 612.0_f64.into(), 792.0_f64.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("case.pdf");
        doc.save(&pdf).unwrap();

        let out_dir = dir.path().join("out");
        let request = AnnotationRequest {
            pdf_path: &pdf,
            page: 1,
            coordinates: BOX,
            caption: "q",
            output_dir: &out_dir,
            identifier: "fonts",
        };
        let written = PdfAnnotator::default().annotate(&request, source()).unwrap();

        let annotated = Document::load(&written).unwrap();
        let page_id = annotated.get_pages()[&1];
        let resources = annotated
            .get_object(page_id)
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap();
        let fonts = match resources.get(b"Font").unwrap() {
            Object::Reference(id) => annotated.get_object(*id).unwrap().as_dict().unwrap(),
            other => other.as_dict().unwrap(),
        };
        assert!(fonts.has(b"F1"), "page's own fonts must survive");
        assert!(fonts.has(CAPTION_FONT.as_bytes()));
    }

    #[test]
    fn cyclic_parent_chain_yields_missing_media_box() {
        let mut doc = Document::with_version("1.5");
        let a = doc.new_object_id();
        let b = doc.new_object_id();
        doc.objects.insert(
            a,
            Object::Dictionary(dictionary! { "Parent" => Object::Reference(b) }),
        );
        doc.objects.insert(
            b,
            Object::Dictionary(dictionary! { "Parent" => Object::Reference(a) }),
        );

        let err = page_media_box(&doc, a).unwrap_err();
        assert!(matches!(err, AnnotateError::MissingMediaBox));
    }

    #[test]
    fn page_dimensions_resolve_inherited_media_box() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("case.pdf");
        write_minimal_pdf(&pdf, 2, 595.0, 842.0);

        let (w, h) = page_dimensions(&pdf, 1).unwrap();
        assert_eq!((w, h), (595.0, 842.0));
    }

    #[test]
    fn identifier_is_made_filename_safe() {
        assert_eq!(
            sanitize_identifier("what/about: this?"),
            "what_about_ this_"
        );
        assert_eq!(sanitize_identifier("   "), "annotated");
        assert_eq!(sanitize_identifier("plain"), "plain");
    }
}
