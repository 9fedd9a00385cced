//! Maps global character offsets in the concatenated layout text back to
//! page numbers.

use super::LayoutError;

/// Half-open byte range one page occupies in the concatenated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    pub start: usize,
    pub end: usize,
    /// 1-based physical page number, as carried by the input.
    pub page_number: usize,
}

/// Built once per document set. Spans are contiguous, non-overlapping,
/// and together cover exactly the concatenated text.
#[derive(Debug, Clone)]
pub struct PageIndex {
    spans: Vec<PageSpan>,
    total_len: usize,
}

impl PageIndex {
    /// Concatenate each document's `(page_number, text)` sections in
    /// document order and record the range every page occupies. Page
    /// numbers are taken as given — they are the physical numbers the
    /// upstream anchoring produced, and a gap (a skipped batch) stays a
    /// gap rather than pulling later pages forward.
    ///
    /// Page sections are joined with a newline, which is counted into the
    /// preceding page's span; the whole blob is trimmed of surrounding
    /// whitespace with spans adjusted to match.
    ///
    /// Errors if any document reports zero pages — degenerate input the
    /// caller should have filtered.
    pub fn build(documents: &[Vec<(usize, String)>]) -> Result<(String, Self), LayoutError> {
        let mut full = String::new();
        let mut spans: Vec<PageSpan> = Vec::new();
        let total_docs = documents.len();

        for (doc_index, pages) in documents.iter().enumerate() {
            if pages.is_empty() {
                return Err(LayoutError::EmptyDocument { index: doc_index });
            }
            for (i, (page_number, page_text)) in pages.iter().enumerate() {
                let start = full.len();
                full.push_str(page_text);
                let is_last = doc_index + 1 == total_docs && i + 1 == pages.len();
                if !is_last {
                    full.push('\n');
                }
                spans.push(PageSpan {
                    start,
                    end: full.len(),
                    page_number: *page_number,
                });
            }
        }

        // Trim surrounding whitespace and shift spans accordingly. Only
        // the first and last pages can shrink; interior spans keep their
        // relative positions.
        let lead = full.len() - full.trim_start().len();
        let text = full.trim().to_string();
        let total_len = text.len();
        for span in &mut spans {
            span.start = span.start.saturating_sub(lead).min(total_len);
            span.end = span.end.saturating_sub(lead).min(total_len);
        }

        Ok((text, Self { spans, total_len }))
    }

    /// Page number containing `global_offset`. Offsets at or beyond the
    /// total length clamp to the last page — lookups are total, never a
    /// range panic.
    pub fn lookup(&self, global_offset: usize) -> usize {
        for span in &self.spans {
            if global_offset >= span.start && global_offset < span.end {
                return span.page_number;
            }
        }
        self.spans.last().map(|s| s.page_number).unwrap_or(1)
    }

    pub fn spans(&self) -> &[PageSpan] {
        &self.spans
    }

    pub fn page_count(&self) -> usize {
        self.spans.len()
    }

    pub fn total_len(&self) -> usize {
        self.total_len
    }
}
