//! Date-anchored event extraction.
//!
//! Finds every `MM/DD/YYYY`-shaped token in the layout text and captures
//! a bounded trailing context window as the event description. Calendar
//! validity is not checked here — the deduplicator's date parse fails
//! closed on impossible dates.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::types::RawEvent;
use super::EventError;
use crate::config::DEFAULT_EVENT_WINDOW;
use crate::layout::{PageIndex, PageSpan};

/// Month and day 1-2 digits, year exactly 4. Word-bounded so embedded
/// digit runs don't match.
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}/\d{1,2}/\d{4})\b").unwrap());

pub struct EventExtractor {
    max_length: usize,
}

impl Default for EventExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_WINDOW)
    }
}

impl EventExtractor {
    /// `max_length` bounds the event description, in characters from the
    /// match start (the date itself is the prefix of the description).
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Scan every page of the layout text. A failure on one page is
    /// logged with its page number and contributes zero events; the
    /// remaining pages are still scanned.
    pub fn extract(&self, text: &str, index: &PageIndex) -> Vec<RawEvent> {
        let mut events = Vec::new();
        for span in index.spans() {
            match self.extract_page(text, span) {
                Ok(mut page_events) => events.append(&mut page_events),
                Err(e) => {
                    warn!(page = span.page_number, error = %e, "page scan failed, skipping");
                }
            }
        }
        events
    }

    fn extract_page(&self, text: &str, span: &PageSpan) -> Result<Vec<RawEvent>, EventError> {
        let page_text =
            text.get(span.start..span.end)
                .ok_or(EventError::SpanOutOfBounds {
                    page: span.page_number,
                    start: span.start,
                    end: span.end,
                    len: text.len(),
                })?;

        let mut events = Vec::new();
        for m in DATE_PATTERN.find_iter(page_text) {
            events.push(RawEvent {
                date: m.as_str().to_string(),
                text: extract_window(page_text, m.start(), self.max_length),
                page: span.page_number,
                offset: m.start(),
            });
        }
        Ok(events)
    }
}

/// Up to `max_length` characters starting at `start` (a match boundary),
/// newlines collapsed to spaces, surrounding whitespace trimmed.
fn extract_window(text: &str, start: usize, max_length: usize) -> String {
    let window: String = text[start..].chars().take(max_length).collect();
    window.replace('\n', " ").trim().to_string()
}
