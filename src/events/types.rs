use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One date mention found in the layout text, before deduplication.
///
/// `date` is the matched string as it appeared (`MM/DD/YYYY` shaped, not
/// yet validated); `offset` is the byte offset of the match within its
/// page's section of the layout text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub date: String,
    pub text: String,
    pub page: usize,
    pub offset: usize,
}

/// The deduplicated representative of all mentions sharing a calendar
/// date and content hash. Canonical provenance is the first occurrence in
/// extraction order; later occurrences are listed in
/// `duplicate_locations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub date: NaiveDate,
    pub text: String,
    pub page: usize,
    pub offset: usize,
    pub duplicate_count: usize,
    /// `"Page {p}, Pos {o}"` per later occurrence, in extraction order.
    pub duplicate_locations: Vec<String>,
}

/// Chronologically ordered, deduplicated event list. Built from scratch
/// per processing run, never mutated incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    events: Vec<CanonicalEvent>,
}

impl Timeline {
    pub fn new(events: Vec<CanonicalEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[CanonicalEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalEvent> {
        self.events.iter()
    }
}

impl IntoIterator for Timeline {
    type Item = CanonicalEvent;
    type IntoIter = std::vec::IntoIter<CanonicalEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

/// Plausibility window for event dates, applied during deduplication only
/// when configured. The default accepts every parseable date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Inclusive lower bound.
    pub valid_from: Option<NaiveDate>,
    /// Exclusive upper bound.
    pub valid_until: Option<NaiveDate>,
}

impl DedupConfig {
    /// Window covering the records this pipeline was first built for
    /// (2020-01-01 up to but not including 2024-04-02).
    pub fn historical_window() -> Self {
        Self {
            valid_from: NaiveDate::from_ymd_opt(2020, 1, 1),
            valid_until: NaiveDate::from_ymd_opt(2024, 4, 2),
        }
    }

    pub fn accepts(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.valid_from {
            if date < from {
                return false;
            }
        }
        if let Some(until) = self.valid_until {
            if date >= until {
                return false;
            }
        }
        true
    }
}
