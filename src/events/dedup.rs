//! Deduplication and chronological ordering.
//!
//! Groups raw events into buckets keyed by (calendar date, content hash
//! of the event text), collapses each bucket into one canonical record
//! plus its duplicate locations, and emits buckets in ascending date
//! order. Buckets sharing a date keep the order their first member was
//! extracted in — hash values carry no semantic order.

use std::collections::BTreeMap;

use base64::Engine;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::types::{CanonicalEvent, DedupConfig, RawEvent, Timeline};

/// Exact format accepted for event dates. Anything else cannot be placed
/// on a timeline and is dropped.
const DATE_FORMAT: &str = "%m/%d/%Y";

/// Deterministic content hash of the trimmed event text. Collision
/// resistance is incidental; SHA-256 is simply the hash already in the
/// stack.
pub fn content_hash(text: &str) -> String {
    let digest = Sha256::digest(text.trim().as_bytes());
    base64::engine::general_purpose::STANDARD.encode(digest)
}

#[derive(Debug, Default)]
pub struct EventDeduplicator {
    config: DedupConfig,
}

impl EventDeduplicator {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    /// Collapse duplicates and produce the final timeline.
    ///
    /// Unparseable dates are dropped with a logged warning — never fatal.
    /// The validity window only filters when the caller configured one;
    /// the default config accepts every parseable date.
    pub fn organize(&self, events: Vec<RawEvent>) -> Timeline {
        // date → buckets in first-seen order; each bucket keeps its
        // members in extraction order.
        let mut by_date: BTreeMap<NaiveDate, Vec<(String, Vec<RawEvent>)>> = BTreeMap::new();

        for event in events {
            let date = match NaiveDate::parse_from_str(&event.date, DATE_FORMAT) {
                Ok(date) => date,
                Err(e) => {
                    warn!(date = %event.date, page = event.page, error = %e,
                          "unparseable event date, dropping");
                    continue;
                }
            };

            if !self.config.accepts(date) {
                debug!(date = %date, page = event.page, "event outside validity window, dropping");
                continue;
            }

            let hash = content_hash(&event.text);
            let buckets = by_date.entry(date).or_default();
            match buckets.iter_mut().find(|(h, _)| *h == hash) {
                Some((_, members)) => members.push(event),
                None => buckets.push((hash, vec![event])),
            }
        }

        let mut canonical = Vec::new();
        for (date, buckets) in by_date {
            for (_, members) in buckets {
                let first = &members[0];
                canonical.push(CanonicalEvent {
                    date,
                    text: first.text.clone(),
                    page: first.page,
                    offset: first.offset,
                    duplicate_count: members.len() - 1,
                    duplicate_locations: members[1..]
                        .iter()
                        .map(|e| format!("Page {}, Pos {}", e.page, e.offset))
                        .collect(),
                });
            }
        }

        Timeline::new(canonical)
    }
}
