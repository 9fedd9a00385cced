//! Retrieval Service contract.
//!
//! A retrieval backend (vector store plus whatever reranking it does)
//! answers a query with ranked matches over the segmented elements. The
//! core only consumes the result: the top match's page and serialized
//! coordinates feed the annotation path. Ranking quality is the
//! backend's problem, not ours.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Retrieval backend failed: {0}")]
    Backend(String),
}

/// One ranked match. `coordinates` is the serialized point list the
/// backend stored as element metadata — parsed strictly on the
/// annotation path, never trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMatch {
    pub text: String,
    /// 1-based page number.
    pub page: usize,
    pub coordinates: String,
}

/// Retrieval backend abstraction (allows mocking for tests).
pub trait RetrievalBackend {
    fn query(&self, text: &str, top_k: usize) -> Result<Vec<RetrievalMatch>, RetrievalError>;
}

/// Convenience: the single best match for a query, if any.
pub fn top_match<B: RetrievalBackend + ?Sized>(
    backend: &B,
    query: &str,
) -> Result<Option<RetrievalMatch>, RetrievalError> {
    Ok(backend.query(query, 1)?.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBackend(Vec<RetrievalMatch>);

    impl RetrievalBackend for FixedBackend {
        fn query(&self, _text: &str, top_k: usize) -> Result<Vec<RetrievalMatch>, RetrievalError> {
            Ok(self.0.iter().take(top_k).cloned().collect())
        }
    }

    #[test]
    fn top_match_takes_the_first_result() {
        let backend = FixedBackend(vec![
            RetrievalMatch {
                text: "best".into(),
                page: 3,
                coordinates: "(1, 2),(3, 2),(3, 4),(1, 4)".into(),
            },
            RetrievalMatch {
                text: "second".into(),
                page: 1,
                coordinates: "(0, 0),(1, 0),(1, 1),(0, 1)".into(),
            },
        ]);

        let m = top_match(&backend, "shoulder history").unwrap().unwrap();
        assert_eq!(m.text, "best");
        assert_eq!(m.page, 3);
    }

    #[test]
    fn top_match_handles_empty_results() {
        let backend = FixedBackend(vec![]);
        assert!(top_match(&backend, "anything").unwrap().is_none());
    }
}
