//! Search result types.

use serde::{Deserialize, Serialize};

/// A single extracted search result.
///
/// Immutable once constructed; equality is structural. Hits are produced
/// only by engine adapters during extraction, in page rendering order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title.
    pub title: String,
    /// Absolute result URL.
    pub link: String,
    /// Result snippet; empty when the engine renders none.
    pub snippet: String,
}

impl SearchHit {
    /// Creates a new search hit.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }
}

/// A completed search: the engine that served it, its hits in document
/// order, and the 1-based page they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Engine name as registered.
    pub engine: String,
    /// Extracted hits, order preserved. Named `result` on the wire.
    pub result: Vec<SearchHit>,
    /// 1-based page number the hits were extracted from.
    pub page: u32,
}

impl SearchResponse {
    /// Creates a new search response.
    pub fn new(engine: impl Into<String>, result: Vec<SearchHit>, page: u32) -> Self {
        Self {
            engine: engine.into(),
            result,
            page,
        }
    }
}
