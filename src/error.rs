//! Error types for the scraping service.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while serving a search.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Request parameters failed validation before any work was done.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested engine name is not registered.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// No browser session became available within the acquire timeout.
    #[error("no browser session available within the acquire timeout")]
    PoolExhausted,

    /// The pool is shutting down and no longer lends sessions.
    #[error("browser pool is shut down")]
    PoolClosed,

    /// The engine's results page did not become ready within the bound.
    #[error("navigation timed out waiting for {engine} results")]
    NavigationTimeout {
        /// Engine that was being navigated.
        engine: String,
    },

    /// The results container could not be located in the loaded page.
    ///
    /// Distinct from zero results; usually means the engine changed its
    /// markup or served a block page.
    #[error("extraction failed for {engine}: {reason}")]
    ExtractionFailed {
        /// Engine whose extraction rules failed.
        engine: String,
        /// What the adapter could not find.
        reason: String,
    },

    /// Browser process or protocol failure.
    #[error("browser error: {0}")]
    Browser(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl SearchError {
    /// Stable machine-readable identifier for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::UnknownEngine(_) => "unknown_engine",
            Self::PoolExhausted => "pool_exhausted",
            Self::PoolClosed => "pool_closed",
            Self::NavigationTimeout { .. } => "navigation_timeout",
            Self::ExtractionFailed { .. } => "extraction_failed",
            Self::Browser(_) => "browser_error",
            Self::UrlParse(_) => "url_parse_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_input() {
        let err = SearchError::InvalidInput("query must not be empty".to_string());
        assert_eq!(err.to_string(), "invalid input: query must not be empty");
    }

    #[test]
    fn test_error_display_unknown_engine() {
        let err = SearchError::UnknownEngine("altavista".to_string());
        assert_eq!(err.to_string(), "unknown engine: altavista");
    }

    #[test]
    fn test_error_display_pool_exhausted() {
        let err = SearchError::PoolExhausted;
        assert_eq!(
            err.to_string(),
            "no browser session available within the acquire timeout"
        );
    }

    #[test]
    fn test_error_display_navigation_timeout() {
        let err = SearchError::NavigationTimeout {
            engine: "brave".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "navigation timed out waiting for brave results"
        );
    }

    #[test]
    fn test_error_display_extraction_failed() {
        let err = SearchError::ExtractionFailed {
            engine: "yahoo".to_string(),
            reason: "results container #web not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "extraction failed for yahoo: results container #web not found"
        );
    }

    #[test]
    fn test_error_kind_is_stable() {
        assert_eq!(
            SearchError::InvalidInput(String::new()).kind(),
            "invalid_input"
        );
        assert_eq!(
            SearchError::UnknownEngine(String::new()).kind(),
            "unknown_engine"
        );
        assert_eq!(SearchError::PoolExhausted.kind(), "pool_exhausted");
        assert_eq!(SearchError::PoolClosed.kind(), "pool_closed");
        assert_eq!(
            SearchError::NavigationTimeout {
                engine: String::new()
            }
            .kind(),
            "navigation_timeout"
        );
        assert_eq!(
            SearchError::ExtractionFailed {
                engine: String::new(),
                reason: String::new()
            }
            .kind(),
            "extraction_failed"
        );
    }

    #[test]
    fn test_error_debug() {
        let err = SearchError::PoolExhausted;
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("PoolExhausted"));
    }
}
