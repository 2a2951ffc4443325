//! Search orchestration.
//!
//! The façade over registry, pool and adapters: resolves the engine, leases
//! a browser session, runs navigate + extract through the adapter, and
//! guarantees the lease is returned on every path. Failures propagate
//! unmodified; retry policy belongs to the caller.

use std::sync::Arc;

use tracing::{info, warn};

use crate::pool::BrowserPool;
use crate::registry::EngineRegistry;
use crate::{Result, SearchError, SearchResponse};

/// Serves one search per call against a shared registry and session pool.
pub struct SearchService {
    registry: Arc<EngineRegistry>,
    pool: Arc<BrowserPool>,
}

impl SearchService {
    /// Creates a service over an already-started pool.
    pub fn new(registry: Arc<EngineRegistry>, pool: Arc<BrowserPool>) -> Self {
        Self { registry, pool }
    }

    /// Scrapes one results page from the named engine.
    ///
    /// Input validation and engine resolution happen before any session is
    /// acquired, so a rejected request leaves the pool untouched. After a
    /// navigation or extraction failure the session is released unhealthy,
    /// which replaces its browser process in the background.
    pub async fn search(&self, engine_name: &str, query: &str, page: u32) -> Result<SearchResponse> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }
        if page < 1 {
            return Err(SearchError::InvalidInput("page must be >= 1".to_string()));
        }
        let adapter = self.registry.resolve(engine_name)?;

        let lease = self.pool.acquire().await?;
        info!(
            engine = engine_name,
            query,
            page,
            session = lease.session().id(),
            "starting search"
        );

        let outcome = async {
            let target = adapter.build_target(query, page)?;
            adapter.navigate(lease.session(), &target).await?;
            adapter.extract(lease.session()).await
        }
        .await;

        match outcome {
            Ok(hits) => {
                info!(engine = engine_name, hits = hits.len(), "search completed");
                lease.release(true).await;
                Ok(SearchResponse::new(engine_name, hits, page))
            }
            Err(err) => {
                // A failed build_target never touched the page; any later
                // failure leaves the session in an unknown state.
                let healthy = matches!(err, SearchError::InvalidInput(_));
                warn!(engine = engine_name, error = %err, "search failed");
                lease.release(healthy).await;
                Err(err)
            }
        }
    }
}
