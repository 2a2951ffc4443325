//! HTTP transport.
//!
//! Thin layer over [`SearchService`]: request schema validation, bearer-token
//! authentication and the mapping from error kinds to status codes live
//! here, nothing else. The core never sees HTTP.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::registry::EngineRegistry;
use crate::search::SearchService;
use crate::{SearchError, SearchResponse};

/// Largest page the API accepts; deeper pages are mostly engine noise.
const MAX_PAGE: u32 = 10;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Search orchestrator.
    pub service: Arc<SearchService>,
    /// Engine registry, for the engines listing.
    pub registry: Arc<EngineRegistry>,
    /// Bearer token; `None` disables authentication.
    pub api_key: Option<String>,
}

/// Builds the application router.
///
/// The versioned API nests under `api_prefix` and is gated by the bearer
/// check when a key is configured; `/health` stays at the root and is never
/// authenticated.
pub fn router(state: AppState, api_prefix: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/v1/engines", get(list_engines))
        .route("/v1/search", post(search))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    let app = Router::new().route("/health", get(health));
    let app = if api_prefix.is_empty() || api_prefix == "/" {
        app.merge(api)
    } else {
        app.nest(api_prefix, api)
    };

    app.layer(cors).with_state(state)
}

/// Search request body.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Engine name, as listed by the engines endpoint.
    pub engine: String,
    /// Search query.
    pub query: String,
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

/// Engines listing body.
#[derive(Debug, Serialize)]
pub struct EngineListResponse {
    /// Registered engine names in registration order.
    pub engines: Vec<String>,
}

/// Health check body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
}

async fn list_engines(State(state): State<AppState>) -> Json<EngineListResponse> {
    Json(EngineListResponse {
        engines: state.registry.names().to_vec(),
    })
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    if request.engine.trim().is_empty() {
        return Err(ApiError::bad_request("engine must not be empty"));
    }
    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("query must not be empty"));
    }
    if !(1..=MAX_PAGE).contains(&request.page) {
        return Err(ApiError::bad_request("page must be between 1 and 10"));
    }

    let response = state
        .service
        .search(&request.engine, &request.query, request.page)
        .await?;
    Ok(Json(response))
}

async fn health() -> Json<HealthResponse> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0);
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
    })
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(ref expected) = state.api_key else {
        return next.run(request).await;
    };

    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let Some(header) = header else {
        warn!("rejected request without Authorization header");
        return unauthorized("Missing Authorization header");
    };

    let Some(token) = parse_bearer(header) else {
        warn!("rejected request with malformed Authorization header");
        return unauthorized("Invalid Authorization header");
    };

    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        warn!("rejected request with invalid API key");
        return unauthorized("Invalid API key");
    }

    next.run(request).await
}

fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(char::is_whitespace)?;
    if scheme.eq_ignore_ascii_case("bearer") {
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    } else {
        None
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn unauthorized(reason: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": reason }))).into_response()
}

/// A search failure shaped for the wire.
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_input",
            detail: detail.to_string(),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let status = match &err {
            SearchError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SearchError::UnknownEngine(_) => StatusCode::NOT_FOUND,
            SearchError::PoolExhausted | SearchError::PoolClosed => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            SearchError::NavigationTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            SearchError::ExtractionFailed { .. } => StatusCode::BAD_GATEWAY,
            SearchError::Browser(_) | SearchError::UrlParse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        // Process-level details stay in the logs, not on the wire.
        let detail = match &err {
            SearchError::Browser(_) | SearchError::UrlParse(_) => "internal error".to_string(),
            _ => err.to_string(),
        };
        Self {
            status,
            kind: err.kind(),
            detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.kind, "detail": self.detail })),
        )
            .into_response()
    }
}
