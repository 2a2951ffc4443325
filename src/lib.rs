//! # scour
//!
//! A browser-backed search scraping service. Given a query and an engine
//! name, scour drives a pooled headless Chromium instance to the engine's
//! results page, extracts structured hits (title, link, snippet), and
//! returns them as a paginated response.
//!
//! The building blocks:
//!
//! - A bounded [`pool::BrowserPool`] of browser processes, leased one
//!   search at a time and recycled on failure
//! - One [`engine::EngineAdapter`] per supported engine, owning the URL
//!   scheme, readiness signal and markup rules for that engine
//! - A read-only [`EngineRegistry`] built once at startup
//! - The [`SearchService`] façade tying them together
//! - A thin axum transport in [`api`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use scour::browser::{BrowserSettings, ChromiumLauncher};
//! use scour::pool::{BrowserPool, PoolConfig};
//! use scour::{EngineRegistry, SearchService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let launcher = Arc::new(ChromiumLauncher::new(BrowserSettings::default()));
//!     let pool = Arc::new(BrowserPool::start(PoolConfig::default(), launcher).await?);
//!     let registry = Arc::new(EngineRegistry::builtin(Duration::from_secs(10)));
//!
//!     let service = SearchService::new(registry, pool.clone());
//!     let response = service.search("duckduckgo", "rust programming", 1).await?;
//!     for hit in &response.result {
//!         println!("{}: {}", hit.title, hit.link);
//!     }
//!
//!     pool.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod browser;
mod chrome;
pub mod config;
pub mod engine;
pub mod engines;
mod error;
pub mod pool;
mod registry;
mod result;
mod search;

pub use config::Config;
pub use engine::{EngineAdapter, SelectorRules};
pub use error::{Result, SearchError};
pub use registry::EngineRegistry;
pub use result::{SearchHit, SearchResponse};
pub use search::SearchService;
