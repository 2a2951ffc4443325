//! Scour server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scour::api::{self, AppState};
use scour::browser::ChromiumLauncher;
use scour::pool::BrowserPool;
use scour::{Config, EngineRegistry, SearchService};

/// Scour - browser-backed search scraping service
#[derive(Parser)]
#[command(name = "scour")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bind address (overrides SCOUR_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides SCOUR_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Number of pooled browser sessions (overrides SCOUR_POOL_SIZE)
    #[arg(long)]
    pool_size: Option<usize>,

    /// Run browsers with a visible window
    #[arg(long)]
    headed: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(size) = cli.pool_size {
        config.pool_size = size;
    }
    if cli.headed {
        config.headless = false;
    }

    info!("starting scour v{}", env!("CARGO_PKG_VERSION"));
    if config.api_key.is_none() {
        warn!("API key is not set, authentication is disabled");
    }

    let launcher = Arc::new(ChromiumLauncher::new(config.browser_settings()));
    let pool = Arc::new(BrowserPool::start(config.pool_config(), launcher).await?);

    let registry = Arc::new(EngineRegistry::builtin(config.navigation_timeout()));
    info!("registered {} search engines", registry.len());

    let service = Arc::new(SearchService::new(registry.clone(), pool.clone()));
    let state = AppState {
        service,
        registry,
        api_key: config.api_key.clone(),
    };
    let app = api::router(state, &config.api_prefix);

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            warn!("failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
