//! HTTP layer exposing version lookups and cache status
//!
//! # Modules
//!
//! - [`error`]: Maps lookup failures to HTTP responses
//! - [`routes`]: Router and request handlers

pub mod error;
pub mod routes;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::version::cache::Cache;
use crate::version::fetcher::Fetcher;
use crate::version::service::VersionService;
use crate::version::types::CacheKey;

pub use routes::build_router;

/// Warm the cache, then serve requests until the process is stopped
pub async fn run_server(config: ServiceConfig, fetcher: Arc<dyn Fetcher>) -> anyhow::Result<()> {
    let storer = Arc::new(Cache::new(config.cache.ttl));
    let keys = CacheKey::for_platforms(&config.platforms);
    let service = Arc::new(VersionService::new(storer, fetcher, keys));

    // Best effort: unwarmed keys are fetched on first request
    service.warm_up().await;

    let listener = TcpListener::bind(config.server.bind).await?;
    info!("Listening on {}", listener.local_addr()?);

    let router = build_router(service);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
