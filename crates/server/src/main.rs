//! shellcache server entry point.
//!
//! Loads configuration, opens the bucket store and boots the MCP server on
//! stdio transport. Logging goes to stderr to avoid interfering with the
//! JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use shellcache_client::{FetchClient, FetchConfig};
use shellcache_core::{AppConfig, AssetCacheManager, CacheDb, ResourceFetcher};
use tracing_subscriber::EnvFilter;

use crate::pages::PageClaims;
use crate::worker::WorkerSlot;

mod error;
mod handler;
mod pages;
mod tools;
mod worker;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let cache_name = config.cache_name();

    tracing::info!(cache = %cache_name, db = %config.db_path.display(), origin = %config.origin, "Starting shellcache server on stdio transport");

    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening bucket store at {}", config.db_path.display()))?;
    let fetcher: Arc<dyn ResourceFetcher> = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let pages = Arc::new(PageClaims::new());
    let worker_config = config.worker_config()?;

    let storage = db.clone();
    let claims = pages.clone();
    let worker = WorkerSlot::new(move || {
        AssetCacheManager::new(worker_config.clone(), Arc::new(storage.clone()), fetcher.clone(), claims.clone())
    });

    let handler = handler::ShellCacheServer::new(Arc::new(worker), db, pages);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
