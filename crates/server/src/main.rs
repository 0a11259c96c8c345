//! icondex server entry point.
//!
//! Boots the MCP server on stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use icondex_client::FaviconService;
use icondex_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    if let Some(parent) = config.db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create cache directory {}", parent.display()))?;
    }

    let cache = CacheDb::open(config.db_path.clone())
        .await
        .with_context(|| format!("failed to open favicon cache at {}", config.db_path.display()))?;
    let service = Arc::new(FaviconService::new(&config, Arc::new(cache.clone()))?);

    tracing::info!(
        db_path = %config.db_path.display(),
        providers = config.providers.len(),
        "Starting icondex server on stdio transport"
    );

    let handler = handler::IcondexServer::new(service, cache, config.cache_ttl());
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
