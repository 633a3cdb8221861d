//! upfeed server entry point.
//!
//! Loads configuration, builds the feed aggregator and serves it over MCP on
//! stdio transport. Logging goes to stderr to avoid interfering with the
//! JSON-RPC protocol on stdout.

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use upfeed_client::FeedAggregator;
use upfeed_core::AppConfig;

use crate::tools::DisplaySettings;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.mode.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    config.require_sources()?;

    tracing::info!(
        sources = config.sources.len(),
        mode = ?config.mode,
        "Starting upfeed server on stdio transport"
    );

    let aggregator = FeedAggregator::from_config(&config)?;
    let handler = handler::FeedServer::new(aggregator, DisplaySettings::from(&config));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
