//! feed_sources tool implementation.
//!
//! Reports each configured source with its effective TTL and cache state.
//! Never triggers a fetch.

use chrono::{DateTime, Utc};
use rmcp::{ErrorData as McpError, model::*};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use upfeed_client::FeedAggregator;

use crate::error::ToolError;

/// Cache state of one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStatus {
    pub id: String,
    /// Effective cache lifetime in seconds.
    pub ttl_secs: u64,
    /// Expiry of the cached batch, or null if never fetched.
    pub expires_at: Option<DateTime<Utc>>,
    /// Number of cached items, or null if never fetched.
    pub cached_items: Option<usize>,
}

/// Output structure for feed_sources tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSourcesOutput {
    pub sources: Vec<SourceStatus>,
}

/// Implementation of the feed_sources tool.
pub async fn sources_impl(aggregator: &Mutex<FeedAggregator>) -> Result<CallToolResult, McpError> {
    let aggregator = aggregator.lock().await;

    let sources: Vec<SourceStatus> = aggregator
        .settings()
        .sources
        .iter()
        .map(|source| {
            let entry = aggregator.cache().entry(&source.id);
            SourceStatus {
                id: source.id.to_string(),
                ttl_secs: aggregator.effective_ttl(source).as_secs(),
                expires_at: entry.map(|e| e.expires_at),
                cached_items: entry.map(|e| e.items.len()),
            }
        })
        .collect();

    let json = serde_json::to_string_pretty(&FeedSourcesOutput { sources })
        .map_err(|e| ToolError::Serialization(e.to_string()))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use upfeed_core::{AppConfig, SourceConfig};

    #[tokio::test]
    async fn test_sources_before_any_fetch() {
        let config = AppConfig {
            sources: vec![SourceConfig::new("1"), SourceConfig::new("2").with_update_every(600)],
            update_every_secs: 3600,
            ..Default::default()
        };
        let aggregator = Mutex::new(FeedAggregator::from_config(&config).unwrap());

        let result = sources_impl(&aggregator).await.unwrap();
        let text = result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .unwrap();
        let output: FeedSourcesOutput = serde_json::from_str(&text).unwrap();

        assert_eq!(output.sources.len(), 2);
        assert_eq!(output.sources[0].id, "1");
        assert_eq!(output.sources[0].ttl_secs, 3600);
        assert_eq!(output.sources[1].ttl_secs, 600);
        assert!(output.sources.iter().all(|s| s.expires_at.is_none() && s.cached_items.is_none()));
    }
}
