//! feed_latest tool implementation.
//!
//! Runs one aggregation pass and returns the merged feed together with the
//! display settings the rendering layer needs.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use upfeed_client::FeedAggregator;
use upfeed_core::{AppConfig, DisplayStyle, FeedStatus, Item};

use crate::error::ToolError;

/// Input parameters for feed_latest tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FeedLatestParams {
    /// Refetch every source, ignoring cache expiry.
    #[serde(default)]
    pub force_refresh: bool,
}

/// Presentation settings passed through to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    pub style: DisplayStyle,
    pub collapse_after: i64,
    pub collapse_after_rows: i64,
}

impl From<&AppConfig> for DisplaySettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            style: config.style,
            collapse_after: config.collapse_after,
            collapse_after_rows: config.collapse_after_rows,
        }
    }
}

/// Output structure for feed_latest tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedLatestOutput {
    /// Merged items, newest first.
    pub items: Vec<Item>,
    /// Error classification of the pass.
    pub status: FeedStatus,
    /// Display style: default, grid-cards or vertical-list.
    pub style: DisplayStyle,
    /// Cards shown before collapsing (-1 = never).
    pub collapse_after: i64,
    /// Grid rows shown before collapsing (-1 = never).
    pub collapse_after_rows: i64,
}

/// Implementation of the feed_latest tool.
pub async fn latest_impl(
    aggregator: &Mutex<FeedAggregator>, display: &DisplaySettings, params: FeedLatestParams,
) -> Result<CallToolResult, McpError> {
    let result = aggregator.lock().await.refresh(params.force_refresh).await;

    if let FeedStatus::Failed { reason } = &result.status {
        tracing::error!(%reason, items = result.items.len(), "serving feed after failed refresh");
    }

    let output = FeedLatestOutput {
        items: result.items,
        status: result.status,
        style: display.style,
        collapse_after: display.collapse_after,
        collapse_after_rows: display.collapse_after_rows,
    };

    let json = serde_json::to_string_pretty(&output).map_err(|e| ToolError::Serialization(e.to_string()))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
