//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use tokio::sync::Mutex;
use upfeed_client::FeedAggregator;

use crate::tools::feed_latest::{DisplaySettings, FeedLatestParams, latest_impl};
use crate::tools::feed_sources::sources_impl;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for upfeed.
///
/// One aggregator is shared by every tool call; the mutex keeps aggregation
/// passes from overlapping.
#[derive(Clone)]
pub struct FeedServer {
    tool_router: ToolRouter<Self>,
    aggregator: Arc<Mutex<FeedAggregator>>,
    display: DisplaySettings,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl FeedServer {
    /// Create a new server handler.
    pub fn new(aggregator: FeedAggregator, display: DisplaySettings) -> Self {
        Self { tool_router: Self::tool_router(), aggregator: Arc::new(Mutex::new(aggregator)), display }
    }

    /// Latest videos across all configured creators.
    ///
    /// Only sources whose cache expired are refetched unless force_refresh is set.
    #[tool(
        description = "Get the latest videos from all configured creators, newest first. Returns items, an error status (complete, partial or failed) and display settings."
    )]
    async fn feed_latest(&self, params: Parameters<FeedLatestParams>) -> Result<CallToolResult, McpError> {
        latest_impl(&self.aggregator, &self.display, params.0).await
    }

    /// Cache state of every configured source.
    #[tool(description = "List configured creators with their effective cache TTL and cache expiry. Never fetches.")]
    async fn feed_sources(&self) -> Result<CallToolResult, McpError> {
        sources_impl(&self.aggregator).await
    }
}

impl ServerHandler for FeedServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "upfeed".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use upfeed_core::AppConfig;

    fn server() -> FeedServer {
        let config = AppConfig::default();
        FeedServer::new(FeedAggregator::from_config(&config).unwrap(), DisplaySettings::from(&config))
    }

    #[tokio::test]
    async fn test_server_info() {
        let info = server().get_info();
        assert_eq!(info.server_info.name, "upfeed");
    }

    #[tokio::test]
    async fn test_tools_registered() {
        let names: Vec<String> = server().tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        assert!(names.contains(&"feed_latest".to_string()));
        assert!(names.contains(&"feed_sources".to_string()));
    }
}
