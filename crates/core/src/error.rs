//! Unified error types for upfeed.
//!
//! Per-source failures (`Transport`, `Timeout`, `HttpStatus`, `Decode`,
//! `UpstreamStatus`) are absorbed by the fetcher and folded into one of the
//! batch-level variants (`NoContent`, `PartialContent`) once a pass completes.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the feed pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an empty source id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Network, DNS or TLS failure while talking to the upstream.
    #[error("TRANSPORT_ERROR: {0}")]
    Transport(String),

    /// The upstream did not answer within the configured timeout.
    #[error("TIMEOUT: {0}")]
    Timeout(String),

    /// Non-success HTTP status from the upstream.
    #[error("HTTP_STATUS: {0}")]
    HttpStatus(u16),

    /// Response body could not be decoded.
    #[error("DECODE_ERROR: {0}")]
    Decode(String),

    /// The upstream answered with a non-zero application status code.
    #[error("UPSTREAM_STATUS: code {code}: {message}")]
    UpstreamStatus { code: i64, message: String },

    /// No items were obtained from any source.
    #[error("NO_CONTENT: no items obtained from any source")]
    NoContent,

    /// Some, but not all, sources failed.
    #[error("PARTIAL_CONTENT: missing items from {failed} sources")]
    PartialContent { failed: usize },

    /// The worker pool could not run the batch at all.
    #[error("WORKER_POOL: {0}")]
    WorkerPool(String),
}

impl Error {
    /// Whether this error still allows the pass to publish a merged feed.
    pub fn is_partial(&self) -> bool {
        matches!(self, Error::PartialContent { .. })
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::Transport(msg) => (-32001, msg.clone()),
            Error::Timeout(msg) => (-32002, msg.clone()),
            Error::HttpStatus(status) => (-32003, format!("status {status}")),
            Error::Decode(msg) => (-32004, msg.clone()),
            Error::UpstreamStatus { code, message } => (-32005, format!("code {code}: {message}")),
            Error::NoContent => (-32006, "no items obtained from any source".to_string()),
            Error::PartialContent { failed } => (-32007, format!("missing items from {failed} sources")),
            Error::WorkerPool(msg) => (-32008, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UpstreamStatus { code: -352, message: "risk control".to_string() };
        assert!(err.to_string().contains("UPSTREAM_STATUS"));
        assert!(err.to_string().contains("-352"));

        let err = Error::PartialContent { failed: 2 };
        assert_eq!(err.to_string(), "PARTIAL_CONTENT: missing items from 2 sources");
    }

    #[test]
    fn test_is_partial() {
        assert!(Error::PartialContent { failed: 1 }.is_partial());
        assert!(!Error::NoContent.is_partial());
    }

    #[test]
    fn test_error_to_mcp_error() {
        let mcp_err: McpError = Error::NoContent.into();
        assert_eq!(mcp_err.code.0, -32006);

        let mcp_err: McpError = Error::InvalidInput("empty".to_string()).into();
        assert_eq!(mcp_err.code.0, -32602);
    }
}
