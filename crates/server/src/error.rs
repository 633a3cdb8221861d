//! Structured errors for the upfeed server.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors raised by tool handlers themselves.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool output could not be serialized.
    #[error("SERIALIZATION_FAILED: {0}")]
    Serialization(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let (code, message) = match &err {
            ToolError::Serialization(msg) => (-32603, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
