//! MCP tool implementations.
//!
//! This module contains all tools exposed by the upfeed server.

pub mod feed_latest;
pub mod feed_sources;

pub use feed_latest::DisplaySettings;
