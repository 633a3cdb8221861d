//! Core types and shared functionality for upfeed.
//!
//! This crate provides:
//! - Feed data model (items, sources, aggregation results)
//! - In-memory per-source TTL cache
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod feed;

pub use cache::{CacheEntry, TtlCache};
pub use config::{AppConfig, ConfigError, DisplayStyle, Mode};
pub use error::Error;
pub use feed::{AggregateResult, FeedStatus, Item, SourceConfig, SourceId};
