//! Client code for upfeed.
//!
//! This crate provides the request-spacing HTTP client, the bounded worker
//! pool, the upstream source fetcher and the feed aggregator shared by the
//! server.

pub mod aggregate;
pub mod bilibili;
pub mod pool;
pub mod ratelimit;

pub use aggregate::{AggregationState, FeedAggregator, FeedSettings};
pub use bilibili::{FetchReport, FetcherConfig, SourceFetcher, SourceOutcome};
pub use pool::WorkerPool;
pub use ratelimit::{RateLimitedClient, RequestGate};
