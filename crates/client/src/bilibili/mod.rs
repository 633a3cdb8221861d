//! Bilibili creator video fetcher.
//!
//! Fetches the newest uploads of a set of creators through a
//! [`RateLimitedClient`] and a [`WorkerPool`], and classifies each
//! creator's result independently.
//!
//! ### Upstream
//!
//! - **Endpoint**: `GET {base_url}/x/space/arc/search?mid={id}&ps={page_size}&tid=0&pn=1&order=pubdate`
//! - **Headers**: browser-like `User-Agent`, `Origin` and `Referer` for the creator's space page.
//! - **Politeness**: 2 workers, 500ms between request starts by default.
//! - **Failures**: transport errors, non-2xx statuses, undecodable bodies and
//!   non-zero `code` values fail only the creator they belong to.

pub mod request;
pub mod response;

pub use request::{VIDEO_LIST_PATH, VideoListRequest};
pub use response::{VideoListResponse, author_url};

use std::sync::Arc;
use std::time::Duration;

use reqwest::Request;
use upfeed_core::feed::sort_newest_first;
use upfeed_core::{AppConfig, Error, Item, SourceId};

use crate::pool::WorkerPool;
use crate::ratelimit::RateLimitedClient;

/// Fetcher configuration.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Base URL (default: https://api.bilibili.com).
    pub base_url: String,
    /// User-agent string.
    pub user_agent: String,
    /// Request timeout (default: 20s).
    pub timeout: Duration,
    /// Minimum spacing between request starts (default: 500ms).
    pub request_spacing: Duration,
    /// Concurrent workers (default: 2).
    pub workers: usize,
    /// Videos requested per creator (default: 30).
    pub page_size: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetcherConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            request_spacing: config.request_spacing(),
            workers: config.workers,
            page_size: config.page_size,
        }
    }
}

/// Result of fetching one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub source: SourceId,
    pub result: Result<Vec<Item>, Error>,
}

/// Per-source outcomes of one fetch, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub outcomes: Vec<SourceOutcome>,
}

impl FetchReport {
    /// Number of sources that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    /// Number of items obtained across all sources.
    pub fn item_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(Vec::len)
            .sum()
    }

    /// All fetched items, newest first.
    pub fn items(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self
            .outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .flatten()
            .cloned()
            .collect();
        sort_newest_first(&mut items);
        items
    }

    /// Batch-level error: `PartialContent` when any source failed.
    pub fn error(&self) -> Option<Error> {
        match self.failed() {
            0 => None,
            failed => Some(Error::PartialContent { failed }),
        }
    }

    /// Successful sources with their items.
    pub fn into_succeeded(self) -> impl Iterator<Item = (SourceId, Vec<Item>)> {
        self.outcomes
            .into_iter()
            .filter_map(|o| o.result.ok().map(|items| (o.source, items)))
    }
}

/// Concurrent, rate-limited fetcher for creator video lists.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: Arc<RateLimitedClient>,
    pool: WorkerPool,
    config: FetcherConfig,
}

impl SourceFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client: Arc::new(RateLimitedClient::new(http, config.request_spacing)),
            pool: WorkerPool::new(config.workers),
            config,
        })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Build the upstream request for one source.
    pub fn build_request(&self, source: &SourceId) -> Result<Request, Error> {
        let query = VideoListRequest::newest(source, self.config.page_size);
        let headers = query.headers(&self.config.user_agent)?;

        self.client
            .http()
            .get(format!("{}{VIDEO_LIST_PATH}", self.config.base_url))
            .query(&query)
            .headers(headers)
            .build()
            .map_err(|e| Error::InvalidInput(format!("failed to build request for {source}: {e}")))
    }

    /// Fetch the newest items of every source.
    ///
    /// One failing source never stops the others. Returns `NoContent` when no
    /// items were obtained at all and `WorkerPool` when the batch could not
    /// run; otherwise the report carries every outcome and
    /// [`FetchReport::error`] tells whether the batch was partial.
    pub async fn fetch(&self, sources: &[SourceId]) -> Result<FetchReport, Error> {
        tracing::info!(sources = sources.len(), workers = self.pool.workers(), "fetching sources");

        let requests: Vec<Result<Request, Error>> = sources.iter().map(|source| self.build_request(source)).collect();

        let client = Arc::clone(&self.client);
        let responses = self
            .pool
            .run(requests, move |request| {
                let client = Arc::clone(&client);
                async move { client.fetch_json::<VideoListResponse>(request?).await }
            })
            .await
            .inspect_err(|e| tracing::error!(error = %e, "fetch batch failed"))?;

        let outcomes: Vec<SourceOutcome> = sources
            .iter()
            .zip(responses)
            .map(|(source, response)| {
                let result = response.and_then(|response| response.into_items(source));
                match &result {
                    Ok(items) => tracing::debug!(%source, items = items.len(), "source fetched"),
                    Err(e) => tracing::error!(%source, error = %e, "source failed"),
                }
                SourceOutcome { source: source.clone(), result }
            })
            .collect();

        let report = FetchReport { outcomes };

        if report.item_count() == 0 {
            tracing::error!(sources = sources.len(), "no items obtained from any source");
            return Err(Error::NoContent);
        }

        match report.error() {
            Some(e) => tracing::warn!(failed = report.failed(), total = sources.len(), error = %e, "partial fetch"),
            None => tracing::info!(items = report.item_count(), sources = sources.len(), "all sources fetched"),
        }

        Ok(report)
    }
}
