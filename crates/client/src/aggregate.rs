//! Feed aggregation over the TTL cache and the source fetcher.
//!
//! One pass walks `Idle → Checking → (Fetching)? → Merging → Done`, or stops
//! in `Failed` when the fetcher returns a fatal error. Fatal passes never
//! touch the cache; partial passes update only the sources that succeeded.

use std::time::Duration;

use chrono::{DateTime, Utc};
use upfeed_core::cache::{expiry_from, resolve_ttl};
use upfeed_core::feed::sort_newest_first;
use upfeed_core::{AggregateResult, AppConfig, Error, FeedStatus, Mode, SourceConfig, SourceId, TtlCache};

use crate::bilibili::{FetcherConfig, SourceFetcher};

/// Where the aggregator is in its current (or last) pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationState {
    Idle,
    Checking,
    Fetching,
    Merging,
    Done,
    Failed,
}

/// Feed-level settings.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Sources in display order.
    pub sources: Vec<SourceConfig>,
    /// Default TTL in seconds; 0 falls back to 2 hours.
    pub update_every_secs: u64,
    /// Maximum items kept after merging.
    pub limit: usize,
    pub mode: Mode,
}

impl From<&AppConfig> for FeedSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            sources: config.sources.clone(),
            update_every_secs: config.update_every_secs,
            limit: config.limit,
            mode: config.mode,
        }
    }
}

/// Merges cached and freshly fetched items from every configured source.
#[derive(Debug)]
pub struct FeedAggregator {
    fetcher: SourceFetcher,
    settings: FeedSettings,
    cache: TtlCache,
    state: AggregationState,
    published: AggregateResult,
}

impl FeedAggregator {
    pub fn new(fetcher: SourceFetcher, settings: FeedSettings) -> Self {
        tracing::info!(
            sources = settings.sources.len(),
            update_every_secs = settings.update_every_secs,
            limit = settings.limit,
            mode = ?settings.mode,
            "feed aggregator initialized"
        );

        Self { fetcher, settings, cache: TtlCache::new(), state: AggregationState::Idle, published: AggregateResult::empty() }
    }

    /// Build an aggregator and its fetcher from application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let fetcher = SourceFetcher::new(FetcherConfig::from(config))?;
        Ok(Self::new(fetcher, FeedSettings::from(config)))
    }

    pub fn state(&self) -> AggregationState {
        self.state
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    /// Last successfully published feed.
    pub fn published(&self) -> &AggregateResult {
        &self.published
    }

    /// Effective cache lifetime of a source.
    pub fn effective_ttl(&self, source: &SourceConfig) -> Duration {
        resolve_ttl(source, self.settings.update_every_secs, self.settings.mode)
    }

    fn ttl_for(&self, id: &SourceId) -> Duration {
        let unlisted = SourceConfig::new(id.clone());
        let source = self.settings.sources.iter().find(|source| &source.id == id).unwrap_or(&unlisted);
        self.effective_ttl(source)
    }

    /// Run one aggregation pass at `now`.
    ///
    /// Stale sources (all of them when `force_all` is set) are fetched; every
    /// other source contributes its cached batch unchanged. The merged items
    /// are sorted newest first and truncated to the limit.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error (`NoContent`, `WorkerPool`) when the fetch
    /// step fails. The cache is left untouched in that case.
    pub async fn aggregate(&mut self, now: DateTime<Utc>, force_all: bool) -> Result<AggregateResult, Error> {
        self.state = AggregationState::Checking;
        let stale = self.cache.stale_sources(&self.settings.sources, now, force_all);

        let mut failed = 0;
        if stale.is_empty() {
            tracing::debug!("all sources served from cache");
        } else {
            self.state = AggregationState::Fetching;
            tracing::info!(stale = stale.len(), force_all, "refreshing sources");

            let report = match self.fetcher.fetch(&stale).await {
                Ok(report) => report,
                Err(e) => {
                    self.state = AggregationState::Failed;
                    tracing::error!(error = %e, "aggregation failed");
                    return Err(e);
                }
            };

            failed = report.failed();
            for (id, items) in report.into_succeeded() {
                let ttl = self.ttl_for(&id);
                self.cache.put(id, items, expiry_from(now, ttl));
            }
        }

        self.state = AggregationState::Merging;
        let mut items = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for source in &self.settings.sources {
            if seen.insert(&source.id)
                && let Some(cached) = self.cache.get(&source.id)
            {
                items.extend_from_slice(cached);
            }
        }

        sort_newest_first(&mut items);
        if items.len() > self.settings.limit {
            tracing::debug!(total = items.len(), limit = self.settings.limit, "truncating feed");
            items.truncate(self.settings.limit);
        }

        let status = match failed {
            0 => FeedStatus::Complete,
            failed => FeedStatus::Partial { failed },
        };

        self.state = AggregationState::Done;
        tracing::info!(items = items.len(), sources = self.settings.sources.len(), "aggregation complete");

        Ok(AggregateResult { items, status })
    }

    /// Run a pass now and publish its result.
    ///
    /// A failed pass keeps the previously published items and reports them
    /// with a `Failed` status. A pass that leaves the feed empty without an
    /// error is reported as `NoContent`.
    pub async fn refresh(&mut self, force_all: bool) -> AggregateResult {
        match self.aggregate(Utc::now(), force_all).await {
            Ok(result) if result.items.is_empty() && self.published.items.is_empty() => {
                tracing::error!("feed is still empty after refresh");
                AggregateResult { items: Vec::new(), status: FeedStatus::Failed { reason: Error::NoContent.to_string() } }
            }
            Ok(result) => {
                self.published = result.clone();
                result
            }
            Err(e) => AggregateResult {
                items: self.published.items.clone(),
                status: FeedStatus::Failed { reason: e.to_string() },
            },
        }
    }
}
