//! Feed data model shared by the fetcher, the cache and the aggregator.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of one content source (a creator account).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One configured source with an optional TTL override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub id: SourceId,

    /// Per-source cache lifetime in seconds; 0 means "use the feed default".
    #[serde(default)]
    pub update_every_secs: u64,
}

impl SourceConfig {
    pub fn new(id: impl Into<SourceId>) -> Self {
        Self { id: id.into(), update_every_secs: 0 }
    }

    pub fn with_update_every(mut self, secs: u64) -> Self {
        self.update_every_secs = secs;
        self
    }
}

/// One content unit in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub url: String,
    pub thumbnail_url: String,
    pub author: String,
    pub author_url: String,
    pub published_at: DateTime<Utc>,
}

/// Sort items newest first.
///
/// The sort is stable, so items with equal timestamps keep their input order.
pub fn sort_newest_first(items: &mut [Item]) {
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

/// Error classification attached to an aggregation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedStatus {
    /// Every refreshed source succeeded.
    Complete,
    /// Some refreshed sources failed; the rest were merged.
    Partial { failed: usize },
    /// The pass failed; items are whatever was published before.
    Failed { reason: String },
}

impl FeedStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, FeedStatus::Complete)
    }
}

/// Merged, sorted and truncated feed plus its error classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub items: Vec<Item>,
    pub status: FeedStatus,
}

impl AggregateResult {
    pub fn empty() -> Self {
        Self { items: Vec::new(), status: FeedStatus::Complete }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(title: &str, ts: i64) -> Item {
        Item {
            title: title.to_string(),
            url: format!("https://www.bilibili.com/video/{title}"),
            thumbnail_url: String::new(),
            author: "author".to_string(),
            author_url: "https://space.bilibili.com/1".to_string(),
            published_at: Utc.timestamp_opt(ts, 0).unwrap(),
        }
    }

    #[test]
    fn test_sort_newest_first() {
        let mut items = vec![item("a", 100), item("b", 300), item("c", 200)];
        sort_newest_first(&mut items);
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["b", "c", "a"]);
    }

    #[test]
    fn test_sort_ties_keep_input_order() {
        let mut items = vec![item("first", 100), item("newer", 200), item("second", 100), item("third", 100)];
        sort_newest_first(&mut items);
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["newer", "first", "second", "third"]);
    }

    #[test]
    fn test_source_config_deserialize_default_ttl() {
        let cfg: SourceConfig = serde_json::from_str(r#"{"id": "946974"}"#).unwrap();
        assert_eq!(cfg.id.as_str(), "946974");
        assert_eq!(cfg.update_every_secs, 0);
    }

    #[test]
    fn test_feed_status_serialization() {
        let json = serde_json::to_string(&FeedStatus::Partial { failed: 1 }).unwrap();
        assert_eq!(json, r#"{"kind":"partial","failed":1}"#);
        assert!(FeedStatus::Complete.is_complete());
    }
}
