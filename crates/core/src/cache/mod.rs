//! In-memory per-source TTL cache.
//!
//! Maps a [`SourceId`] to the last batch of items fetched for it and the time
//! that batch expires. Entries are replaced wholesale on refresh and never
//! deleted; a stale entry is simply superseded by the next successful fetch.
//!
//! The cache holds no lock. It is owned by a single aggregator, which only
//! writes to it after every worker of a pass has finished.

pub mod ttl;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::feed::{Item, SourceConfig, SourceId};

pub use ttl::{FALLBACK_TTL, expiry_from, resolve_ttl};

/// Cached batch for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub items: Vec<Item>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry is expired at and after its expiry timestamp.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Per-source TTL cache.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: HashMap<SourceId, CacheEntry>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sources that need a refresh, in configured order.
    ///
    /// A source is stale when `force_all` is set, when it has no entry, or
    /// when `now` is at or after its expiry. Repeated ids are reported once.
    pub fn stale_sources(&self, configured: &[SourceConfig], now: DateTime<Utc>, force_all: bool) -> Vec<SourceId> {
        let mut seen: HashSet<&SourceId> = HashSet::new();
        let mut stale = Vec::new();

        for source in configured {
            if !seen.insert(&source.id) {
                continue;
            }

            let needs_refresh = force_all
                || match self.entries.get(&source.id) {
                    None => {
                        tracing::debug!(source = %source.id, "no cache entry, refresh needed");
                        true
                    }
                    Some(entry) if entry.is_expired(now) => {
                        tracing::debug!(
                            source = %source.id,
                            expires_at = %entry.expires_at,
                            cached = entry.items.len(),
                            "cache entry expired, refresh needed"
                        );
                        true
                    }
                    Some(_) => false,
                };

            if needs_refresh {
                stale.push(source.id.clone());
            }
        }

        stale
    }

    /// Cached items for a source, if it has ever been refreshed.
    pub fn get(&self, id: &SourceId) -> Option<&[Item]> {
        self.entries.get(id).map(|entry| entry.items.as_slice())
    }

    /// Full entry for a source, including its expiry.
    pub fn entry(&self, id: &SourceId) -> Option<&CacheEntry> {
        self.entries.get(id)
    }

    /// Replace the entry for a source.
    pub fn put(&mut self, id: SourceId, items: Vec<Item>, expires_at: DateTime<Utc>) {
        tracing::debug!(source = %id, items = items.len(), %expires_at, "cache entry updated");
        self.entries.insert(id, CacheEntry { items, expires_at });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
