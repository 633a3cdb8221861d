//! Effective TTL resolution.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::Mode;
use crate::feed::SourceConfig;

/// Cache lifetime used when neither the source nor the feed sets one (2 hours).
pub const FALLBACK_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Resolve the cache lifetime for one source.
///
/// Precedence: source override > feed default > [`FALLBACK_TTL`]. Zero means
/// "unset" at both configurable levels. Development mode always yields zero.
pub fn resolve_ttl(source: &SourceConfig, default_secs: u64, mode: Mode) -> Duration {
    if mode.is_development() {
        return Duration::ZERO;
    }

    if source.update_every_secs > 0 {
        Duration::from_secs(source.update_every_secs)
    } else if default_secs > 0 {
        Duration::from_secs(default_secs)
    } else {
        FALLBACK_TTL
    }
}

/// Expiry timestamp for an entry refreshed at `now`.
///
/// Saturates at the maximum representable time instead of overflowing.
pub fn expiry_from(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
