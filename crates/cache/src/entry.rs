//! Cache entries with expiry

use std::time::{Duration, Instant};

/// A cached value and its expiry deadline
///
/// Expiry uses the monotonic clock, so wall-clock adjustments never revive
/// or kill entries early.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    pub(crate) value: V,
    pub(crate) expires_at: Instant,
    pub(crate) hits: u64,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            // Saturate absurd TTLs instead of overflowing Instant
            expires_at: now.checked_add(ttl).unwrap_or_else(|| far_future(now)),
            hits: 0,
        }
    }

    /// An entry is dead from its deadline onwards; a zero TTL is never readable
    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

fn far_future(now: Instant) -> Instant {
    // ~30 years
    now + Duration::from_secs(60 * 60 * 24 * 365 * 30)
}
