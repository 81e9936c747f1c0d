//! In-memory TTL cache
//!
//! Holds key → (value, expiry) pairs independently of the collection store.
//! One mutex guards the entry map and the counters together, so a stats
//! snapshot is always self-consistent.
//!
//! Expired entries are evicted lazily on access and in bulk by
//! [`TtlCache::cleanup_expired`], which [`crate::CacheCleaner`] calls on a
//! timer.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::entry::CacheEntry;

/// Default time-to-live (five minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Point-in-time cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Values stored
    pub sets: u64,
    /// Explicit deletes that removed an entry
    pub deletes: u64,
    /// Entries dropped because they expired
    pub evictions: u64,
    /// Entries currently held (live or not yet swept)
    pub entries: usize,
    /// `hits / (hits + misses) * 100`, rounded to two decimals
    pub hit_rate_percent: f64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: u64,
    misses: u64,
    sets: u64,
    deletes: u64,
    evictions: u64,
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    counters: Counters,
}

/// Thread-safe cache with per-entry expiry
///
/// # Example
///
/// ```
/// use collstore_cache::TtlCache;
/// use std::time::Duration;
///
/// let cache = TtlCache::new(Duration::from_secs(300));
/// cache.set("user:1", "alice".to_string());
/// assert_eq!(cache.get("user:1"), Some("alice".to_string()));
/// assert_eq!(cache.invalidate_prefix("user:"), 1);
/// assert_eq!(cache.get("user:1"), None);
/// ```
#[derive(Debug)]
pub struct TtlCache<V> {
    state: Mutex<CacheState<V>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache whose `set` uses `default_ttl`
    pub fn new(default_ttl: Duration) -> Self {
        info!(target: "collstore::cache", default_ttl_secs = default_ttl.as_secs(), "Cache initialized");
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                counters: Counters::default(),
            }),
            default_ttl,
        }
    }

    /// TTL applied by [`TtlCache::set`]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Live value for `key`, or `None`
    ///
    /// An expired entry counts as a miss and is evicted.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut state = self.state.lock();
        let state = &mut *state;

        match state.entries.get_mut(key) {
            None => {
                state.counters.misses += 1;
                None
            }
            Some(entry) if entry.is_expired(now) => {
                state.entries.remove(key);
                state.counters.misses += 1;
                state.counters.evictions += 1;
                None
            }
            Some(entry) => {
                entry.hits += 1;
                state.counters.hits += 1;
                debug!(target: "collstore::cache", key, hits = entry.hits, "Cache hit");
                Some(entry.value.clone())
            }
        }
    }

    /// Store `value` under `key` with the default TTL
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Store `value` under `key`, replacing any previous entry
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let entry = CacheEntry::new(value, ttl, Instant::now());
        let mut state = self.state.lock();
        debug!(target: "collstore::cache", key = key.as_str(), ttl_ms = ttl.as_millis() as u64, "Cache set");
        state.entries.insert(key, entry);
        state.counters.sets += 1;
    }

    /// Remove `key`; `true` if an entry was present
    pub fn delete(&self, key: &str) -> bool {
        let mut state = self.state.lock();
        let removed = state.entries.remove(key).is_some();
        if removed {
            state.counters.deletes += 1;
            debug!(target: "collstore::cache", key, "Cache delete");
        }
        removed
    }

    /// True only for a live entry; does not touch statistics
    pub fn exists(&self, key: &str) -> bool {
        let now = Instant::now();
        self.state
            .lock()
            .entries
            .get(key)
            .map(|entry| !entry.is_expired(now))
            .unwrap_or(false)
    }

    /// Drop every entry and return how many there were
    pub fn clear(&self) -> usize {
        let removed = {
            let mut state = self.state.lock();
            let removed = state.entries.len();
            state.entries.clear();
            removed
        };
        info!(target: "collstore::cache", entries_removed = removed, "Cache cleared");
        removed
    }

    /// Keys starting with `prefix`, sorted
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .state
            .lock()
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Delete every key starting with `prefix`; returns how many went
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let count = self.remove_matching(|key| key.starts_with(prefix));
        info!(target: "collstore::cache", prefix, count, "Cache prefix invalidated");
        count
    }

    /// Delete every key for which `predicate` returns true
    pub fn invalidate_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let count = self.remove_matching(predicate);
        info!(target: "collstore::cache", count, "Cache entries invalidated");
        count
    }

    fn remove_matching<F>(&self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|key, _| !predicate(key));
        let removed = before - state.entries.len();
        state.counters.deletes += removed as u64;
        removed
    }

    /// Evict every expired entry; returns how many were evicted
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired(now));
        let evicted = before - state.entries.len();
        state.counters.evictions += evicted as u64;
        if evicted > 0 {
            debug!(target: "collstore::cache", count = evicted, "Cleaned up expired cache entries");
        }
        evicted
    }

    /// Statistics snapshot
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let c = &state.counters;
        let total = c.hits + c.misses;
        let hit_rate_percent = if total == 0 {
            0.0
        } else {
            (c.hits as f64 / total as f64 * 10_000.0).round() / 100.0
        };
        CacheStats {
            hits: c.hits,
            misses: c.misses,
            sets: c.sets,
            deletes: c.deletes,
            evictions: c.evictions,
            entries: state.entries.len(),
            hit_rate_percent,
        }
    }

    /// Cached value for `key`, or compute it with `f` and cache the result
    ///
    /// `f` runs without the cache lock held, so two callers missing at the
    /// same time may both compute; the later `set` wins. An `Err` from `f` is
    /// returned and nothing is cached.
    pub fn get_or_insert_with<F, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        f: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = f()?;
        self.set_with_ttl(key, value.clone(), ttl.unwrap_or(self.default_ttl));
        Ok(value)
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
