//! Memoizing wrapper over a shared cache
//!
//! Wraps named computations so their results are cached under a key derived
//! from the computation's arguments:
//!
//! ```text
//! {prefix}:{name}:{xxh3-64 of the JSON-encoded args, 16 hex digits}
//! ```
//!
//! Arguments are any `Serialize` value; pass a tuple for several.

use std::sync::Arc;
use std::time::Duration;

use collstore_core::{Error, Result};
use serde::Serialize;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::TtlCache;

/// Derive the cache key for `name` called with `args`
///
/// Arguments go through `serde_json::Value` first so map keys are encoded
/// in sorted order; equal maps hash alike whatever their iteration order.
pub fn cache_key<A: Serialize + ?Sized>(prefix: &str, name: &str, args: &A) -> Result<String> {
    let canonical = serde_json::to_value(args)?;
    let encoded = serde_json::to_vec(&canonical)?;
    Ok(format!("{}:{}:{:016x}", prefix, name, xxh3_64(&encoded)))
}

/// Caches the results of named computations in a shared [`TtlCache`]
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use collstore_cache::{Memoized, TtlCache};
///
/// let cache = Arc::new(TtlCache::default());
/// let users = Memoized::new(Arc::clone(&cache), "users").with_ttl(Duration::from_secs(60));
///
/// let name = users.call("get_user", &42, || Ok::<_, collstore_core::Error>("alice".to_string()))?;
/// assert_eq!(name, "alice");
///
/// // Second call is served from the cache
/// let again = users.call("get_user", &42, || -> Result<String, collstore_core::Error> {
///     unreachable!()
/// })?;
/// assert_eq!(again, "alice");
/// # Ok::<(), collstore_core::Error>(())
/// ```
#[derive(Debug)]
pub struct Memoized<V> {
    cache: Arc<TtlCache<V>>,
    prefix: String,
    ttl: Option<Duration>,
}

impl<V: Clone> Memoized<V> {
    /// Memoize into `cache` under `prefix`, using the cache's default TTL
    pub fn new(cache: Arc<TtlCache<V>>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            ttl: None,
        }
    }

    /// Override the TTL for results cached through this wrapper
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Effective TTL
    pub fn ttl(&self) -> Duration {
        self.ttl.unwrap_or_else(|| self.cache.default_ttl())
    }

    /// Key prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key under which `name(args)` is cached
    pub fn key<A: Serialize + ?Sized>(&self, name: &str, args: &A) -> Result<String> {
        cache_key(&self.prefix, name, args)
    }

    /// Return the cached result of `name(args)`, or run `f` and cache it
    ///
    /// Errors from `f` are returned unchanged and nothing is cached.
    pub fn call<A, F, E>(&self, name: &str, args: &A, f: F) -> std::result::Result<V, E>
    where
        A: Serialize + ?Sized,
        F: FnOnce() -> std::result::Result<V, E>,
        E: From<Error>,
    {
        let key = self.key(name, args)?;
        if let Some(value) = self.cache.get(&key) {
            debug!(target: "collstore::cache", function = name, "Using cached result");
            return Ok(value);
        }

        let value = f()?;
        let ttl = self.ttl();
        self.cache.set_with_ttl(key, value.clone(), ttl);
        debug!(target: "collstore::cache", function = name, ttl_secs = ttl.as_secs(), "Cached function result");
        Ok(value)
    }

    /// Drop one cached result
    pub fn invalidate<A: Serialize + ?Sized>(&self, name: &str, args: &A) -> Result<bool> {
        Ok(self.cache.delete(&self.key(name, args)?))
    }

    /// Drop every cached result of `name`, whatever its arguments
    pub fn invalidate_all(&self, name: &str) -> usize {
        self.cache
            .invalidate_prefix(&format!("{}:{}:", self.prefix, name))
    }
}
