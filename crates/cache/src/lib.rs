//! In-memory TTL cache for collstore
//!
//! This crate implements the caching layer that sits beside the store:
//! - TtlCache: key → value map with per-entry expiry and hit statistics
//! - Prefix and predicate invalidation
//! - CacheCleaner: background thread sweeping expired entries
//! - Memoized: caches results of named computations by argument hash
//!
//! The cache is independent of the collection store. Callers decide what to
//! cache and when to invalidate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod cleaner;
mod entry;
pub mod memoize;

pub use cache::{CacheStats, TtlCache, DEFAULT_TTL};
pub use cleaner::{CacheCleaner, MIN_CLEANUP_INTERVAL};
pub use memoize::{cache_key, Memoized};
