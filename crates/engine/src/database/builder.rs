//! Database builder for fluent configuration
//!
//! ```
//! use std::time::Duration;
//! use collstore_engine::Database;
//!
//! let db = Database::builder()
//!     .default_ttl(Duration::from_secs(30))
//!     .no_cleaner()
//!     .open()?;
//! assert_eq!(db.cache().default_ttl(), Duration::from_secs(30));
//! # Ok::<(), collstore_core::Error>(())
//! ```

use std::sync::Arc;
use std::time::Duration;

use collstore_core::Result;

use super::{CollstoreConfig, Database};

/// Builder for Database configuration
///
/// Starts from [`CollstoreConfig::default`] (or a given config) and applies
/// overrides on top.
#[derive(Debug, Clone, Default)]
pub struct DatabaseBuilder {
    config: CollstoreConfig,
}

impl DatabaseBuilder {
    /// Create new builder with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: CollstoreConfig) -> Self {
        self.config = config;
        self
    }

    /// TTL for cache entries set without one
    ///
    /// Sub-second precision is truncated.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache.default_ttl_secs = ttl.as_secs();
        self
    }

    /// Interval between background sweeps of expired cache entries
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.config.cache.cleanup_interval_secs = interval.as_secs();
        self
    }

    /// Do not run the background sweeper
    ///
    /// Expired entries are still never returned; they are only evicted
    /// lazily or by explicit `cleanup_expired` calls.
    pub fn no_cleaner(mut self) -> Self {
        self.config.cache.cleanup_interval_secs = 0;
        self
    }

    /// Log level or filter directive recorded in the config
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Log format, `"text"` or `"json"`
    pub fn log_format(mut self, format: impl Into<String>) -> Self {
        self.config.logging.format = format.into();
        self
    }

    /// Apply `COLLSTORE_*` environment overrides to the current settings
    pub fn with_env_overrides(mut self) -> Result<Self> {
        self.config.apply_env_overrides()?;
        Ok(self)
    }

    /// Open the database
    ///
    /// # Errors
    ///
    /// Returns a config error if the resulting config fails validation.
    pub fn open(self) -> Result<Arc<Database>> {
        Database::open(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let db = DatabaseBuilder::new()
            .default_ttl(Duration::from_secs(7))
            .cleanup_interval(Duration::from_secs(1))
            .log_level("debug")
            .log_format("json")
            .open()
            .unwrap();

        assert_eq!(db.config().cache.default_ttl_secs, 7);
        assert_eq!(db.config().cache.cleanup_interval_secs, 1);
        assert_eq!(db.config().logging.level, "debug");
        assert!(db.is_cleaner_running());
    }

    #[test]
    fn test_builder_no_cleaner() {
        let db = Database::builder().no_cleaner().open().unwrap();
        assert!(!db.is_cleaner_running());
    }

    #[test]
    fn test_builder_invalid_format() {
        assert!(Database::builder().log_format("xml").open().is_err());
    }
}
