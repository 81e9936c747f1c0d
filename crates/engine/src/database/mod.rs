//! Database handle and open/close logic
//!
//! `Database` wires together the pieces a request handler needs:
//! - the collection store
//! - a TTL cache of JSON values
//! - the background cache sweeper, when configured
//!
//! Build one at process start and share it by `Arc`. There is no global
//! instance.
//!
//! ```
//! use collstore_core::Fields;
//! use collstore_engine::Database;
//!
//! let db = Database::ephemeral();
//! let user = db.store().create("users", Fields::new().with("name", "Ada"))?;
//! db.cache().set(format!("user:{}", user.id()), user.to_json());
//! db.shutdown();
//! # Ok::<(), collstore_core::Error>(())
//! ```

mod builder;
pub mod config;

pub use builder::DatabaseBuilder;
pub use config::{CacheConfig, CollstoreConfig, LogFormat, LoggingConfig, CONFIG_FILE_NAME};

use collstore_cache::{CacheCleaner, TtlCache};
use collstore_core::Result;
use collstore_storage::CollectionStore;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{info, warn};

/// Cache type held by a [`Database`]
pub type JsonCache = TtlCache<serde_json::Value>;

struct RunningCleaner {
    cleaner: CacheCleaner<serde_json::Value>,
    handle: JoinHandle<()>,
}

/// In-memory database handle
///
/// Everything lives in process memory; dropping the last handle (or
/// restarting the process) loses all data.
pub struct Database {
    config: CollstoreConfig,
    store: Arc<CollectionStore>,
    cache: Arc<JsonCache>,
    cleaner: Mutex<Option<RunningCleaner>>,
}

impl Database {
    /// Database with default settings and no background sweeper
    ///
    /// Intended for tests; each call returns an isolated instance.
    pub fn ephemeral() -> Arc<Self> {
        let mut config = CollstoreConfig::default();
        config.cache.cleanup_interval_secs = 0;
        Arc::new(Self::from_parts(config))
    }

    /// Open a database for `config`
    ///
    /// Starts the cache sweeper when `cache.cleanup_interval_secs > 0`.
    ///
    /// # Errors
    ///
    /// Returns a config error if `config` fails validation.
    pub fn open(config: CollstoreConfig) -> Result<Arc<Self>> {
        config.validate()?;
        let db = Self::from_parts(config);
        db.start_cleaner();
        info!(
            target: "collstore::db",
            default_ttl_secs = db.config.cache.default_ttl_secs,
            cleanup_interval_secs = db.config.cache.cleanup_interval_secs,
            "Database opened"
        );
        Ok(Arc::new(db))
    }

    /// Open using a config file, creating it with defaults if missing
    ///
    /// Environment overrides are applied on top of the file.
    pub fn open_with_config_file(path: &Path) -> Result<Arc<Self>> {
        if CollstoreConfig::write_default_if_missing(path)? {
            info!(target: "collstore::db", path = %path.display(), "Wrote default config file");
        }
        let mut config = CollstoreConfig::from_file(path)?;
        config.apply_env_overrides()?;
        Self::open(config)
    }

    /// Start configuring a database
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    fn from_parts(config: CollstoreConfig) -> Self {
        let cache = Arc::new(TtlCache::new(config.cache.default_ttl()));
        Self {
            store: Arc::new(CollectionStore::new()),
            cache,
            cleaner: Mutex::new(None),
            config,
        }
    }

    fn start_cleaner(&self) {
        let Some(interval) = self.config.cache.cleanup_interval() else {
            return;
        };
        let cleaner = CacheCleaner::new(Arc::clone(&self.cache), interval);
        let handle = cleaner.start();
        *self.cleaner.lock() = Some(RunningCleaner { cleaner, handle });
    }

    /// The collection store
    pub fn store(&self) -> &Arc<CollectionStore> {
        &self.store
    }

    /// The TTL cache
    pub fn cache(&self) -> &Arc<JsonCache> {
        &self.cache
    }

    /// Effective configuration
    pub fn config(&self) -> &CollstoreConfig {
        &self.config
    }

    /// True while the background sweeper is running
    pub fn is_cleaner_running(&self) -> bool {
        self.cleaner.lock().is_some()
    }

    /// Stop background work
    ///
    /// Idempotent. Store and cache stay usable afterwards; only the sweeper
    /// stops.
    pub fn shutdown(&self) {
        let Some(running) = self.cleaner.lock().take() else {
            return;
        };
        running.cleaner.shutdown();
        if running.handle.join().is_err() {
            warn!(target: "collstore::db", "Cache cleaner thread panicked");
        }
        info!(target: "collstore::db", "Database shut down");
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("collections", &self.store.collections().len())
            .field("cleaner_running", &self.is_cleaner_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collstore_core::Fields;
    use std::time::Duration;

    #[test]
    fn test_ephemeral_has_no_cleaner() {
        let db = Database::ephemeral();
        assert!(!db.is_cleaner_running());
        assert_eq!(db.cache().default_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_open_starts_cleaner_and_shutdown_stops_it() {
        let db = Database::open(CollstoreConfig::default()).unwrap();
        assert!(db.is_cleaner_running());

        db.shutdown();
        assert!(!db.is_cleaner_running());
        // Second call is a no-op
        db.shutdown();
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let mut config = CollstoreConfig::default();
        config.logging.format = "xml".to_string();
        assert!(Database::open(config).is_err());
    }

    #[test]
    fn test_store_usable_after_shutdown() {
        let db = Database::open(CollstoreConfig::default()).unwrap();
        db.shutdown();
        let rec = db.store().create("users", Fields::new().with("name", "A")).unwrap();
        assert_eq!(rec.id(), 1);
    }

    #[test]
    fn test_instances_are_isolated() {
        let a = Database::ephemeral();
        let b = Database::ephemeral();
        a.store().create("users", Fields::new()).unwrap();
        assert_eq!(b.store().count("users").unwrap(), 0);
    }
}
