//! collstore - concurrent in-memory collection store with a TTL cache
//!
//! collstore is the storage backend for a web API prototype: named
//! collections of schema-less records with store-assigned integer ids, safe
//! to share between threads and async tasks, plus a TTL cache for hot reads.
//!
//! # Quick Start
//!
//! ```
//! use collstore::{Database, Fields, Value};
//!
//! let db = Database::ephemeral();
//! let store = db.store();
//!
//! let alice = store.create("users", Fields::new().with("name", "Alice"))?;
//! store.update("users", alice.id(), Fields::new().with("role", "admin"))?;
//!
//! let admins = store.find_by_field("users", "role", &Value::from("admin"))?;
//! assert_eq!(admins.len(), 1);
//! # Ok::<(), collstore::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `collstore-core`: values, records, names, errors
//! - `collstore-storage`: the collection store, queries, transactions
//! - `collstore-cache`: TTL cache, sweeper, memoization
//! - `collstore-engine`: configuration, logging, the `Database` handle
//!
//! Nothing is persisted. Restarting the process loses all data.

pub use collstore_cache::{cache_key, CacheCleaner, CacheStats, Memoized, TtlCache};
pub use collstore_core::{Error, Fields, Record, RecordId, Result, Timestamp, Value};
pub use collstore_engine::{
    init_logging, CacheConfig, CollstoreConfig, Database, DatabaseBuilder, JsonCache, LogFormat,
    LoggingConfig,
};
pub use collstore_storage::{CollectionStore, CollectionTxn, Query, SortOrder, StoreStats};
