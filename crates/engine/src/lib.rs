//! Database engine for collstore
//!
//! This crate wires the lower layers into one handle:
//! - Database: store + cache + background sweeper, open/shutdown
//! - DatabaseBuilder: fluent configuration
//! - Configuration from `collstore.toml` and `COLLSTORE_*` variables
//! - Logging setup for binaries and tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;
pub mod logging;

pub use database::{
    CacheConfig, CollstoreConfig, Database, DatabaseBuilder, JsonCache, LogFormat, LoggingConfig,
    CONFIG_FILE_NAME,
};
pub use logging::init_logging;
