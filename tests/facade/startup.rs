//! Startup: configuration file, env overrides, logging

use collstore::{init_logging, CollstoreConfig, Database, LogFormat};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn config_file_drives_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("collstore.toml");
    std::fs::write(&path, "[cache]\ndefault_ttl_secs = 90\ncleanup_interval_secs = 0\n").unwrap();

    let config = CollstoreConfig::from_file(&path).unwrap();
    let db = Database::open(config).unwrap();
    assert_eq!(db.cache().default_ttl(), Duration::from_secs(90));
    assert!(!db.is_cleaner_running());
}

#[test]
fn overrides_then_logging() {
    let mut config = CollstoreConfig::default();
    config
        .apply_overrides_from(|name| match name {
            "COLLSTORE_LOG_FORMAT" => Some("json".to_string()),
            "COLLSTORE_LOG_LEVEL" => Some("debug".to_string()),
            _ => None,
        })
        .unwrap();
    assert_eq!(config.logging.log_format().unwrap(), LogFormat::Json);

    // Installs the subscriber for this test binary; a repeat call is a no-op
    init_logging(&config.logging).unwrap();
    assert!(!init_logging(&config.logging).unwrap());

    let db = Database::builder().config(config).no_cleaner().open().unwrap();
    db.store().create("events", collstore::Fields::new()).unwrap();
    db.shutdown();
}
