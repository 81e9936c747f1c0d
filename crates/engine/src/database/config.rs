//! Database configuration via `collstore.toml`
//!
//! Every field has a default, so an empty or partial file is valid. Values
//! from the file can then be overridden by `COLLSTORE_*` environment
//! variables.

use collstore_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "collstore.toml";

/// Overrides `cache.default_ttl_secs`
pub const ENV_CACHE_TTL_SECS: &str = "COLLSTORE_CACHE_TTL_SECS";
/// Overrides `cache.cleanup_interval_secs`
pub const ENV_CACHE_CLEANUP_INTERVAL_SECS: &str = "COLLSTORE_CACHE_CLEANUP_INTERVAL_SECS";
/// Overrides `logging.level`
pub const ENV_LOG_LEVEL: &str = "COLLSTORE_LOG_LEVEL";
/// Overrides `logging.format`
pub const ENV_LOG_FORMAT: &str = "COLLSTORE_LOG_FORMAT";

/// Cache settings, the `[cache]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL applied by `TtlCache::set` (default: 300)
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
    /// Seconds between background sweeps; 0 disables the cleaner (default: 60)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_ttl_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl CacheConfig {
    /// Default TTL as a `Duration`
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Sweep interval, or `None` when the cleaner is disabled
    pub fn cleanup_interval(&self) -> Option<Duration> {
        match self.cleanup_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Logging settings, the `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level or filter directive, e.g. `"info"` or `"collstore::store=debug"`
    #[serde(default = "default_level")]
    pub level: String,
    /// `"text"` (default) or `"json"`
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl LoggingConfig {
    /// Parse the format string
    ///
    /// # Errors
    ///
    /// Returns a config error if the string is not `"text"` or `"json"`.
    pub fn log_format(&self) -> Result<LogFormat> {
        match self.format.as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::config(format!(
                "Invalid log format '{}' in {}. Expected \"text\" or \"json\".",
                other, CONFIG_FILE_NAME
            ))),
        }
    }

    /// Build the tracing filter for the configured level
    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.level).map_err(|e| {
            Error::config(format!("Invalid log level '{}': {}", self.level, e))
        })
    }
}

/// Top-level configuration loaded from `collstore.toml`
///
/// # Example
///
/// ```toml
/// [cache]
/// default_ttl_secs = 300
/// cleanup_interval_secs = 60
///
/// [logging]
/// level = "info"
/// format = "text"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollstoreConfig {
    /// Cache settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CollstoreConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# collstore configuration

[cache]
# Time-to-live for cache entries stored without an explicit TTL, in seconds
default_ttl_secs = 300
# Seconds between background sweeps of expired entries (0 disables the sweeper)
cleanup_interval_secs = 60

[logging]
# Level or filter directive, e.g. "debug" or "info,collstore::store=debug"
level = "info"
# "text" or "json"
format = "text"
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns a config error if the file cannot be read, parsed or
    /// validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: CollstoreConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `true` if the file was created.
    pub fn write_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, Self::default_toml())?;
        Ok(true)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.logging.log_format()?;
        self.logging.env_filter()?;
        Ok(())
    }

    /// Apply `COLLSTORE_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Unset variables leave the field alone. The result is validated.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_CACHE_TTL_SECS) {
            self.cache.default_ttl_secs = parse_secs(ENV_CACHE_TTL_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_CACHE_CLEANUP_INTERVAL_SECS) {
            self.cache.cleanup_interval_secs = parse_secs(ENV_CACHE_CLEANUP_INTERVAL_SECS, &raw)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = format.to_ascii_lowercase();
        }
        self.validate()
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<u64> {
    raw.trim().parse().map_err(|_| {
        Error::config(format!(
            "{} must be a non-negative integer number of seconds, got '{}'",
            name, raw
        ))
    })
}
