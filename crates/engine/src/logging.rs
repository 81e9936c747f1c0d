//! Global tracing subscriber setup
//!
//! Library code only emits `tracing` events. Binaries (or tests that want
//! output) call [`init_logging`] once near startup.

use collstore_core::Result;
use tracing::debug;

use crate::database::config::{LogFormat, LoggingConfig};

/// Install a fmt subscriber for `config`
///
/// Returns `Ok(true)` if this call installed the global subscriber and
/// `Ok(false)` if one was already installed, in which case the existing
/// subscriber is kept. Safe to call more than once.
///
/// # Errors
///
/// Returns a config error for an unknown format or unparseable level.
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    let format = config.log_format()?;
    let filter = config.env_filter()?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = match format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Text => builder.try_init().is_ok(),
    };

    if installed {
        debug!(target: "collstore::db", level = config.level.as_str(), format = config.format.as_str(), "Logging initialized");
    }
    Ok(installed)
}
