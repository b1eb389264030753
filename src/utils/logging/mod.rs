//! Logging utilities
//!
//! Subscriber setup for the `tracing` events the client emits. Keys appear
//! in events as `namespace:set:digest`; user key values are never logged.

mod types;

pub use types::{LogFormat, LogLevel, LoggingConfig};

use crate::utils::error::{ClientError, Result};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber
///
/// `RUST_LOG` takes precedence over the configured level and directives.
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let installed = match config.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.with_target)
            .with_thread_ids(config.with_thread_ids)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(config.with_target)
            .with_thread_ids(config.with_thread_ids)
            .try_init(),
    };
    installed.map_err(|e| ClientError::config(format!("Failed to install logger: {}", e)))
}

pub(crate) fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(config.filter_directive())
        .map_err(|e| ClientError::config(format!("Invalid log filter: {}", e)))
}
