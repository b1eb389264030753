//! Configuration loading from YAML and environment variables

use super::models::ClientConfig;
use crate::utils::error::{ClientError, Result};
use crate::utils::logging::{LogFormat, LogLevel};
use std::env;
use std::str::FromStr;
use tracing::debug;

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "KVBATCH_";

impl ClientConfig {
    /// Parse a YAML document; missing fields take their defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ClientError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply `KVBATCH_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|name| env::var(name).ok())
    }

    /// Apply `KVBATCH_*` overrides looked up through `lookup`
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{}{}", ENV_PREFIX, suffix));

        if let Some(value) = var("MAX_ERROR_RATE") {
            self.max_error_rate = parse("MAX_ERROR_RATE", &value)?;
        }
        if let Some(value) = var("TEND_INTERVAL_MS") {
            self.tend_interval_ms = parse("TEND_INTERVAL_MS", &value)?;
        }
        if let Some(value) = var("TOTAL_TIMEOUT") {
            self.policies.batch.total_timeout = parse("TOTAL_TIMEOUT", &value)?;
        }
        if let Some(value) = var("SOCKET_TIMEOUT") {
            self.policies.batch.socket_timeout = parse("SOCKET_TIMEOUT", &value)?;
        }
        if let Some(value) = var("MAX_RETRIES") {
            self.policies.batch.max_retries = parse("MAX_RETRIES", &value)?;
        }
        if let Some(value) = var("LOG_LEVEL") {
            self.logging.level = LogLevel::from_str(&value)
                .map_err(|e| ClientError::Config(format!("{}LOG_LEVEL: {}", ENV_PREFIX, e)))?;
        }
        if let Some(value) = var("LOG_FORMAT") {
            self.logging.format = match value.to_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                other => {
                    return Err(ClientError::Config(format!(
                        "{}LOG_FORMAT: unknown format {}",
                        ENV_PREFIX, other
                    )));
                }
            };
        }

        debug!("Applied environment overrides to client configuration");
        Ok(self)
    }
}

fn parse<T>(suffix: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        ClientError::Config(format!("Invalid {}{}: {}", ENV_PREFIX, suffix, e))
    })
}
