//! Client configuration

use super::*;
use crate::core::policy::ClientPolicies;
use crate::utils::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Policy defaults applied when a call or record carries no override
    #[serde(default)]
    pub policies: ClientPolicies,
    /// Batch-level failures tolerated per tend interval; 0 disables the limit
    #[serde(default = "default_max_error_rate")]
    pub max_error_rate: u32,
    /// Length of the error-rate window in milliseconds
    #[serde(default = "default_tend_interval_ms")]
    pub tend_interval_ms: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            policies: ClientPolicies::default(),
            max_error_rate: default_max_error_rate(),
            tend_interval_ms: default_tend_interval_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn tend_interval(&self) -> Duration {
        Duration::from_millis(self.tend_interval_ms)
    }
}
