//! Configuration builder

use super::models::ClientConfig;
use super::validation::Validate;
use crate::core::policy::{
    BatchApplyPolicy, BatchPolicy, BatchReadPolicy, BatchRemovePolicy, BatchWritePolicy,
};
use crate::utils::error::{ClientError, Result};
use crate::utils::logging::LoggingConfig;
use std::time::Duration;

/// Builder for client configurations
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: ClientConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_policy(mut self, policy: BatchPolicy) -> Self {
        self.config.policies.batch = policy;
        self
    }

    pub fn with_read_policy(mut self, policy: BatchReadPolicy) -> Self {
        self.config.policies.batch_read = policy;
        self
    }

    pub fn with_write_policy(mut self, policy: BatchWritePolicy) -> Self {
        self.config.policies.batch_write = policy;
        self
    }

    pub fn with_apply_policy(mut self, policy: BatchApplyPolicy) -> Self {
        self.config.policies.batch_apply = policy;
        self
    }

    pub fn with_remove_policy(mut self, policy: BatchRemovePolicy) -> Self {
        self.config.policies.batch_remove = policy;
        self
    }

    /// Batch-level failures tolerated per tend interval; 0 disables the limit
    pub fn with_max_error_rate(mut self, max_error_rate: u32) -> Self {
        self.config.max_error_rate = max_error_rate;
        self
    }

    pub fn with_tend_interval(mut self, interval: Duration) -> Self {
        self.config.tend_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Build the configuration with validation
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate().map_err(ClientError::Config)?;
        Ok(self.config)
    }
}
