//! Client configuration validators

use super::trait_def::Validate;
use crate::config::models::ClientConfig;
use crate::core::policy::{
    BatchApplyPolicy, BatchPolicy, BatchReadPolicy, BatchRemovePolicy, BatchWritePolicy,
    ClientPolicies,
};
use crate::utils::logging::LoggingConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Smallest ttl with a meaning: -2 keeps the current expiration
const MIN_TTL: i64 = -2;

impl Validate for ClientConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating client configuration");

        if self.tend_interval_ms == 0 {
            return Err("tend_interval_ms must be greater than 0".to_string());
        }

        self.policies.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl Validate for ClientPolicies {
    fn validate(&self) -> Result<(), String> {
        self.batch.validate().map_err(prefixed("batch"))?;
        self.batch_read.validate().map_err(prefixed("batch_read"))?;
        self.batch_write.validate().map_err(prefixed("batch_write"))?;
        self.batch_apply.validate().map_err(prefixed("batch_apply"))?;
        self.batch_remove.validate().map_err(prefixed("batch_remove"))?;
        Ok(())
    }
}

// Policy validators report the offending field first so callers can prefix
// it with where the policy came from.

impl Validate for BatchPolicy {
    fn validate(&self) -> Result<(), String> {
        if self.total_timeout > 0 && self.sleep_between_retries >= self.total_timeout {
            return Err(format!(
                "sleep_between_retries must be shorter than total_timeout ({} >= {})",
                self.sleep_between_retries, self.total_timeout
            ));
        }
        Ok(())
    }
}

impl Validate for BatchReadPolicy {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Validate for BatchWritePolicy {
    fn validate(&self) -> Result<(), String> {
        validate_ttl(self.ttl)
    }
}

impl Validate for BatchApplyPolicy {
    fn validate(&self) -> Result<(), String> {
        validate_ttl(self.ttl)
    }
}

impl Validate for BatchRemovePolicy {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

fn prefixed(policy: &'static str) -> impl Fn(String) -> String {
    move |e| format!("{}.{}", policy, e)
}

fn validate_ttl(ttl: i64) -> Result<(), String> {
    if ttl < MIN_TTL {
        return Err(format!("ttl must be {} or greater, got {}", MIN_TTL, ttl));
    }
    Ok(())
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        EnvFilter::try_new(self.filter_directive())
            .map(|_| ())
            .map_err(|e| format!("Invalid logging directives: {}", e))
    }
}
