//! Configuration management for the client
//!
//! Loading, validation and building of [`ClientConfig`].

pub mod builder;
pub mod loader;
pub mod models;
pub mod validation;

pub use builder::ConfigBuilder;
pub use loader::ENV_PREFIX;
pub use models::*;
pub use validation::Validate;

use crate::utils::error::{ClientError, Result};
use std::path::Path;
use tracing::{debug, info};

impl ClientConfig {
    /// Load configuration from a YAML file, then apply environment overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ClientError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml_str(&content)?.with_env_overrides()?;
        config.validate_config()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self::default().with_env_overrides()?;
        config.validate_config()?;
        Ok(config)
    }

    /// Validate, reporting failures as configuration errors
    pub fn validate_config(&self) -> Result<()> {
        Validate::validate(self).map_err(|e| ClientError::Config(format!("Client config error: {}", e)))
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| ClientError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
