//! Error types for the batch client

use crate::core::types::ResultCode;
use thiserror::Error;

/// Result type alias for the client
pub type Result<T> = std::result::Result<T, ClientError>;

/// Main error type for the client
///
/// A raised `ClientError` from a batch call always means no record in that
/// call received a result. Per-record failures are never raised; they are
/// written into the record's `result` field instead.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Malformed or missing field in a batch record or one of its sub-fields
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A collaborator (operation, value or expression codec) rejected its input
    #[error("Translation failure: {0}")]
    TranslationFailure(String),

    /// Transport or store level failure of the batch call
    #[error("Execution failure [{code}]: {message}")]
    ExecutionFailure { code: ResultCode, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
