//! Helper functions for creating specific error types

use super::types::ClientError;
use crate::core::types::ResultCode;

/// Helper functions for creating specific errors
impl ClientError {
    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter(message.into())
    }

    pub fn translation<S: Into<String>>(message: S) -> Self {
        Self::TranslationFailure(message.into())
    }

    pub fn execution<S: Into<String>>(code: ResultCode, message: S) -> Self {
        Self::ExecutionFailure {
            code,
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

impl ClientError {
    /// Store result code equivalent of this error
    pub fn code(&self) -> ResultCode {
        match self {
            ClientError::InvalidParameter(_) | ClientError::TranslationFailure(_) => {
                ResultCode::ParamError
            }
            ClientError::ExecutionFailure { code, .. } => *code,
            _ => ResultCode::ClientError,
        }
    }

    /// Whether the batch was rejected before anything was sent to the store
    pub fn is_pre_submission(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidParameter(_) | ClientError::TranslationFailure(_)
        )
    }

    /// Whether this error counts against the client's error rate
    pub fn counts_toward_error_rate(&self) -> bool {
        match self {
            ClientError::ExecutionFailure { code, .. } => *code != ResultCode::MaxErrorRate,
            _ => false,
        }
    }
}
