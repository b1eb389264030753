//! Type conversions for ClientError

use super::types::ClientError;
use crate::core::codec::CodecError;
use crate::core::expression::ExpressionError;

// Collaborator decode failures surface as translation failures
impl From<CodecError> for ClientError {
    fn from(err: CodecError) -> Self {
        ClientError::TranslationFailure(err.to_string())
    }
}

impl From<ExpressionError> for ClientError {
    fn from(err: ExpressionError) -> Self {
        ClientError::TranslationFailure(format!("filter expression: {}", err))
    }
}
