//! Codecs between the caller's loosely typed representation and core types
//!
//! The caller hands over `serde_json::Value` trees; these modules decode them
//! into keys, values and operations, and encode returned records back.

pub mod key;
pub mod operation;
pub mod record;
pub mod value;

pub use key::{decode_key, encode_key};
pub use operation::{decode_operation, op_codes};
pub use record::{RecordMeta, RecordView, decode_record};
pub use value::{decode_value, encode_value};

use thiserror::Error;

/// Decode failure reported by a codec
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("malformed key: {0}")]
    MalformedKey(String),

    #[error("unknown operation code: {0}")]
    UnknownOperation(i64),

    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("field '{field}' must be {expected}")]
    InvalidField { field: String, expected: String },

    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("invalid bytes encoding: {0}")]
    InvalidBytes(String),
}

impl CodecError {
    pub(crate) fn invalid_field(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            expected: expected.into(),
        }
    }
}
