//! Operation codec
//!
//! Operations arrive as objects of the form `{"op": code, "bin": name, "val": v}`.

use super::CodecError;
use super::value::decode_value;
use crate::core::types::{Operation, Value};
use serde_json::Value as Json;

/// Longest bin name the store accepts
pub const MAX_BIN_NAME_LEN: usize = 15;

/// Operation codes understood by this client
pub mod op_codes {
    pub const WRITE: i64 = 0;
    pub const READ: i64 = 1;
    pub const INCREMENT: i64 = 2;
    pub const PREPEND: i64 = 4;
    pub const APPEND: i64 = 5;
    pub const TOUCH: i64 = 8;
    pub const DELETE: i64 = 9;
    pub const LIST_APPEND: i64 = 1001;
    pub const LIST_APPEND_ITEMS: i64 = 1002;
    pub const LIST_CLEAR: i64 = 1009;
    pub const LIST_GET: i64 = 1011;
    pub const LIST_SIZE: i64 = 1014;
}

/// Decode one operation object
pub fn decode_operation(repr: &Json) -> Result<Operation, CodecError> {
    let fields = repr
        .as_object()
        .ok_or_else(|| CodecError::invalid_field("ops[]", "a dict produced by an operation helper"))?;

    let code = fields
        .get("op")
        .ok_or_else(|| CodecError::MissingField("op".into()))?
        .as_i64()
        .ok_or_else(|| CodecError::invalid_field("op", "an integer"))?;

    let bin = || -> Result<String, CodecError> {
        let name = fields
            .get("bin")
            .ok_or_else(|| CodecError::MissingField("bin".into()))?
            .as_str()
            .ok_or_else(|| CodecError::invalid_field("bin", "a string"))?;
        if name.is_empty() || name.len() > MAX_BIN_NAME_LEN {
            return Err(CodecError::invalid_field(
                "bin",
                format!("1 to {} characters", MAX_BIN_NAME_LEN),
            ));
        }
        Ok(name.to_string())
    };

    let val = || -> Result<Value, CodecError> {
        fields
            .get("val")
            .ok_or_else(|| CodecError::MissingField("val".into()))
            .and_then(decode_value)
    };

    let operation = match code {
        op_codes::WRITE => Operation::Write {
            bin: bin()?,
            value: val()?,
        },
        op_codes::READ => Operation::Read { bin: bin()? },
        op_codes::INCREMENT => {
            let value = val()?;
            if !matches!(value, Value::Int(_) | Value::Float(_)) {
                return Err(CodecError::invalid_field("val", "an integer or float"));
            }
            Operation::Increment { bin: bin()?, value }
        }
        op_codes::PREPEND | op_codes::APPEND => {
            let value = val()?;
            if !matches!(value, Value::String(_)) {
                return Err(CodecError::invalid_field("val", "a string"));
            }
            let bin = bin()?;
            if code == op_codes::PREPEND {
                Operation::Prepend { bin, value }
            } else {
                Operation::Append { bin, value }
            }
        }
        op_codes::TOUCH => Operation::Touch,
        op_codes::DELETE => Operation::Delete,
        op_codes::LIST_APPEND => Operation::ListAppend {
            bin: bin()?,
            value: val()?,
        },
        op_codes::LIST_APPEND_ITEMS => match val()? {
            Value::List(values) => Operation::ListAppendItems { bin: bin()?, values },
            _ => return Err(CodecError::invalid_field("val", "a list")),
        },
        op_codes::LIST_CLEAR => Operation::ListClear { bin: bin()? },
        op_codes::LIST_GET => {
            let index = fields
                .get("index")
                .ok_or_else(|| CodecError::MissingField("index".into()))?
                .as_i64()
                .ok_or_else(|| CodecError::invalid_field("index", "an integer"))?;
            Operation::ListGet { bin: bin()?, index }
        }
        op_codes::LIST_SIZE => Operation::ListSize { bin: bin()? },
        unknown => return Err(CodecError::UnknownOperation(unknown)),
    };

    Ok(operation)
}
