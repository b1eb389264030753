//! Value serializer
//!
//! JSON scalars, arrays and objects map onto [`Value`] directly. Byte strings
//! travel as `{"$bytes": "<base64>"}`; any other single-key `$` object is an
//! extension this client does not know and is rejected.

use super::CodecError;
use crate::core::types::Value;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Tag used for byte strings
pub const BYTES_TAG: &str = "$bytes";

/// Deepest nesting accepted for lists and maps
pub const MAX_DEPTH: usize = 64;

/// Decode a caller value into a bin value
pub fn decode_value(repr: &Json) -> Result<Value, CodecError> {
    decode_at_depth(repr, 0)
}

fn decode_at_depth(repr: &Json, depth: usize) -> Result<Value, CodecError> {
    if depth > MAX_DEPTH {
        return Err(CodecError::UnsupportedValue(format!(
            "nesting deeper than {} levels",
            MAX_DEPTH
        )));
    }

    match repr {
        Json::Null => Ok(Value::Nil),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if n.is_u64() {
                Err(CodecError::UnsupportedValue(format!(
                    "integer {} does not fit in 64 signed bits",
                    n
                )))
            } else {
                n.as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| CodecError::UnsupportedValue(format!("number {}", n)))
            }
        }
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(|item| decode_at_depth(item, depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Json::Object(map) => {
            if map.len() == 1 {
                if let Some((tag, inner)) = map.iter().next() {
                    if tag == BYTES_TAG {
                        return decode_bytes(inner).map(Value::Bytes);
                    }
                    if tag.starts_with('$') {
                        return Err(CodecError::UnsupportedValue(format!(
                            "unknown extension '{}'",
                            tag
                        )));
                    }
                }
            }

            let mut entries = BTreeMap::new();
            for (name, inner) in map {
                entries.insert(name.clone(), decode_at_depth(inner, depth + 1)?);
            }
            Ok(Value::Map(entries))
        }
    }
}

/// Decode the payload of a `$bytes` tag
pub(crate) fn decode_bytes(inner: &Json) -> Result<Vec<u8>, CodecError> {
    let text = inner
        .as_str()
        .ok_or_else(|| CodecError::InvalidBytes("expected a base64 string".to_string()))?;
    STANDARD
        .decode(text)
        .map_err(|e| CodecError::InvalidBytes(e.to_string()))
}

/// Encode a bin value for the caller
pub fn encode_value(value: &Value) -> Json {
    match value {
        Value::Nil => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => encode_bytes(b),
        Value::List(items) => Json::Array(items.iter().map(encode_value).collect()),
        Value::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect(),
        ),
    }
}

pub(crate) fn encode_bytes(bytes: &[u8]) -> Json {
    let mut tagged = serde_json::Map::new();
    tagged.insert(BYTES_TAG.to_string(), Json::String(STANDARD.encode(bytes)));
    Json::Object(tagged)
}
