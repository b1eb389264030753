//! Key codec
//!
//! Keys arrive as `[namespace, set, user_key]` or
//! `[namespace, set, user_key, digest]`.

use super::CodecError;
use super::value::{BYTES_TAG, decode_bytes, decode_value, encode_bytes, encode_value};
use crate::core::types::{DIGEST_LEN, Key, Value};
use serde_json::Value as Json;

/// Decode a caller key tuple
pub fn decode_key(repr: &Json) -> Result<Key, CodecError> {
    let parts = repr.as_array().ok_or_else(|| {
        CodecError::MalformedKey("key must be a tuple of (namespace, set, key[, digest])".into())
    })?;

    if parts.len() != 3 && parts.len() != 4 {
        return Err(CodecError::MalformedKey(format!(
            "key tuple must have 3 or 4 elements, got {}",
            parts.len()
        )));
    }

    let namespace = match &parts[0] {
        Json::String(ns) if !ns.is_empty() => ns.clone(),
        _ => {
            return Err(CodecError::MalformedKey(
                "namespace must be a non-empty string".into(),
            ));
        }
    };

    let set = match &parts[1] {
        Json::Null => None,
        Json::String(s) => Some(s.clone()),
        _ => return Err(CodecError::MalformedKey("set must be a string or null".into())),
    };

    let user_key = match &parts[2] {
        Json::Null => None,
        other => {
            let value = decode_value(other)
                .map_err(|e| CodecError::MalformedKey(format!("user key: {}", e)))?;
            match value {
                Value::String(_) | Value::Int(_) | Value::Bytes(_) => Some(value),
                other => {
                    return Err(CodecError::MalformedKey(format!(
                        "user key must be a string, integer or bytes, got {}",
                        other.type_name()
                    )));
                }
            }
        }
    };

    let digest = match parts.get(3) {
        None | Some(Json::Null) => None,
        Some(raw) => Some(decode_digest(raw)?),
    };

    match (user_key, digest) {
        (Some(user_key), Some(digest)) => Ok(Key {
            namespace,
            set,
            user_key: Some(user_key),
            digest,
        }),
        (Some(user_key), None) => Ok(Key::new(namespace, set, user_key)),
        (None, Some(digest)) => Ok(Key::from_digest(namespace, set, digest)),
        (None, None) => Err(CodecError::MalformedKey(
            "either a user key or a digest is required".into(),
        )),
    }
}

fn decode_digest(raw: &Json) -> Result<[u8; DIGEST_LEN], CodecError> {
    let bytes = match raw {
        Json::Object(map) if map.contains_key(BYTES_TAG) => decode_bytes(&map[BYTES_TAG])?,
        Json::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| CodecError::MalformedKey("digest bytes must be 0-255".into()))
            })
            .collect::<Result<Vec<u8>, _>>()?,
        _ => {
            return Err(CodecError::MalformedKey(
                "digest must be bytes or a list of integers".into(),
            ));
        }
    };

    <[u8; DIGEST_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
        CodecError::MalformedKey(format!(
            "digest must be {} bytes, got {}",
            DIGEST_LEN,
            bytes.len()
        ))
    })
}

/// Encode a key back into the caller's tuple form, digest included
pub fn encode_key(key: &Key) -> Json {
    Json::Array(vec![
        Json::String(key.namespace.clone()),
        key.set.clone().map(Json::String).unwrap_or(Json::Null),
        key.user_key.as_ref().map(encode_value).unwrap_or(Json::Null),
        encode_bytes(&key.digest),
    ])
}
