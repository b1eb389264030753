//! Record decoder

use super::key::encode_key;
use super::value::encode_value;
use crate::core::types::{Key, Record};
use serde::{Deserialize, Serialize};

/// Record metadata as seen by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Generation
    #[serde(rename = "gen")]
    pub generation: u32,
    /// Time to live in seconds
    pub ttl: u32,
}

/// Caller-facing `(key, meta, bins)` view of a returned record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordView {
    pub key: serde_json::Value,
    pub meta: RecordMeta,
    pub bins: serde_json::Map<String, serde_json::Value>,
}

impl RecordView {
    pub fn bin(&self, name: &str) -> Option<&serde_json::Value> {
        self.bins.get(name)
    }
}

/// Decode a returned record against the key that requested it
pub fn decode_record(record: &Record, key: &Key) -> RecordView {
    RecordView {
        key: encode_key(key),
        meta: RecordMeta {
            generation: record.generation,
            ttl: record.expiration,
        },
        bins: record
            .bins
            .iter()
            .map(|(name, value)| (name.clone(), encode_value(value)))
            .collect(),
    }
}
