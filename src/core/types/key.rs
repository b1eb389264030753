//! Record keys

use super::value::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a record digest in bytes
pub const DIGEST_LEN: usize = 20;

/// Address of a single record: namespace, optional set, and user key or digest
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub namespace: String,
    pub set: Option<String>,
    /// User key as supplied by the caller; absent when addressed by digest only
    pub user_key: Option<Value>,
    pub digest: [u8; DIGEST_LEN],
}

impl Key {
    /// Build a key from a user key, computing its digest
    pub fn new(namespace: impl Into<String>, set: Option<String>, user_key: Value) -> Self {
        let digest = Self::compute_digest(set.as_deref(), &user_key);
        Self {
            namespace: namespace.into(),
            set,
            user_key: Some(user_key),
            digest,
        }
    }

    /// Build a key that is addressed only by a precomputed digest
    pub fn from_digest(
        namespace: impl Into<String>,
        set: Option<String>,
        digest: [u8; DIGEST_LEN],
    ) -> Self {
        Self {
            namespace: namespace.into(),
            set,
            user_key: None,
            digest,
        }
    }

    /// Digest over set name, key type and key bytes
    pub fn compute_digest(set: Option<&str>, user_key: &Value) -> [u8; DIGEST_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(set.unwrap_or("").as_bytes());
        match user_key {
            Value::Int(i) => {
                hasher.update([1u8]);
                hasher.update(i.to_be_bytes());
            }
            Value::String(s) => {
                hasher.update([3u8]);
                hasher.update(s.as_bytes());
            }
            Value::Bytes(b) => {
                hasher.update([4u8]);
                hasher.update(b);
            }
            other => {
                hasher.update([0u8]);
                hasher.update(other.to_string().as_bytes());
            }
        }
        let full = hasher.finalize();
        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&full[..DIGEST_LEN]);
        digest
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// Keys are logged by namespace, set and digest only, never by user key
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.namespace,
            self.set.as_deref().unwrap_or(""),
            self.digest_hex()
        )
    }
}
