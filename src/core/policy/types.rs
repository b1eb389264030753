//! Policy types
//!
//! Every policy deserializes from YAML/JSON with its defaults filled in, so the
//! same structs serve the client configuration file and per-record overrides.

use serde::{Deserialize, Serialize};

/// Whether the user key is sent along with the digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyPolicy {
    #[default]
    Digest,
    Send,
}

/// Replicas that must acknowledge a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommitLevel {
    #[default]
    All,
    Master,
}

/// How the record generation is checked before writing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPolicy {
    #[default]
    Ignore,
    /// Write only if the stored generation equals the expected one
    Eq,
    /// Write only if the expected generation is greater than the stored one
    Gt,
}

/// Behaviour when the record does or does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordExistsAction {
    #[default]
    Update,
    UpdateOnly,
    Replace,
    ReplaceOnly,
    CreateOnly,
}

/// Replica read mode for AP namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadModeAp {
    #[default]
    One,
    All,
}

/// Policy for the batch call as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPolicy {
    /// Total time budget for the call in milliseconds; 0 means no limit
    pub total_timeout: u32,
    /// Per-socket idle timeout in milliseconds
    pub socket_timeout: u32,
    /// Retries the transport may attempt
    pub max_retries: u32,
    /// Milliseconds between retries
    pub sleep_between_retries: u32,
    /// Issue per-node requests in parallel
    pub concurrent: bool,
    /// Let the server process in-memory namespaces inline
    pub allow_inline: bool,
    /// Keep going after a per-record failure instead of aborting the node
    pub respond_all_keys: bool,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            total_timeout: 1000,
            socket_timeout: 30000,
            max_retries: 2,
            sleep_between_retries: 0,
            concurrent: false,
            allow_inline: true,
            respond_all_keys: true,
        }
    }
}

/// Per-record policy for Read records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BatchReadPolicy {
    pub read_mode_ap: ReadModeAp,
}

/// Per-record policy for Write records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BatchWritePolicy {
    pub key: KeyPolicy,
    pub commit_level: CommitLevel,
    #[serde(rename = "gen")]
    pub generation_policy: GenerationPolicy,
    /// Expected generation when `gen` is not `ignore`
    pub generation: u32,
    pub exists: RecordExistsAction,
    /// Seconds to live: 0 store default, -1 never expire, -2 keep current
    pub ttl: i64,
    pub durable_delete: bool,
}

/// Per-record policy for Apply records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BatchApplyPolicy {
    pub key: KeyPolicy,
    pub commit_level: CommitLevel,
    pub ttl: i64,
    pub durable_delete: bool,
}

/// Per-record policy for Remove records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BatchRemovePolicy {
    pub key: KeyPolicy,
    pub commit_level: CommitLevel,
    #[serde(rename = "gen")]
    pub generation_policy: GenerationPolicy,
    pub generation: u32,
    pub durable_delete: bool,
}

/// Client-wide policy defaults applied when a call or record omits an override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClientPolicies {
    pub batch: BatchPolicy,
    pub batch_read: BatchReadPolicy,
    pub batch_write: BatchWritePolicy,
    pub batch_apply: BatchApplyPolicy,
    pub batch_remove: BatchRemovePolicy,
}

/// A per-record policy of whichever variant the record is
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPolicy {
    Read(BatchReadPolicy),
    Write(BatchWritePolicy),
    Apply(BatchApplyPolicy),
    Remove(BatchRemovePolicy),
}
