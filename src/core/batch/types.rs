//! Batch record types as seen by the caller

use crate::core::codec::RecordView;
use crate::core::types::ResultCode;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Numeric tags carried in a record's `_type` field
pub mod batch_types {
    pub const READ: i64 = 0;
    pub const WRITE: i64 = 1;
    pub const APPLY: i64 = 2;
    pub const REMOVE: i64 = 3;
}

/// Variant of a batch record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchType {
    Read,
    Write,
    Apply,
    Remove,
}

impl BatchType {
    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            batch_types::READ => Some(BatchType::Read),
            batch_types::WRITE => Some(BatchType::Write),
            batch_types::APPLY => Some(BatchType::Apply),
            batch_types::REMOVE => Some(BatchType::Remove),
            _ => None,
        }
    }

    pub fn tag(self) -> i64 {
        match self {
            BatchType::Read => batch_types::READ,
            BatchType::Write => batch_types::WRITE,
            BatchType::Apply => batch_types::APPLY,
            BatchType::Remove => batch_types::REMOVE,
        }
    }

    /// Whether records of this type may change the stored record
    pub fn has_write(self) -> bool {
        !matches!(self, BatchType::Read)
    }
}

/// One entry of a batch call: the request fields as handed over by the
/// caller, plus the result fields the call writes back
///
/// Request fields stay loosely typed; they are validated when the batch is
/// translated, and a malformed record aborts the whole call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// Key tuple `[namespace, set, user_key(, digest)]`
    pub key: Json,
    /// Variant tag, see [`batch_types`]
    #[serde(rename = "_type")]
    pub batch_type: i64,
    /// Operation dicts for Read and Write records
    #[serde(default)]
    pub ops: Option<Json>,
    /// Per-record policy override
    #[serde(default)]
    pub policy: Option<Json>,
    /// Function module for Apply records
    #[serde(default)]
    pub module: Option<Json>,
    /// Function name for Apply records
    #[serde(default)]
    pub function: Option<Json>,
    /// Function arguments for Apply records
    #[serde(default)]
    pub args: Option<Json>,

    /// Status written back by the call
    #[serde(default)]
    pub result: Option<ResultCode>,
    /// Record written back when the status is OK and the store returned one
    #[serde(default)]
    pub record: Option<RecordView>,
    /// Whether a write may have completed despite a failure status
    #[serde(default)]
    pub in_doubt: bool,
}

impl BatchRecord {
    /// Bare record with only a key and a variant tag
    pub fn new(key: Json, batch_type: i64) -> Self {
        Self {
            key,
            batch_type,
            ops: None,
            policy: None,
            module: None,
            function: None,
            args: None,
            result: None,
            record: None,
            in_doubt: false,
        }
    }

    /// Read the bins named by `ops`, or every bin when `ops` is empty
    pub fn read(key: Json, ops: Vec<Json>) -> Self {
        Self {
            ops: Some(Json::Array(ops)),
            ..Self::new(key, batch_types::READ)
        }
    }

    pub fn write(key: Json, ops: Vec<Json>) -> Self {
        Self {
            ops: Some(Json::Array(ops)),
            ..Self::new(key, batch_types::WRITE)
        }
    }

    pub fn apply(key: Json, module: &str, function: &str, args: Vec<Json>) -> Self {
        Self {
            module: Some(Json::String(module.to_string())),
            function: Some(Json::String(function.to_string())),
            args: Some(Json::Array(args)),
            ..Self::new(key, batch_types::APPLY)
        }
    }

    pub fn remove(key: Json) -> Self {
        Self::new(key, batch_types::REMOVE)
    }

    pub fn with_policy(mut self, policy: Json) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Append an operation dict
    pub fn add_op(&mut self, op: Json) {
        match self.ops {
            Some(Json::Array(ref mut ops)) => ops.push(op),
            _ => self.ops = Some(Json::Array(vec![op])),
        }
    }

    pub fn kind(&self) -> Option<BatchType> {
        BatchType::from_tag(self.batch_type)
    }

    /// Whether the call has written a result into this record
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }
}

/// Container for the records of one batch call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BatchRecords {
    pub batch_records: Vec<BatchRecord>,
}

impl BatchRecords {
    pub fn new(batch_records: Vec<BatchRecord>) -> Self {
        Self { batch_records }
    }

    pub fn from_json(text: &str) -> crate::utils::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn len(&self) -> usize {
        self.batch_records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch_records.is_empty()
    }
}

/// Lifecycle of one record through a batch call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Pending,
    Translated,
    Submitted,
    Succeeded,
    FailedPerRecord,
    /// The batch failed as a whole; no result was written
    Aborted,
}

impl RecordState {
    pub fn can_transition_to(self, next: RecordState) -> bool {
        use RecordState::*;
        matches!(
            (self, next),
            (Pending, Translated)
                | (Translated, Submitted)
                | (Submitted, Succeeded)
                | (Submitted, FailedPerRecord)
                | (Pending, Aborted)
                | (Translated, Aborted)
                | (Submitted, Aborted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RecordState::Succeeded | RecordState::FailedPerRecord | RecordState::Aborted
        )
    }
}

/// Counts reported by a completed batch call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}
