//! Batch transport trait
//!
//! The network round trip of a batch call. Implementations receive the
//! assembled batch and return one response per entry, in entry order.

use crate::core::batch::AssembledBatch;
use crate::core::policy::BatchPolicy;
use crate::core::types::{Record, ResultCode};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Outcome of one batch entry as reported by the store
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResponse {
    pub result: ResultCode,
    /// Present when the store returned record data for the entry
    pub record: Option<Record>,
    /// The write may have been applied even though `result` is a failure
    pub in_doubt: bool,
}

impl BatchResponse {
    pub fn ok(record: Option<Record>) -> Self {
        Self {
            result: ResultCode::Ok,
            record,
            in_doubt: false,
        }
    }

    pub fn failed(result: ResultCode) -> Self {
        Self {
            result,
            record: None,
            in_doubt: false,
        }
    }
}

/// Store-side batch endpoint
///
/// A returned error means the batch as a whole failed and no entry has a
/// result. Per-entry failures are reported through [`BatchResponse::result`].
#[async_trait]
pub trait BatchTransport: Send + Sync {
    /// Execute every entry of `batch` in one round trip
    async fn execute(
        &self,
        batch: &AssembledBatch<'_>,
        policy: &BatchPolicy,
    ) -> Result<Vec<BatchResponse>>;

    /// Short name used in log fields
    fn name(&self) -> &str {
        "transport"
    }
}
