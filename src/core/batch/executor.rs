//! Batch executor
//!
//! Issues the single transport call for an assembled batch. The client
//! state lock is taken before and after the call but never held while the
//! call is in flight.

use super::assembler::AssembledBatch;
use super::state::ClientState;
use crate::core::policy::BatchPolicy;
use crate::core::types::ResultCode;
use crate::storage::transport::{BatchResponse, BatchTransport};
use crate::utils::error::{ClientError, Result};
use parking_lot::Mutex;
use std::time::Instant;
use tracing::{debug, warn};

/// Runs one batch against a transport
pub struct BatchExecutor<'c> {
    transport: &'c dyn BatchTransport,
    state: &'c Mutex<ClientState>,
}

impl<'c> BatchExecutor<'c> {
    pub fn new(transport: &'c dyn BatchTransport, state: &'c Mutex<ClientState>) -> Self {
        Self { transport, state }
    }

    /// Execute `batch` once; no retries happen here
    pub async fn execute(
        &self,
        batch: &AssembledBatch<'_>,
        policy: &BatchPolicy,
    ) -> Result<Vec<BatchResponse>> {
        {
            let mut state = self.state.lock();
            if let Err(e) = state.error_rate.check(Instant::now()) {
                state.stats.rejected_by_error_rate += 1;
                warn!(transport = self.transport.name(), error = %e, "batch refused");
                return Err(e);
            }
        }

        debug!(
            transport = self.transport.name(),
            entries = batch.len(),
            "submitting batch"
        );
        let outcome = self.transport.execute(batch, policy).await;

        let mut state = self.state.lock();
        match outcome {
            Ok(responses) => {
                state.stats.batches_executed += 1;
                Ok(responses)
            }
            Err(e) => {
                let e = as_execution_failure(e);
                state.stats.execution_failures += 1;
                if e.counts_toward_error_rate() {
                    state.error_rate.record_error(Instant::now());
                }
                Err(e)
            }
        }
    }
}

/// Transport errors surface as execution failures; store codes pass through
fn as_execution_failure(err: ClientError) -> ClientError {
    match err {
        ClientError::ExecutionFailure { .. } => err,
        other => ClientError::execution(ResultCode::ClientError, other.to_string()),
    }
}
