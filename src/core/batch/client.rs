//! Batch client
//!
//! Entry point for batch calls. One call translates every record, submits
//! the assembled batch once and writes a result onto every record, or fails
//! as a whole and writes nothing.

use super::arena::{NoopObserver, Resource, ResourceArena, ResourceObserver};
use super::assembler::AssembledBatch;
use super::executor::BatchExecutor;
use super::mapper::map_results;
use super::state::{ClientState, ClientStats};
use super::translator::RequestTranslator;
use super::types::{BatchRecord, BatchRecords, BatchSummary, RecordState};
use crate::config::ClientConfig;
use crate::core::policy::{BatchPolicy, ClientPolicies, convert_policy, policy_expression};
use crate::storage::transport::BatchTransport;
use crate::utils::error::{ClientError, Result};
use parking_lot::Mutex;
use serde_json::Value as Json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Batch client over a transport
///
/// Clones share the transport and the client state. Independent calls may
/// run concurrently; each owns its own arena.
#[derive(Clone)]
pub struct BatchClient {
    transport: Arc<dyn BatchTransport>,
    state: Arc<Mutex<ClientState>>,
    observer: Arc<dyn ResourceObserver>,
}

impl std::fmt::Debug for BatchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchClient")
            .field("transport", &self.transport.name())
            .field("stats", &self.stats())
            .finish()
    }
}

impl BatchClient {
    /// Create a client from a validated configuration
    pub fn new(config: &ClientConfig, transport: Arc<dyn BatchTransport>) -> Result<Self> {
        config.validate_config()?;
        let state = ClientState::new(
            config.policies.clone(),
            config.max_error_rate,
            config.tend_interval(),
        );
        info!(
            transport = transport.name(),
            max_error_rate = config.max_error_rate,
            "batch client created"
        );
        Ok(Self {
            transport,
            state: Arc::new(Mutex::new(state)),
            observer: Arc::new(NoopObserver),
        })
    }

    /// Report arena acquisitions and releases to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn ResourceObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn stats(&self) -> ClientStats {
        self.state.lock().stats
    }

    /// Current policy defaults
    pub fn policies(&self) -> Arc<ClientPolicies> {
        Arc::clone(&self.state.lock().policies)
    }

    /// Replace the policy defaults; calls already in flight keep the old ones
    pub fn set_policies(&self, policies: ClientPolicies) {
        self.state.lock().policies = Arc::new(policies);
    }

    /// Run one batch call over `records`
    ///
    /// On success every record carries a result code. On error no record
    /// was changed, and every resource the call created has been released.
    pub async fn batch_operate(
        &self,
        records: &mut [BatchRecord],
        policy: Option<&Json>,
    ) -> Result<BatchSummary> {
        if records.is_empty() {
            // The batch policy is validated even when there is nothing to send
            let mut arena = ResourceArena::with_capacity(0, Arc::clone(&self.observer));
            batch_policy(policy, &self.policies(), &mut arena)?;
            arena.release_all();
            debug!("empty batch, nothing to submit");
            return Ok(BatchSummary::default());
        }

        let started = Instant::now();
        let defaults = self.policies();
        let mut states = vec![RecordState::Pending; records.len()];
        let mut arena = ResourceArena::with_capacity(records.len(), Arc::clone(&self.observer));

        let outcome = self
            .run(records, policy, &defaults, &mut arena, &mut states)
            .await;
        let released = arena.release_all();

        match outcome {
            Ok(summary) => {
                info!(
                    records = summary.total,
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    released,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "batch completed"
                );
                Ok(summary)
            }
            Err(e) => {
                let aborted = abort(&mut states);
                self.state.lock().stats.batches_aborted += 1;
                warn!(
                    records = records.len(),
                    aborted,
                    released,
                    code = %e.code(),
                    error = %e,
                    "batch aborted"
                );
                Err(e)
            }
        }
    }

    /// [`Self::batch_operate`] over a records container
    pub async fn batch_operate_records(
        &self,
        records: &mut BatchRecords,
        policy: Option<&Json>,
    ) -> Result<BatchSummary> {
        self.batch_operate(&mut records.batch_records, policy).await
    }

    async fn run(
        &self,
        records: &mut [BatchRecord],
        policy: Option<&Json>,
        defaults: &ClientPolicies,
        arena: &mut ResourceArena,
        states: &mut [RecordState],
    ) -> Result<BatchSummary> {
        let batch_policy = batch_policy(policy, defaults, arena)?;

        let requests = RequestTranslator::new(defaults).translate_all(records, arena)?;
        advance(states, RecordState::Translated);

        let responses = {
            let batch = AssembledBatch::assemble(&requests, arena, defaults)?;
            advance(states, RecordState::Submitted);
            BatchExecutor::new(self.transport.as_ref(), &self.state)
                .execute(&batch, &batch_policy)
                .await?
        };

        let summary = map_results(records, &requests, responses, states)?;
        {
            let mut state = self.state.lock();
            state.stats.records_succeeded += summary.succeeded as u64;
            state.stats.records_failed += summary.failed as u64;
        }
        Ok(summary)
    }
}

/// Batch-level policy for the call, registering its filter with the arena
fn batch_policy(
    policy: Option<&Json>,
    defaults: &ClientPolicies,
    arena: &mut ResourceArena,
) -> Result<BatchPolicy> {
    let Some(repr) = policy.filter(|p| !p.is_null()) else {
        return Ok(defaults.batch.clone());
    };
    let converted = convert_policy(repr, &defaults.batch).map_err(|e| match e {
        ClientError::InvalidParameter(msg) => {
            ClientError::invalid_parameter(format!("batch policy: {}", msg))
        }
        other => other,
    })?;
    if let Some(expr) = policy_expression(repr)? {
        arena.acquire_for_batch(Resource::Expression(expr))?;
    }
    Ok(converted)
}

fn advance(states: &mut [RecordState], next: RecordState) {
    for state in states.iter_mut() {
        if state.can_transition_to(next) {
            *state = next;
        }
    }
}

/// Move every unfinished record to `Aborted`, returning how many moved
fn abort(states: &mut [RecordState]) -> usize {
    let mut aborted = 0;
    for state in states.iter_mut() {
        if !state.is_terminal() && state.can_transition_to(RecordState::Aborted) {
            *state = RecordState::Aborted;
            aborted += 1;
        }
    }
    aborted
}
