//! In-memory record store

use super::apply::Change;
use crate::core::batch::AssembledBatch;
use crate::core::policy::BatchPolicy;
use crate::core::types::{Bins, DIGEST_LEN, Key, Record, ResultCode, Value};
use crate::storage::transport::{BatchResponse, BatchTransport};
use crate::utils::error::{ClientError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

/// Registered record function
///
/// Receives the record's bins (empty for a missing record) and the call
/// arguments. Bin changes are kept only when the function succeeds. Runs
/// while the record is locked, so it must not call back into the store.
pub type UdfFn =
    Arc<dyn Fn(&mut Bins, &[Value]) -> std::result::Result<Value, String> + Send + Sync>;

pub(super) type StoreKey = (String, [u8; DIGEST_LEN]);

/// Digest-keyed record store implementing [`BatchTransport`]
///
/// Clones share the same records, functions and counters.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<DashMap<StoreKey, Record>>,
    udfs: Arc<DashMap<(String, String), UdfFn>>,
    invocations: Arc<AtomicUsize>,
    fail_next: Arc<Mutex<Option<ResultCode>>>,
    latency: Option<Duration>,
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("records", &self.records.len())
            .field("udfs", &self.udfs.len())
            .field("invocations", &self.invocations())
            .field("latency", &self.latency)
            .finish()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every batch call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Register `function` under `module`, replacing any earlier registration
    pub fn register_udf<F>(&self, module: &str, function: &str, udf: F)
    where
        F: Fn(&mut Bins, &[Value]) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.udfs
            .insert((module.to_string(), function.to_string()), Arc::new(udf));
    }

    /// Store `bins` under `key` as a fresh record
    pub fn put(&self, key: &Key, bins: Bins) {
        let generation = self.get(key).map_or(0, |r| r.generation) + 1;
        self.records
            .insert(store_key(key), Record::new(bins, generation, 0));
    }

    pub fn get(&self, key: &Key) -> Option<Record> {
        self.records.get(&store_key(key)).map(|r| r.value().clone())
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.records.contains_key(&store_key(key))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&self) {
        self.records.clear();
    }

    /// Number of batch calls received, including failed ones
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Fail the next batch call as a whole with `code`
    pub fn fail_next(&self, code: ResultCode) {
        *self.fail_next.lock() = Some(code);
    }

    pub(super) fn udf(&self, module: &str, function: &str) -> Option<UdfFn> {
        self.udfs
            .get(&(module.to_string(), function.to_string()))
            .map(|f| Arc::clone(f.value()))
    }

    /// Run `f` against the current record under the record's lock and store
    /// the change it asks for
    pub(super) fn commit<F>(&self, key: &Key, f: F) -> BatchResponse
    where
        F: FnOnce(Option<&Record>) -> (BatchResponse, Change),
    {
        match self.records.entry(store_key(key)) {
            Entry::Occupied(mut slot) => {
                let (response, change) = f(Some(slot.get()));
                match change {
                    Change::Keep => {}
                    Change::Put(record) => {
                        slot.insert(record);
                    }
                    Change::Remove => {
                        slot.remove();
                    }
                }
                response
            }
            Entry::Vacant(slot) => {
                let (response, change) = f(None);
                if let Change::Put(record) = change {
                    slot.insert(record);
                }
                response
            }
        }
    }
}

#[async_trait]
impl BatchTransport for MemoryStore {
    async fn execute(
        &self,
        batch: &AssembledBatch<'_>,
        policy: &BatchPolicy,
    ) -> Result<Vec<BatchResponse>> {
        let call = self.invocations.fetch_add(1, Ordering::SeqCst) + 1;
        let injected = self.fail_next.lock().take();

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(code) = injected {
            debug!(call, %code, "failing batch call on request");
            return Err(ClientError::execution(code, "injected batch failure"));
        }

        debug!(
            call,
            entries = batch.len(),
            total_timeout = policy.total_timeout,
            "executing batch against memory store"
        );

        let responses = batch
            .iter()
            .map(|entry| {
                let response = self.apply_entry(entry);
                trace!(index = entry.index, key = %entry.key, result = %response.result, "batch entry applied");
                response
            })
            .collect();
        Ok(responses)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

fn store_key(key: &Key) -> StoreKey {
    (key.namespace.clone(), key.digest)
}
