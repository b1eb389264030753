//! In-memory store
//!
//! Implements the batch transport over a digest-keyed map. Used by tests,
//! benchmarks and embedded callers that do not need a cluster.

mod apply;
mod store;

pub use apply::UDF_RESULT_BIN;
pub use store::{MemoryStore, UdfFn};
