//! # kvbatch
//!
//! Batch layer of a key-value store client: one call carries a list of
//! per-key reads, writes, function applications and removes to the store in
//! a single round trip, and writes each record's outcome back onto the
//! caller's list.
//!
//! ## Features
//!
//! - **Heterogeneous batches**: Read, Write, Apply and Remove records in one call
//! - **Per-record policies**: overrides layered on client defaults, with filter expressions
//! - **All-or-nothing translation**: a malformed record aborts the call before anything is sent
//! - **Scoped resources**: every transient allocation lives in a per-call arena released exactly once
//! - **Error-rate limiting**: batch-level failures beyond `max_error_rate` fail fast
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kvbatch::{BatchClient, BatchRecord, ClientConfig, MemoryStore};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     let client = BatchClient::new(&ClientConfig::default(), Arc::new(store))?;
//!
//!     let mut records = vec![
//!         BatchRecord::write(json!(["test", "demo", "a"]), vec![json!({"op": 0, "bin": "x", "val": 1})]),
//!         BatchRecord::read(json!(["test", "demo", "a"]), vec![]),
//!         BatchRecord::remove(json!(["test", "demo", "b"])),
//!     ];
//!     client.batch_operate(&mut records, None).await?;
//!
//!     for record in &records {
//!         println!("{:?} {:?}", record.result, record.record);
//!     }
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod storage;
pub mod utils;

pub use config::{ClientConfig, ConfigBuilder, Validate};
pub use core::batch::{
    BatchClient, BatchRecord, BatchRecords, BatchSummary, BatchType, LeakDetector,
    ResourceObserver, batch_types,
};
pub use core::codec::RecordView;
pub use core::policy::ClientPolicies;
pub use core::types::{Key, ResultCode, Value};
pub use storage::{BatchResponse, BatchTransport, MemoryStore};
pub use utils::error::{ClientError, Result};
pub use utils::logging::{LoggingConfig, init_logging};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
