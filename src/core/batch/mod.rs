//! Batch operate
//!
//! Heterogeneous batch calls: every record is translated into a request
//! with its transient resources held in a per-call arena, the requests are
//! assembled in input order and submitted in one round trip, and the
//! responses are mapped back onto the caller's records by position.

pub mod arena;
mod assembler;
mod client;
mod executor;
mod mapper;
mod state;
mod translator;
mod types;


pub use arena::{
    ArenaSlot, LeakDetector, NoopObserver, Resource, ResourceArena, ResourceKind,
    ResourceObserver, SlotId,
};
pub use assembler::{AssembledBatch, BatchEntry, EntryAction};
pub use client::BatchClient;
pub use executor::BatchExecutor;
pub use mapper::map_results;
pub use state::{ClientState, ClientStats, ErrorRateWindow};
pub use translator::{BatchRecordRequest, RequestTranslator, RequestVariant};
pub use types::{
    BatchRecord, BatchRecords, BatchSummary, BatchType, RecordState, batch_types,
};
