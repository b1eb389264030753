//! Storage layer
//!
//! The transport seam the batch executor talks to, and an in-memory store
//! implementing it.

pub mod memory;
pub mod transport;

pub use memory::{MemoryStore, UdfFn};
pub use transport::{BatchResponse, BatchTransport};
