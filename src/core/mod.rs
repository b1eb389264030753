//! Core functionality for the client
//!
//! Data types, the codecs that turn caller representations into them,
//! policies, filter expressions and the batch pipeline.

pub mod batch;
pub mod codec;
pub mod expression;
pub mod policy;
pub mod types;
