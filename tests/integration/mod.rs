//! Integration tests for kvbatch-rs
//!
//! Full batch calls through `BatchClient` against the in-memory store.

pub mod concurrency_tests;
pub mod config_tests;
pub mod error_rate_tests;
pub mod policy_tests;
pub mod resource_tests;
pub mod validation_tests;
