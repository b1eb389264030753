//! Error handling utilities
//!
//! This module defines the error taxonomy surfaced by batch calls.

pub mod error;

// Re-export commonly used types
pub use error::*;
