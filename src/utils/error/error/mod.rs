//! Error handling for the batch client
//!
//! This module defines all error types raised by the client.

#![allow(missing_docs)]

mod conversions;
mod helpers;
mod types;

pub use types::{ClientError, Result};
