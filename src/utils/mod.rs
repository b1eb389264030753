//! Utility modules
//!
//! - **error**: the crate error type and helper constructors
//! - **logging**: tracing subscriber setup

pub mod error;
pub mod logging;

pub use error::{ClientError, Result};
pub use logging::{LogFormat, LogLevel, LoggingConfig, init_logging};
