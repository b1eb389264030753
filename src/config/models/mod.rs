//! Configuration data models

pub mod client;

pub use client::ClientConfig;

/// Default batch-level failures tolerated per tend interval
pub fn default_max_error_rate() -> u32 {
    100
}

/// Default error-rate window in milliseconds
pub fn default_tend_interval_ms() -> u64 {
    1000
}
