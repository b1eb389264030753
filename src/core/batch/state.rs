//! Shared client state
//!
//! Held behind the client's one coarse lock. Batch calls touch it only
//! before and after the network round trip.

use crate::core::policy::ClientPolicies;
use crate::core::types::ResultCode;
use crate::utils::error::{ClientError, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// State shared by every batch call on one client
#[derive(Debug)]
pub struct ClientState {
    /// Policy defaults; replaced wholesale, never mutated in place
    pub policies: Arc<ClientPolicies>,
    pub error_rate: ErrorRateWindow,
    pub stats: ClientStats,
}

impl ClientState {
    pub fn new(policies: ClientPolicies, max_error_rate: u32, tend_interval: Duration) -> Self {
        Self {
            policies: Arc::new(policies),
            error_rate: ErrorRateWindow::new(max_error_rate, tend_interval),
            stats: ClientStats::default(),
        }
    }
}

/// Fixed-window count of batch-level failures
///
/// Once more than `max_error_rate` failures land in the current window,
/// calls are refused until the window rolls over.
#[derive(Debug, Clone)]
pub struct ErrorRateWindow {
    max_error_rate: u32,
    tend_interval: Duration,
    errors: u32,
    window_start: Instant,
}

impl ErrorRateWindow {
    pub fn new(max_error_rate: u32, tend_interval: Duration) -> Self {
        Self {
            max_error_rate,
            tend_interval,
            errors: 0,
            window_start: Instant::now(),
        }
    }

    /// Refuse the call when the window's error budget is spent
    pub fn check(&mut self, now: Instant) -> Result<()> {
        self.roll(now);
        if self.max_error_rate > 0 && self.errors > self.max_error_rate {
            return Err(ClientError::execution(
                ResultCode::MaxErrorRate,
                format!(
                    "max error rate exceeded: {} errors within {:?}",
                    self.errors, self.tend_interval
                ),
            ));
        }
        Ok(())
    }

    pub fn record_error(&mut self, now: Instant) {
        self.roll(now);
        self.errors = self.errors.saturating_add(1);
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    fn roll(&mut self, now: Instant) {
        if now.saturating_duration_since(self.window_start) >= self.tend_interval {
            self.errors = 0;
            self.window_start = now;
        }
    }
}

/// Counters across every batch call on one client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Calls that reached the transport and returned responses
    pub batches_executed: u64,
    /// Calls aborted before or during submission
    pub batches_aborted: u64,
    pub records_succeeded: u64,
    pub records_failed: u64,
    /// Batch-level failures returned by the transport
    pub execution_failures: u64,
    /// Calls refused by the error-rate limit
    pub rejected_by_error_rate: u64,
}
