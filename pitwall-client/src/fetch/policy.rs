//! Retry policy: which outcomes retry and how long to wait between attempts

use pitwall_common::RETRY_DELAYS_MS;
use reqwest::StatusCode;
use std::time::Duration;

/// Retryable iff the status signals transient backend unavailability
///
/// Exactly 502, 503 and 504. A 500 is a permanent server error and is
/// handed back to the caller untouched.
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Backoff table for one logical request
///
/// The number of retries equals the table length. The default is the fixed
/// 2/4/6/8/10 second schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    pub fn max_retries(&self) -> usize {
        self.delays.len()
    }

    /// Backoff before retry number `attempt` (0-based), or `None` once the
    /// budget is spent
    pub fn delay_for(&self, attempt: usize) -> Option<Duration> {
        self.delays.get(attempt).copied()
    }

    /// Worst-case cumulative backoff
    pub fn total_backoff(&self) -> Duration {
        self.delays.iter().sum()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            RETRY_DELAYS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        )
    }
}
