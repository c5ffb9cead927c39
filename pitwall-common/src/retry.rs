//! Retry schedule shared by the fetch client and its front ends

use std::time::Duration;

/// Retries after the initial attempt
pub const MAX_RETRIES: usize = 5;

/// Backoff before each retry, indexed by 0-based retry number.
///
/// Arithmetic, not geometric. Keep the literal table; do not replace it with
/// a computed formula.
pub const RETRY_DELAYS_MS: [u64; MAX_RETRIES] = [2000, 4000, 6000, 8000, 10000];

/// Emitted once per retry, before the backoff sleep starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryNotice {
    /// 1-based retry number
    pub attempt: u32,
    /// Backoff about to be slept
    pub delay: Duration,
}

impl RetryNotice {
    pub fn delay_ms(&self) -> u64 {
        self.delay.as_millis() as u64
    }
}

impl std::fmt::Display for RetryNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "retry {} in {:.1}s",
            self.attempt,
            self.delay.as_secs_f64()
        )
    }
}
