//! Bounded polling for asynchronous UI state changes.
//!
//! Dismissing a banner is handled by client-side script, so the page does not
//! change synchronously with the click. [`Waiter::wait_for`] re-checks a
//! condition on the calling task until it holds or the timeout elapses.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject options that could never poll meaningfully
    pub fn validate(&self) -> ProbeResult<()> {
        if self.timeout_ms == 0 {
            return Err(ProbeError::config("wait timeout must be greater than zero"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ProbeError::config(
                "wait poll interval must be greater than zero",
            ));
        }
        if self.poll_interval_ms > self.timeout_ms {
            return Err(ProbeError::config(format!(
                "wait poll interval ({}ms) exceeds timeout ({}ms)",
                self.poll_interval_ms, self.timeout_ms
            )));
        }
        Ok(())
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was checked
    pub attempts: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// WAITER IMPLEMENTATION
// =============================================================================

/// Waiter for synchronization operations
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a new waiter with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self { options }
    }

    /// The options this waiter polls with
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `check` until it reports `true` or the timeout elapses.
    ///
    /// The condition is always checked at least once. Assertion failures
    /// (missing element, not displayed, ...) count as "not yet" and are
    /// retried; any other error aborts the wait immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Timeout`] when the condition never holds, or the
    /// first non-assertion error raised by `check`.
    pub async fn wait_for<F, Fut>(&self, waited_for: &str, mut check: F) -> ProbeResult<WaitResult>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProbeResult<bool>>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let mut attempts = 0_u32;

        loop {
            attempts += 1;
            match check().await {
                Ok(true) => {
                    tracing::debug!(waited_for, attempts, "wait condition satisfied");
                    return Ok(WaitResult {
                        elapsed: start.elapsed(),
                        attempts,
                        waited_for: waited_for.to_string(),
                    });
                }
                Ok(false) => {
                    tracing::debug!(waited_for, attempts, "wait condition not yet satisfied");
                }
                Err(e) if e.is_assertion() => {
                    tracing::debug!(waited_for, attempts, error = %e, "wait check failed, retrying");
                }
                Err(e) => return Err(e),
            }

            if start.elapsed() >= timeout {
                return Err(ProbeError::Timeout {
                    ms: self.options.timeout_ms,
                    waited_for: waited_for.to_string(),
                });
            }
            tokio::time::sleep(self.options.poll_interval()).await;
        }
    }
}
