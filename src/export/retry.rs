use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::config::ExportOptions;
use crate::host::{HostBridge, HostError};

/// Bounded exponential backoff for transient copy failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
        }
    }

    /// Delay before attempt `attempt + 1`, doubling from the base.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ExportOptions::default())
    }
}

impl From<&ExportOptions> for RetryPolicy {
    fn from(options: &ExportOptions) -> Self {
        Self::new(
            options.copy_attempts,
            Duration::from_millis(options.backoff_base_ms),
        )
    }
}

/// Copy through the host, retrying transient failures. Returns attempts used.
pub fn copy_with_retry(
    host: &dyn HostBridge,
    from: &Path,
    to: &Path,
    policy: &RetryPolicy,
) -> Result<u32, HostError> {
    let mut attempt = 1;
    loop {
        match host.copy_file(from, to) {
            Ok(()) => return Ok(attempt),
            Err(err) if err.is_transient() && attempt < policy.attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "Copy attempt {attempt}/{} failed for {}: {err}; retrying in {delay:?}",
                    policy.attempts,
                    from.display()
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
