//! Call-site wrappers for timing and retrying operations.

use std::fmt::Display;
use std::thread;
use std::time::{Duration, Instant};

/// Run `f`, logging its wall-clock time at debug level.
pub fn timed<T, F>(label: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let started = Instant::now();
    let out = f();
    tracing::debug!(
        label,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "timed"
    );
    out
}

/// Fixed-delay retry for fallible operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first included. Zero behaves as one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Call `op` until it succeeds or the attempts run out. The last error
    /// is returned.
    pub fn retry<T, E, F>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    tracing::warn!(label, attempt, attempts, error = %e, "attempt failed, retrying");
                    if !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                    attempt += 1;
                }
                Err(e) => {
                    if attempts > 1 {
                        tracing::error!(label, attempts, error = %e, "giving up");
                    }
                    return Err(e);
                }
            }
        }
    }
}
