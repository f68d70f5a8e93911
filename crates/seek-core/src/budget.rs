//! Monotonic time budget for retry loops.

use std::time::{Duration, Instant};

/// Elapsed-time tracker with a fixed or infinite timeout.
///
/// A zero timeout means "no deadline": [`Budget::during`] always returns true
/// and [`Budget::remaining`] returns `None`.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    start: Instant,
    timeout: Duration,
}

impl Budget {
    /// Start a budget now.
    pub fn start(timeout: Duration) -> Self {
        Self {
            start: Instant::now(),
            timeout,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.timeout.is_zero()
    }

    /// True while the deadline has not been reached.
    pub fn during(&self) -> bool {
        self.is_unbounded() || self.elapsed() < self.timeout
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time left before the deadline, saturating at zero. `None` if unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        if self.is_unbounded() {
            None
        } else {
            Some(self.timeout.saturating_sub(self.elapsed()))
        }
    }
}
