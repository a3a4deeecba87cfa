//! Polling autosave timer.

use std::time::{Duration, Instant};

/// Fires at most once per interval when polled.
#[derive(Debug, Clone)]
pub struct AutosaveTimer {
    interval: Duration,
    next_due: Instant,
}

impl AutosaveTimer {
    /// Start a timer whose first tick is due one `interval` after `now`.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` when the interval has elapsed, then re-arms from `now`.
    ///
    /// Missed intervals collapse into a single tick.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.interval;
        true
    }

    /// Push the next tick one interval past `now`, e.g. after a manual save.
    pub fn reset(&mut self, now: Instant) {
        self.next_due = now + self.interval;
    }
}
