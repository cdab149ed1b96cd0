//! Idle Detection
//!
//! Hosts that don't track idleness themselves can feed pointer and key
//! activity into an [`ActivityMonitor`] and read `is_idle` back each tick.
//! Time is always passed in, so the monitor is deterministic under test.

use std::time::{Duration, Instant};

/// Default time without interaction before the avatar goes unattended
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tracks the last user interaction and derives the idle flag
#[derive(Clone, Debug)]
pub struct ActivityMonitor {
    /// When the user last moved the pointer or pressed a key
    last_activity: Instant,
    /// Quiet period after which the host counts as idle
    timeout: Duration,
}

impl ActivityMonitor {
    /// Create a monitor that considers `now` the last interaction
    #[must_use]
    pub fn new(timeout: Duration, now: Instant) -> Self {
        Self {
            last_activity: now,
            timeout,
        }
    }

    /// Record a pointer move or key press
    pub fn record(&mut self, now: Instant) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }

    /// Whether the timeout has elapsed since the last interaction
    #[must_use]
    pub fn is_idle(&self, now: Instant) -> bool {
        self.idle_for(now) >= self.timeout
    }

    /// Time since the last interaction
    #[must_use]
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// Get the idle timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Change the idle timeout
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}
