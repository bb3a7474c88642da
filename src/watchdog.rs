//! A one-shot deadline polled from the UI loop.
//!
//! Arming an armed watchdog moves its deadline instead of adding a second
//! one, so a stale selection can never fire after a newer one.

use std::time::{Duration, Instant};

/// Default time after a successful play call before the connection warning fires.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Watchdog {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl Watchdog {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// (Re)schedules the deadline to `now + timeout`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.timeout);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Returns `true` exactly once when the deadline has been reached.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}
