// SPDX-License-Identifier: MPL-2.0
//! Timer-owning objects for delayed and rate-limited callbacks.
//!
//! The player runs on the host's event loop, so nothing here sleeps or
//! spawns: a timer records a deadline and the owner polls it with the
//! current time. Cancelling is an explicit call, which makes teardown
//! visible and testable.

use std::time::{Duration, Instant};

/// One-shot timer with a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Timer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arms the timer unless it is already pending.
    pub fn start(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + self.delay);
        }
    }

    /// Re-arms the timer so it fires `delay` after `now`.
    pub fn reset(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Leading and trailing edge throttle.
///
/// The first call in a quiet period runs immediately. Calls arriving within
/// `interval` of the last run collapse into a single trailing run at the end
/// of the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
    trailing: Timer,
}

impl Throttle {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            trailing: Timer::new(interval),
        }
    }

    /// Registers a call. Returns `true` when it should run now.
    pub fn call(&mut self, now: Instant) -> bool {
        match self.last_run {
            Some(last) if now.saturating_duration_since(last) < self.interval => {
                if !self.trailing.is_pending() {
                    self.trailing.deadline = Some(last + self.interval);
                }
                false
            }
            _ => {
                self.last_run = Some(now);
                self.trailing.cancel();
                true
            }
        }
    }

    /// Returns `true` when a deferred trailing run is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.trailing.poll(now) {
            self.last_run = Some(now);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.trailing.is_pending()
    }

    /// When the pending trailing run comes due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.trailing.deadline()
    }

    pub fn cancel(&mut self) {
        self.trailing.cancel();
    }
}
