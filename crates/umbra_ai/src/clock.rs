//! Simulation time and deadlines
//!
//! Every delayed action in the core (kill delay, patrol dwell,
//! investigation timeout) is a [`Deadline`] compared against the tick
//! time. Nothing is spawned, so rescheduling a deadline replaces the
//! previous one and cancelling it guarantees it can never fire.

use serde::{Deserialize, Serialize};

/// Simulation time in seconds
pub type SimTime = f64;

/// Fixed-step monotonic simulation clock
#[derive(Debug, Clone)]
pub struct SimClock {
    now: SimTime,
    step: f64,
    ticks: u64,
}

impl SimClock {
    /// Create a clock ticking `tick_rate` times per second
    pub fn new(tick_rate: f64) -> Self {
        let rate = if tick_rate.is_finite() && tick_rate > 0.0 {
            tick_rate
        } else {
            log::warn!("Invalid tick rate {}, falling back to 60 Hz", tick_rate);
            60.0
        };
        Self {
            now: 0.0,
            step: 1.0 / rate,
            ticks: 0,
        }
    }

    /// Current time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Seconds per tick
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of completed ticks
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance by one tick and return the new time
    pub fn advance(&mut self) -> SimTime {
        self.ticks += 1;
        // Derived from the tick count so long runs don't accumulate drift
        self.now = self.ticks as f64 * self.step;
        self.now
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(60.0)
    }
}

/// A cancellable one-shot deadline
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    at: Option<SimTime>,
}

impl Deadline {
    /// A deadline with nothing scheduled
    pub const fn idle() -> Self {
        Self { at: None }
    }

    /// Schedule `delay` seconds after `now`, replacing any pending deadline
    pub fn schedule(&mut self, now: SimTime, delay: f64) {
        self.at = Some(now + delay.max(0.0));
    }

    /// Drop the pending deadline
    pub fn cancel(&mut self) {
        self.at = None;
    }

    /// Whether a deadline is scheduled
    pub fn is_pending(&self) -> bool {
        self.at.is_some()
    }

    /// Whether the deadline is scheduled and has been reached
    pub fn has_elapsed(&self, now: SimTime) -> bool {
        matches!(self.at, Some(at) if now >= at)
    }

    /// Consume the deadline if it has been reached
    pub fn take_elapsed(&mut self, now: SimTime) -> bool {
        if self.has_elapsed(now) {
            self.at = None;
            true
        } else {
            false
        }
    }
}
