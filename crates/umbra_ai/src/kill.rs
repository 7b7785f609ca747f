//! Proximity kill trigger
//!
//! Once armed, the trigger fires after its delay and then stays spent.
//! Range is not rechecked at fire time.

use crate::clock::{Deadline, SimTime};
use crate::services::EntityId;

/// Guarded one-shot elimination
#[derive(Debug, Clone)]
pub struct KillTrigger {
    delay: f64,
    deadline: Deadline,
    target: Option<EntityId>,
    fired: bool,
}

impl KillTrigger {
    pub fn new(delay: f64) -> Self {
        Self {
            delay: delay.max(0.0),
            deadline: Deadline::idle(),
            target: None,
            fired: false,
        }
    }

    /// Schedule the kill. Returns false if already pending or spent.
    pub fn arm(&mut self, now: SimTime, target: EntityId) -> bool {
        if self.fired || self.deadline.is_pending() {
            return false;
        }
        self.deadline.schedule(now, self.delay);
        self.target = Some(target);
        log::debug!("Kill armed on {} (fires at {:.3})", target, now + self.delay);
        true
    }

    /// Returns the target exactly once, when the delay has elapsed
    pub fn poll(&mut self, now: SimTime) -> Option<EntityId> {
        if !self.deadline.take_elapsed(now) {
            return None;
        }
        self.fired = true;
        self.target
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_pending()
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}
