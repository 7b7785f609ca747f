//! Behavior state
//!
//! The perception state is written only by its own agent. `behavior`
//! alone decides which destination rule runs in a tick.

use crate::clock::{Deadline, SimTime};
use crate::noise::NoiseId;
use serde::{Deserialize, Serialize};
use std::fmt;
use umbra_math::Vec3;

/// Mutually exclusive top-level behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    #[default]
    Patrolling,
    Investigating,
    Chasing,
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Behavior::Patrolling => "patrolling",
            Behavior::Investigating => "investigating",
            Behavior::Chasing => "chasing",
        };
        f.write_str(name)
    }
}

/// What started the current chase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggroCause {
    #[default]
    None,
    /// Reserved: hearing leads to investigation, never straight to a chase
    Sound,
    Light,
    Sight,
    Proximity,
}

impl fmt::Display for AggroCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggroCause::None => "none",
            AggroCause::Sound => "sound",
            AggroCause::Light => "light",
            AggroCause::Sight => "sight",
            AggroCause::Proximity => "proximity",
        };
        f.write_str(name)
    }
}

/// What an agent believes about the world
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerceptionState {
    pub behavior: Behavior,
    /// Meaningful only while chasing
    pub aggro_cause: AggroCause,
    pub investigate_target: Option<Vec3>,
    pub last_heard_noise: Option<NoiseId>,
    /// Chasing holds at least until this time
    pub chase_expiry: Option<SimTime>,
    pub last_lit_at: Option<SimTime>,
    pub last_seen_at: Option<SimTime>,
    pub last_aggro_trigger_at: Option<SimTime>,
    pub patrol_index: usize,
    /// Wait at the current waypoint before moving on
    pub patrol_dwell: Deadline,
    pub investigate_deadline: Deadline,
    /// Held in place by light
    pub frozen: bool,
}

impl PerceptionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_chasing(&self) -> bool {
        self.behavior == Behavior::Chasing
    }

    /// Latest moment the target was sensed or the agent was lit
    pub fn last_contact(&self) -> Option<SimTime> {
        match (self.last_seen_at, self.last_lit_at) {
            (Some(seen), Some(lit)) => Some(seen.max(lit)),
            (seen, lit) => seen.or(lit),
        }
    }

    /// Switch behavior, invalidating the timers of the state being left.
    ///
    /// Returns false if already in `to`.
    pub fn transition(&mut self, to: Behavior) -> bool {
        let from = self.behavior;
        if from == to {
            return false;
        }

        match from {
            Behavior::Chasing => {
                self.aggro_cause = AggroCause::None;
                self.chase_expiry = None;
            }
            Behavior::Investigating => {
                self.investigate_deadline.cancel();
                self.investigate_target = None;
            }
            Behavior::Patrolling => {
                self.patrol_dwell.cancel();
            }
        }

        log::debug!("Behavior transitioning from {} to {}", from, to);
        self.behavior = to;
        true
    }

    /// Enter or refresh a chase
    pub fn begin_chase(&mut self, now: SimTime, cause: AggroCause, duration: f64) {
        self.transition(Behavior::Chasing);
        self.aggro_cause = cause;
        self.chase_expiry = Some(now + duration);
        self.last_aggro_trigger_at = Some(now);
    }
}
