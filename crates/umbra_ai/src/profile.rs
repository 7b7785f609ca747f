//! Agent tuning profiles
//!
//! Every enemy variant is the same behavior machine with a different
//! profile: which senses it has and how it reacts to them.

use crate::error::{AiError, Result};
use crate::noise::NoisePolicy;
use crate::sight::LineOfSight;
use serde::{Deserialize, Serialize};
use umbra_math::lerp;

/// Floor applied to the chase duration
pub const MIN_CHASE_DURATION: f64 = 0.5;

/// Which senses an agent has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenseSet {
    pub hearing: bool,
    pub sight: bool,
    pub light: bool,
    /// Detects the target by distance alone, through walls and from behind
    pub proximity: bool,
}

impl SenseSet {
    pub const HEARING_ONLY: Self = Self {
        hearing: true,
        sight: false,
        light: false,
        proximity: false,
    };

    /// Hearing, sight and light
    pub const SIGHTED: Self = Self {
        hearing: true,
        sight: true,
        light: true,
        proximity: false,
    };

    pub const PROXIMITY_AND_LIGHT: Self = Self {
        hearing: false,
        sight: false,
        light: true,
        proximity: true,
    };
}

impl Default for SenseSet {
    fn default() -> Self {
        Self::HEARING_ONLY
    }
}

/// What a light report does to an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightReaction {
    /// Start or refresh a chase
    #[default]
    Provoke,
    /// Halt in place until the light has been gone for the memory window
    Freeze,
}

/// Tunables for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProfile {
    pub senses: SenseSet,
    pub noise_policy: NoisePolicy,
    pub light_reaction: LightReaction,

    // Hearing
    pub hearing_range: f32,
    pub hearing_threshold: f32,
    pub investigate_time: f64,

    // Patrol
    pub patrol_dwell: f64,

    // Speeds
    pub patrol_speed: f32,
    pub investigate_speed: f32,
    pub chase_speed: f32,

    // Kill
    pub kill_range: f32,
    pub kill_delay: f64,

    // Chase
    pub chase_duration: f64,
    pub light_cooldown: f64,
    pub sight_memory_window: f64,
    pub crouch_drop_delay: f64,
    /// Let a crouching target shake off a sight-triggered chase too
    pub crouch_drop_on_sight: bool,

    // Sight
    pub sight_range: f32,
    pub half_fov_degrees: f32,
    pub eye_height: f32,

    // Proximity
    pub detection_range: f32,
    /// Chase speed at the edge of detection range; `chase_speed` is
    /// reached at point blank
    pub proximity_min_speed: f32,

    // Startup
    pub surface_snap_radius: f32,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            senses: SenseSet::HEARING_ONLY,
            noise_policy: NoisePolicy::MostRecent,
            light_reaction: LightReaction::Provoke,
            hearing_range: 20.0,
            hearing_threshold: 0.5,
            investigate_time: 4.0,
            patrol_dwell: 1.5,
            patrol_speed: 3.5,
            investigate_speed: 4.5,
            chase_speed: 7.0,
            kill_range: 1.5,
            kill_delay: 0.2,
            chase_duration: 5.0,
            light_cooldown: 0.3,
            sight_memory_window: 0.6,
            crouch_drop_delay: 1.0,
            crouch_drop_on_sight: false,
            sight_range: 15.0,
            half_fov_degrees: 60.0,
            eye_height: 1.6,
            detection_range: 15.0,
            proximity_min_speed: 3.0,
            surface_snap_radius: 2.0,
        }
    }
}

impl AgentProfile {
    /// Blind hunter that only reacts to sound
    pub fn listener() -> Self {
        Self::default()
    }

    /// Sees, hears and reacts to being lit
    pub fn stalker() -> Self {
        Self {
            senses: SenseSet::SIGHTED,
            ..Self::default()
        }
    }

    /// Deaf and blind, but senses a nearby target and speeds up as it
    /// closes in. Light holds it in place.
    pub fn kari() -> Self {
        Self {
            senses: SenseSet::PROXIMITY_AND_LIGHT,
            light_reaction: LightReaction::Freeze,
            chase_speed: 9.0,
            chase_duration: MIN_CHASE_DURATION,
            ..Self::default()
        }
    }

    /// Hearing only, reacting to the loudest noise after distance falloff
    pub fn scored_listener() -> Self {
        Self {
            noise_policy: NoisePolicy::BestScored,
            ..Self::default()
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "listener" => Some(Self::listener()),
            "stalker" => Some(Self::stalker()),
            "scored_listener" => Some(Self::scored_listener()),
            "kari" => Some(Self::kari()),
            _ => None,
        }
    }

    /// Chase timer length after the minimum is applied
    pub fn effective_chase_duration(&self) -> f64 {
        self.chase_duration.max(MIN_CHASE_DURATION)
    }

    /// Chase speed for a proximity hunter `distance` away from its target
    pub fn proximity_chase_speed(&self, distance: f32) -> f32 {
        let closeness = (1.0 - distance / self.detection_range).clamp(0.0, 1.0);
        lerp(self.proximity_min_speed, self.chase_speed, closeness)
    }

    pub fn line_of_sight(&self) -> LineOfSight {
        LineOfSight::new(self.sight_range, self.half_fov_degrees, self.eye_height)
    }

    /// Reject values the behavior machine cannot work with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("hearing_range", self.hearing_range as f64),
            ("investigate_time", self.investigate_time),
            ("patrol_speed", self.patrol_speed as f64),
            ("investigate_speed", self.investigate_speed as f64),
            ("chase_speed", self.chase_speed as f64),
            ("kill_range", self.kill_range as f64),
            ("chase_duration", self.chase_duration),
            ("sight_range", self.sight_range as f64),
            ("half_fov_degrees", self.half_fov_degrees as f64),
            ("detection_range", self.detection_range as f64),
            ("proximity_min_speed", self.proximity_min_speed as f64),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(AiError::InvalidProfile(format!("{} must be positive, got {}", name, value)));
            }
        }

        let non_negative = [
            ("hearing_threshold", self.hearing_threshold as f64),
            ("patrol_dwell", self.patrol_dwell),
            ("kill_delay", self.kill_delay),
            ("light_cooldown", self.light_cooldown),
            ("sight_memory_window", self.sight_memory_window),
            ("crouch_drop_delay", self.crouch_drop_delay),
            ("eye_height", self.eye_height as f64),
            ("surface_snap_radius", self.surface_snap_radius as f64),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AiError::InvalidProfile(format!("{} must not be negative, got {}", name, value)));
            }
        }

        if self.half_fov_degrees > 180.0 {
            return Err(AiError::InvalidProfile(format!(
                "half_fov_degrees must be at most 180, got {}",
                self.half_fov_degrees
            )));
        }

        if !(self.patrol_speed < self.investigate_speed && self.investigate_speed < self.chase_speed) {
            return Err(AiError::InvalidProfile(format!(
                "speeds must satisfy patrol < investigate < chase, got {} / {} / {}",
                self.patrol_speed, self.investigate_speed, self.chase_speed
            )));
        }

        if self.proximity_min_speed > self.chase_speed {
            return Err(AiError::InvalidProfile(format!(
                "proximity_min_speed {} exceeds chase_speed {}",
                self.proximity_min_speed, self.chase_speed
            )));
        }

        Ok(())
    }
}
