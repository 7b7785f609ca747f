//! Noise producers

use crate::noise::{NoiseId, NoiseLog};
use serde::{Deserialize, Serialize};
use umbra_math::Vec3;

/// How a character is moving when it makes a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gait {
    Crouch,
    Walk,
    Run,
}

/// Per-gait loudness of a noisy character or object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseEmitter {
    pub crouch: f32,
    pub walk: f32,
    pub run: f32,
    /// Impact of a thrown object
    pub throw_impact: f32,
    /// Silences footsteps (e.g. while hidden). Throws and explicit
    /// noises still report.
    pub muted: bool,
}

impl Default for NoiseEmitter {
    fn default() -> Self {
        Self {
            crouch: 0.3,
            walk: 1.0,
            run: 3.0,
            throw_impact: 5.0,
            muted: false,
        }
    }
}

impl NoiseEmitter {
    /// Loudness of a single step
    pub fn step_intensity(&self, gait: Gait) -> f32 {
        match gait {
            Gait::Crouch => self.crouch,
            Gait::Walk => self.walk,
            Gait::Run => self.run,
        }
    }

    /// Report a footstep
    pub fn emit_step(&self, log: &mut NoiseLog, position: Vec3, gait: Gait) -> Option<NoiseId> {
        if self.muted {
            return None;
        }
        Some(self.emit_at(log, position, self.step_intensity(gait)))
    }

    /// Report a thrown object landing at `position`
    pub fn emit_throw(&self, log: &mut NoiseLog, position: Vec3) -> NoiseId {
        self.emit_at(log, position, self.throw_impact)
    }

    /// Report an arbitrary noise
    pub fn emit_at(&self, log: &mut NoiseLog, position: Vec3, intensity: f32) -> NoiseId {
        log.report(position, intensity)
    }
}
