//! Light exposure
//!
//! A light controller decides each tick which agents it illuminates and
//! reports each of them with [`LightExposure`]. Not being reported means
//! not being lit; the agent derives "light lost" from its own memory.

use crate::services::EntityId;
use crate::sight::Occlusion;
use serde::{Deserialize, Serialize};
use umbra_math::{Ray, Vec3};

/// A single "you are lit this tick" report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightExposure {
    /// Where the light comes from
    pub source: Vec3,
    pub intensity: f32,
}

impl LightExposure {
    pub fn new(source: Vec3, intensity: f32) -> Self {
        Self { source, intensity }
    }
}

/// An agent found inside the beam during a scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LitAgent {
    pub agent: EntityId,
    pub exposure: LightExposure,
}

/// Handheld spotlight that reports the agents it illuminates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Flashlight {
    /// Holder of the light; its own colliders never block the beam
    pub owner: Option<EntityId>,
    pub position: Vec3,
    pub forward: Vec3,
    pub range: f32,
    /// Full opening angle of the beam in degrees
    pub spot_angle: f32,
    pub intensity: f32,
    pub enabled: bool,
    /// Pushes the ray origin out of the lens
    pub origin_offset: f32,
}

impl Default for Flashlight {
    fn default() -> Self {
        Self {
            owner: None,
            position: Vec3::ZERO,
            forward: Vec3::Z,
            range: 20.0,
            spot_angle: 60.0,
            intensity: 1.0,
            enabled: true,
            origin_offset: 0.1,
        }
    }
}

impl Flashlight {
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner: Some(owner),
            ..Default::default()
        }
    }

    /// Flip the switch and return the new state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        log::debug!("Flashlight {}", if self.enabled { "on" } else { "off" });
        self.enabled
    }

    pub fn set_pose(&mut self, position: Vec3, forward: Vec3) {
        self.position = position;
        self.forward = forward;
    }

    /// Whether `point` is inside the beam cone, ignoring occlusion
    pub fn in_cone(&self, point: Vec3) -> bool {
        let to_point = point - self.position;
        to_point.length() <= self.range
            && self.forward.angle_between_degrees(to_point) <= self.spot_angle * 0.5
    }

    /// Check a single agent against cone and occlusion
    pub fn illuminates(&self, occlusion: &dyn Occlusion, agent: EntityId, position: Vec3) -> bool {
        if !self.enabled || !self.in_cone(position) {
            return false;
        }

        let origin = self.position + self.forward.normalize_or_zero() * self.origin_offset;
        let (ray, length) = Ray::between(origin, position);
        if !ray.is_valid() {
            return true;
        }

        match occlusion.raycast(&ray, length, self.owner) {
            None => true,
            Some(hit) => occlusion.belongs_to(hit.entity, agent),
        }
    }

    /// Every candidate currently lit by the beam
    pub fn scan<I>(&self, candidates: I, occlusion: &dyn Occlusion) -> Vec<LitAgent>
    where
        I: IntoIterator<Item = (EntityId, Vec3)>,
    {
        if !self.enabled {
            return Vec::new();
        }

        let exposure = LightExposure::new(self.position, self.intensity);
        candidates
            .into_iter()
            .filter(|(agent, position)| self.illuminates(occlusion, *agent, *position))
            .map(|(agent, _)| {
                log::trace!("Agent {} lit by flashlight", agent);
                LitAgent { agent, exposure }
            })
            .collect()
    }
}
