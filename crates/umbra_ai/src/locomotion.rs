//! Locomotion contract
//!
//! Path following lives outside the core. Agents only request
//! destinations and speeds, then poll for arrival.

use crate::services::EntityId;
use std::collections::HashMap;
use umbra_math::{Vec3, AABB};

/// Extra slack added to the stopping tolerance for patrol arrival
pub const PATROL_ARRIVAL_SLACK: f32 = 0.05;

/// Extra slack added to the stopping tolerance for investigation arrival
pub const INVESTIGATE_ARRIVAL_SLACK: f32 = 0.5;

/// Movement service consumed by behavior agents
pub trait Locomotion {
    fn request_destination(&mut self, agent: EntityId, position: Vec3);

    fn set_speed(&mut self, agent: EntityId, speed: f32);

    /// Whether a path is still being computed
    fn is_path_pending(&self, agent: EntityId) -> bool;

    /// Distance left along the current path
    fn remaining_distance(&self, agent: EntityId) -> f32;

    fn stopping_tolerance(&self, agent: EntityId) -> f32;

    /// Halt in place, dropping the current path
    fn stop(&mut self, agent: EntityId);

    /// Whether the agent stands on a walkable surface
    fn is_on_surface(&self, _agent: EntityId) -> bool {
        true
    }

    /// Try to move the agent onto the nearest walkable point within `radius`
    fn snap_to_surface(&mut self, _agent: EntityId, _radius: f32) -> bool {
        false
    }
}

/// Path resolved and remaining distance within tolerance plus `slack`
pub fn has_arrived(locomotion: &dyn Locomotion, agent: EntityId, slack: f32) -> bool {
    !locomotion.is_path_pending(agent)
        && locomotion.remaining_distance(agent) <= locomotion.stopping_tolerance(agent) + slack
}

/// Per-agent state of the straight-line mover
#[derive(Debug, Clone)]
struct Body {
    position: Vec3,
    forward: Vec3,
    destination: Option<Vec3>,
    speed: f32,
    /// Cleared on the next update, like a navmesh path request
    pending: bool,
}

/// Moves agents in a straight line toward their destination.
///
/// Not a pathfinder: walls are ignored. Positions outside the optional
/// walkable area count as off-surface.
#[derive(Debug, Clone)]
pub struct StraightLineMover {
    bodies: HashMap<EntityId, Body>,
    walkable: Option<AABB>,
    stopping_tolerance: f32,
}

impl StraightLineMover {
    pub fn new() -> Self {
        Self {
            bodies: HashMap::new(),
            walkable: None,
            stopping_tolerance: 0.1,
        }
    }

    /// Restrict movement to a walkable box
    pub fn with_walkable(mut self, area: AABB) -> Self {
        self.walkable = Some(area);
        self
    }

    pub fn with_stopping_tolerance(mut self, tolerance: f32) -> Self {
        self.stopping_tolerance = tolerance.max(0.0);
        self
    }

    /// Register an agent body
    pub fn add_agent(&mut self, agent: EntityId, position: Vec3, forward: Vec3) {
        self.bodies.insert(
            agent,
            Body {
                position,
                forward: forward.normalize_or_zero(),
                destination: None,
                speed: 0.0,
                pending: false,
            },
        );
    }

    pub fn position(&self, agent: EntityId) -> Option<Vec3> {
        self.bodies.get(&agent).map(|b| b.position)
    }

    pub fn forward(&self, agent: EntityId) -> Option<Vec3> {
        self.bodies.get(&agent).map(|b| b.forward)
    }

    pub fn destination(&self, agent: EntityId) -> Option<Vec3> {
        self.bodies.get(&agent).and_then(|b| b.destination)
    }

    pub fn speed(&self, agent: EntityId) -> Option<f32> {
        self.bodies.get(&agent).map(|b| b.speed)
    }

    /// Move every body toward its destination
    pub fn update(&mut self, delta_time: f32) {
        for body in self.bodies.values_mut() {
            body.pending = false;

            let Some(destination) = body.destination else {
                continue;
            };
            let heading = (destination - body.position).normalize_or_zero();
            if heading != Vec3::ZERO {
                body.forward = heading;
            }
            body.position = body.position.move_towards(destination, body.speed * delta_time);
        }
    }

    fn on_walkable(&self, position: Vec3) -> bool {
        self.walkable.map_or(true, |area| area.contains_point(position))
    }
}

impl Default for StraightLineMover {
    fn default() -> Self {
        Self::new()
    }
}

impl Locomotion for StraightLineMover {
    fn request_destination(&mut self, agent: EntityId, position: Vec3) {
        match self.bodies.get_mut(&agent) {
            Some(body) => {
                body.destination = Some(position);
                body.pending = true;
            }
            None => log::warn!("Destination requested for unknown agent {}", agent),
        }
    }

    fn set_speed(&mut self, agent: EntityId, speed: f32) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.speed = speed.max(0.0);
        }
    }

    fn is_path_pending(&self, agent: EntityId) -> bool {
        self.bodies.get(&agent).is_some_and(|b| b.pending)
    }

    fn remaining_distance(&self, agent: EntityId) -> f32 {
        self.bodies
            .get(&agent)
            .and_then(|b| b.destination.map(|d| b.position.distance(d)))
            .unwrap_or(0.0)
    }

    fn stopping_tolerance(&self, _agent: EntityId) -> f32 {
        self.stopping_tolerance
    }

    fn stop(&mut self, agent: EntityId) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.destination = None;
            body.pending = false;
        }
    }

    fn is_on_surface(&self, agent: EntityId) -> bool {
        self.bodies
            .get(&agent)
            .is_some_and(|b| self.on_walkable(b.position))
    }

    fn snap_to_surface(&mut self, agent: EntityId, radius: f32) -> bool {
        let Some(area) = self.walkable else {
            return self.bodies.contains_key(&agent);
        };
        let Some(body) = self.bodies.get_mut(&agent) else {
            return false;
        };

        let nearest = Vec3::new(
            body.position.x.clamp(area.min.x, area.max.x),
            body.position.y.clamp(area.min.y, area.max.y),
            body.position.z.clamp(area.min.z, area.max.z),
        );
        if nearest.distance(body.position) > radius {
            return false;
        }
        log::debug!("Snapped agent {} onto walkable area at {:?}", agent, nearest);
        body.position = nearest;
        true
    }
}
