//! Static collider scene
//!
//! A flat list of sphere and box colliders, enough to answer occlusion
//! queries for sight and light without a physics engine.

use crate::services::EntityId;
use crate::sight::{Occlusion, RaycastHit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use umbra_math::{ray_aabb, ray_sphere_at, Ray, Vec3, AABB};

/// Collider geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ColliderShape {
    Sphere { center: Vec3, radius: f32 },
    Box { min: Vec3, max: Vec3 },
}

impl ColliderShape {
    /// Distance along `ray` to the surface, if hit
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match *self {
            ColliderShape::Sphere { center, radius } => ray_sphere_at(ray, center, radius),
            ColliderShape::Box { min, max } => ray_aabb(ray, &AABB::new(min, max)),
        }
    }
}

/// A collider owned by an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCollider {
    pub entity: EntityId,
    pub shape: ColliderShape,
}

/// Colliders plus the entity hierarchy used for ownership checks
#[derive(Debug, Clone, Default)]
pub struct ColliderScene {
    colliders: Vec<SceneCollider>,
    parents: HashMap<EntityId, EntityId>,
}

impl ColliderScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entity: EntityId, shape: ColliderShape) {
        self.colliders.push(SceneCollider { entity, shape });
    }

    pub fn add_sphere(&mut self, entity: EntityId, center: Vec3, radius: f32) {
        self.add(entity, ColliderShape::Sphere { center, radius });
    }

    pub fn add_box(&mut self, entity: EntityId, bounds: AABB) {
        self.add(
            entity,
            ColliderShape::Box {
                min: bounds.min,
                max: bounds.max,
            },
        );
    }

    /// Parent `child` under `parent`
    pub fn attach(&mut self, child: EntityId, parent: EntityId) {
        if child == parent {
            log::warn!("Refusing to parent {} to itself", child);
            return;
        }
        self.parents.insert(child, parent);
    }

    /// Recenter every sphere owned by `entity` (moving characters)
    pub fn move_entity(&mut self, entity: EntityId, center: Vec3) {
        for collider in self.colliders.iter_mut().filter(|c| c.entity == entity) {
            if let ColliderShape::Sphere { center: c, .. } = &mut collider.shape {
                *c = center;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn colliders(&self) -> &[SceneCollider] {
        &self.colliders
    }
}

impl Occlusion for ColliderScene {
    fn raycast(&self, ray: &Ray, max_distance: f32, ignore: Option<EntityId>) -> Option<RaycastHit> {
        if !ray.is_valid() {
            return None;
        }

        let mut nearest: Option<RaycastHit> = None;
        for collider in &self.colliders {
            if ignore.is_some_and(|skip| self.belongs_to(collider.entity, skip)) {
                continue;
            }
            let Some(distance) = collider.shape.intersect(ray) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            if nearest.map_or(true, |hit| distance < hit.distance) {
                nearest = Some(RaycastHit {
                    entity: collider.entity,
                    point: ray.at(distance),
                    distance,
                });
            }
        }
        nearest
    }

    fn belongs_to(&self, entity: EntityId, root: EntityId) -> bool {
        let mut current = entity;
        // Bounded walk so a malformed cycle cannot hang a query
        for _ in 0..=self.parents.len() {
            if current == root {
                return true;
            }
            match self.parents.get(&current) {
                Some(&parent) => current = parent,
                None => return false,
            }
        }
        false
    }
}
