//! Line-of-sight detection
//!
//! Range and view-cone checks happen here; occlusion is delegated to
//! an [`Occlusion`] service (the game's physics). The first surface the
//! eye ray touches decides visibility: if it belongs to the target the
//! target is seen, anything else blocks the view.

use crate::services::EntityId;
use umbra_math::{Ray, Vec3};

/// Result of an occlusion raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Owner of the collider that was hit
    pub entity: EntityId,
    /// Hit point in world space
    pub point: Vec3,
    /// Distance from ray origin
    pub distance: f32,
}

/// Ray intersection service
pub trait Occlusion {
    /// First collider hit along `ray` within `max_distance`.
    ///
    /// Colliders belonging to `ignore` (or parented under it) are skipped.
    fn raycast(&self, ray: &Ray, max_distance: f32, ignore: Option<EntityId>) -> Option<RaycastHit>;

    /// Whether `entity` is `root` or one of its descendants
    fn belongs_to(&self, entity: EntityId, root: EntityId) -> bool {
        entity == root
    }
}

/// An empty world: nothing ever blocks a ray
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSpace;

impl Occlusion for OpenSpace {
    fn raycast(&self, _ray: &Ray, _max_distance: f32, _ignore: Option<EntityId>) -> Option<RaycastHit> {
        None
    }
}

/// Why a target is or is not visible
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visibility {
    Visible,
    OutOfRange,
    OutsideCone,
    /// Something else was hit first
    Occluded(EntityId),
}

impl Visibility {
    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

/// Cone-and-ray visibility check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineOfSight {
    pub max_range: f32,
    /// Half of the view cone's opening angle
    pub half_fov_degrees: f32,
    /// Height of the eyes above the observer's position
    pub eye_height: f32,
}

impl LineOfSight {
    pub fn new(max_range: f32, half_fov_degrees: f32, eye_height: f32) -> Self {
        Self {
            max_range,
            half_fov_degrees,
            eye_height,
        }
    }

    /// Classify whether `observer` can see `target` at `target_position`
    pub fn check(
        &self,
        occlusion: &dyn Occlusion,
        observer: EntityId,
        observer_position: Vec3,
        observer_forward: Vec3,
        target: EntityId,
        target_position: Vec3,
    ) -> Visibility {
        let to_target = target_position - observer_position;
        if to_target.length() > self.max_range {
            return Visibility::OutOfRange;
        }
        if observer_forward.angle_between_degrees(to_target) > self.half_fov_degrees {
            return Visibility::OutsideCone;
        }

        let eye = observer_position + Vec3::UP * self.eye_height;
        let (ray, length) = Ray::between(eye, target_position);
        if !ray.is_valid() {
            return Visibility::Visible;
        }

        match occlusion.raycast(&ray, length, Some(observer)) {
            None => Visibility::Visible,
            Some(hit) if occlusion.belongs_to(hit.entity, target) => Visibility::Visible,
            Some(hit) => Visibility::Occluded(hit.entity),
        }
    }

    /// Whether `observer` can see `target` this tick
    pub fn can_see(
        &self,
        occlusion: &dyn Occlusion,
        observer: EntityId,
        observer_position: Vec3,
        observer_forward: Vec3,
        target: EntityId,
        target_position: Vec3,
    ) -> bool {
        self.check(
            occlusion,
            observer,
            observer_position,
            observer_forward,
            target,
            target_position,
        )
        .is_visible()
    }
}
