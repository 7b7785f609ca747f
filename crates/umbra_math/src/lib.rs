//! # umbra_math - Spatial Math for Perception
//!
//! The handful of 3D primitives the perception core needs: vectors,
//! rays, axis-aligned boxes and the ray intersection tests used for
//! occlusion checks.

pub mod bounds;
pub mod intersect;
pub mod ray;
pub mod vector;

pub use bounds::*;
pub use intersect::*;
pub use ray::*;
pub use vector::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
    pub const EPSILON: f32 = 1e-6;
}

/// Convert radians to degrees
#[inline]
pub fn degrees(radians: f32) -> f32 {
    radians * consts::RAD_TO_DEG
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Where `value` sits between `a` and `b`, clamped to `[0, 1]`
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() < consts::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

pub mod prelude {
    pub use crate::bounds::AABB;
    pub use crate::intersect::{ray_aabb, ray_sphere_at};
    pub use crate::ray::Ray;
    pub use crate::vector::Vec3;
    pub use crate::{degrees, inverse_lerp, lerp};
}
