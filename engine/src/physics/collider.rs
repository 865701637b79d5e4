//! Collider shapes and narrow-phase predicates
//!
//! A body owns exactly one [`Collider`]. The shape set is closed, so pair
//! dispatch is a plain `match` over both sides.
//!
//! All overlap tests are strict: shapes that merely touch are *not*
//! colliding.
//!
//! # Example
//!
//! ```ignore
//! use skirmish_engine::physics::{Collider, Vec3};
//!
//! let a = Collider::sphere(Vec3::ZERO, 1.0);
//! let b = Collider::sphere(Vec3::new(1.9, 0.0, 0.0), 1.0);
//! assert!(a.intersects(&b));
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Collision volume attached to a physics body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    /// Sphere around `center`.
    Sphere {
        /// World-space center (meters)
        center: Vec3,
        /// Radius (meters)
        radius: f32,
    },
    /// Axis-aligned box spanning `min..max`.
    Aabb {
        /// Minimum corner (meters)
        min: Vec3,
        /// Maximum corner (meters)
        max: Vec3,
    },
}

impl Default for Collider {
    fn default() -> Self {
        Self::Sphere {
            center: Vec3::ZERO,
            radius: 1.0,
        }
    }
}

impl Collider {
    /// Sphere collider at `center`.
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere { center, radius }
    }

    /// Box collider from explicit corners.
    pub fn aabb(min: Vec3, max: Vec3) -> Self {
        Self::Aabb {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box collider centered on the origin with the given half extents.
    ///
    /// Re-centered onto its body when attached.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents.abs();
        Self::Aabb { min: -h, max: h }
    }

    /// Narrow-phase overlap test against another collider.
    pub fn intersects(&self, other: &Collider) -> bool {
        match (*self, *other) {
            (
                Self::Sphere { center: c1, radius: r1 },
                Self::Sphere { center: c2, radius: r2 },
            ) => c1.distance(c2) < r1 + r2,
            (Self::Sphere { center, radius }, Self::Aabb { min, max })
            | (Self::Aabb { min, max }, Self::Sphere { center, radius }) => {
                sphere_aabb_overlap(center, radius, min, max)
            }
            (Self::Aabb { min: a_min, max: a_max }, Self::Aabb { min: b_min, max: b_max }) => {
                aabb_aabb_overlap(a_min, a_max, b_min, b_max)
            }
        }
    }

    /// Geometric center of the shape.
    pub fn center(&self) -> Vec3 {
        match *self {
            Self::Sphere { center, .. } => center,
            Self::Aabb { min, max } => (min + max) * 0.5,
        }
    }

    /// Radius of the smallest sphere around [`center`](Self::center) that
    /// contains the shape. For boxes this is half the diagonal.
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Self::Sphere { radius, .. } => radius,
            Self::Aabb { min, max } => (max - min).length() * 0.5,
        }
    }

    /// Move the shape so its center sits at `position`, keeping its size.
    pub fn recenter(&mut self, position: Vec3) {
        match self {
            Self::Sphere { center, .. } => *center = position,
            Self::Aabb { min, max } => {
                let offset = position - (*min + *max) * 0.5;
                *min += offset;
                *max += offset;
            }
        }
    }

    /// Axis-aligned bounds `(min, max)` of the shape.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        match *self {
            Self::Sphere { center, radius } => (center - Vec3::splat(radius), center + Vec3::splat(radius)),
            Self::Aabb { min, max } => (min, max),
        }
    }
}

/// Closest point inside `min..max` to `point`.
#[inline]
pub fn closest_point_on_aabb(point: Vec3, min: Vec3, max: Vec3) -> Vec3 {
    point.clamp(min, max)
}

fn sphere_aabb_overlap(center: Vec3, radius: f32, min: Vec3, max: Vec3) -> bool {
    let closest = closest_point_on_aabb(center, min, max);
    center.distance(closest) < radius
}

fn aabb_aabb_overlap(a_min: Vec3, a_max: Vec3, b_min: Vec3, b_max: Vec3) -> bool {
    a_min.x < b_max.x
        && b_min.x < a_max.x
        && a_min.y < b_max.y
        && b_min.y < a_max.y
        && a_min.z < b_max.z
        && b_min.z < a_max.z
}
