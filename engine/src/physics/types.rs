//! Physics type re-exports from glam
//!
//! This module provides the vector type used throughout the physics
//! system, re-exported from the glam library, plus the
//! world-axis convention shared by bodies and projectiles.
//!
//! # Axis Convention
//!
//! **Z is up.** Gravity pulls along -Z and the ground plane is `z = 0`.
//! "Ground-plane" distances ignore Z.

pub use glam::Vec3;

/// World up axis.
pub const UP: Vec3 = Vec3::Z;

/// Speeds below this are treated as "not moving" when a direction is needed.
pub const DIRECTION_EPSILON: f32 = 1e-6;

/// Distance between two points projected onto the ground plane (Z ignored).
#[inline]
pub fn ground_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Vertical component of a vector.
#[inline]
pub fn height(v: Vec3) -> f32 {
    v.dot(UP)
}
