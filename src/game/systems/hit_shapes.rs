//! Shape hit-tests for projectiles and area abilities.
//!
//! All tests are inclusive (`<=`). Directions passed in must already be
//! normalized; a zero direction never matches a cone or a line.

use glam::Vec3;

use crate::game::ability::HitShape;
use crate::physics::types::{DIRECTION_EPSILON, ground_distance};

/// Fixed-size tuning for [`projectile_hits`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitParams {
    /// Projectile collision radius (meters)
    pub collision_radius: f32,
    /// Radius every target is treated as (meters)
    pub target_radius: f32,
    /// Cone half-angle (degrees)
    pub cone_half_angle_degrees: f32,
}

/// Point-radius contact: `distance(a, b) <= reach`.
#[inline]
pub fn within_reach(origin: Vec3, target: Vec3, reach: f32) -> bool {
    origin.distance(target) <= reach
}

/// Target inside a cone of `half_angle_degrees` around `direction`, no
/// further than `radius` from its apex.
pub fn in_cone(origin: Vec3, target: Vec3, direction: Vec3, radius: f32, half_angle_degrees: f32) -> bool {
    let to_target = target - origin;
    let distance = to_target.length();
    if distance > radius {
        return false;
    }
    // Standing on the apex counts as inside.
    if distance <= DIRECTION_EPSILON {
        return true;
    }
    let cos_half = half_angle_degrees.to_radians().cos();
    direction.dot(to_target / distance) >= cos_half
}

/// Target inside a forward strip `width` wide: no further than `length`
/// from `origin`, projection onto `direction` within `0..=length`, and
/// perpendicular offset at most half the width.
pub fn in_line(origin: Vec3, target: Vec3, direction: Vec3, length: f32, width: f32) -> bool {
    if direction.length_squared() <= DIRECTION_EPSILON {
        return false;
    }
    let to_target = target - origin;
    if to_target.length() > length {
        return false;
    }
    let projection = to_target.dot(direction);
    if projection < 0.0 || projection > length {
        return false;
    }
    let perpendicular = (to_target - direction * projection).length();
    perpendicular <= width * 0.5
}

/// Top-down circle: distance on the ground plane, height ignored.
#[inline]
pub fn in_circle(center: Vec3, target: Vec3, radius: f32) -> bool {
    ground_distance(center, target) <= radius
}

#[inline]
pub fn in_sphere(center: Vec3, target: Vec3, radius: f32) -> bool {
    center.distance(target) <= radius
}

/// Whether a projectile at `position` flying along `direction` hits a
/// target at `target`, under the ability's shape.
pub fn projectile_hits(
    shape: HitShape,
    params: &HitParams,
    effect_radius: f32,
    position: Vec3,
    direction: Vec3,
    target: Vec3,
) -> bool {
    match shape {
        HitShape::Cone => in_cone(position, target, direction, effect_radius, params.cone_half_angle_degrees),
        HitShape::Line => in_line(position, target, direction, effect_radius, effect_radius),
        HitShape::SingleTarget | HitShape::Circle | HitShape::Sphere | HitShape::Unspecified => {
            within_reach(position, target, params.collision_radius + params.target_radius)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: HitParams = HitParams {
        collision_radius: 0.5,
        target_radius: 1.0,
        cone_half_angle_degrees: 45.0,
    };

    #[test]
    fn test_point_reach_inclusive() {
        assert!(within_reach(Vec3::ZERO, Vec3::new(1.5, 0.0, 0.0), 1.5));
        assert!(!within_reach(Vec3::ZERO, Vec3::new(1.51, 0.0, 0.0), 1.5));
    }

    #[test]
    fn test_cone_angle_and_range() {
        let dir = Vec3::X;
        // 30 degrees off-axis, inside 45
        let inside = Vec3::new(30f32.to_radians().cos(), 30f32.to_radians().sin(), 0.0) * 3.0;
        // 60 degrees off-axis
        let outside = Vec3::new(60f32.to_radians().cos(), 60f32.to_radians().sin(), 0.0) * 3.0;
        assert!(in_cone(Vec3::ZERO, inside, dir, 5.0, 45.0));
        assert!(!in_cone(Vec3::ZERO, outside, dir, 5.0, 45.0));
        assert!(!in_cone(Vec3::ZERO, Vec3::new(6.0, 0.0, 0.0), dir, 5.0, 45.0));
        assert!(!in_cone(Vec3::ZERO, Vec3::new(-2.0, 0.0, 0.0), dir, 5.0, 45.0));
        assert!(in_cone(Vec3::ZERO, Vec3::ZERO, dir, 5.0, 45.0));
    }

    #[test]
    fn test_line_projection_and_width() {
        let dir = Vec3::Y;
        // Half-width is 1.0
        assert!(in_line(Vec3::ZERO, Vec3::new(1.0, 4.0, 0.0), dir, 5.0, 2.0));
        assert!(!in_line(Vec3::ZERO, Vec3::new(1.1, 4.0, 0.0), dir, 5.0, 2.0));
        assert!(!in_line(Vec3::ZERO, Vec3::new(0.0, 5.5, 0.0), dir, 5.0, 2.0));
        assert!(!in_line(Vec3::ZERO, Vec3::new(0.0, -0.5, 0.0), dir, 5.0, 2.0));
        assert!(!in_line(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, 5.0, 2.0));
    }

    #[test]
    fn test_line_rejects_targets_beyond_length() {
        // Projection 4.95 and offset 0.99 both fit, but the target is 5.05 away
        let target = Vec3::new(0.99, 4.95, 0.0);
        assert!(target.length() > 5.0);
        assert!(!in_line(Vec3::ZERO, target, Vec3::Y, 5.0, 2.0));
    }

    #[test]
    fn test_line_projectile_uses_half_radius_as_half_width() {
        // Effect radius 4: targets may sit 2.0 off the travel line
        let pos = Vec3::new(1.0, 0.0, 1.0);
        assert!(projectile_hits(HitShape::Line, &PARAMS, 4.0, pos, Vec3::X, Vec3::new(3.0, 2.0, 1.0)));
        assert!(!projectile_hits(HitShape::Line, &PARAMS, 4.0, pos, Vec3::X, Vec3::new(3.0, 2.5, 1.0)));
    }

    #[test]
    fn test_circle_ignores_height_sphere_does_not() {
        let target = Vec3::new(3.0, 0.0, 10.0);
        assert!(in_circle(Vec3::ZERO, target, 3.0));
        assert!(!in_sphere(Vec3::ZERO, target, 3.0));
    }

    #[test]
    fn test_projectile_dispatch() {
        let pos = Vec3::ZERO;
        let target = Vec3::new(4.0, 0.0, 0.0);
        assert!(projectile_hits(HitShape::Cone, &PARAMS, 5.0, pos, Vec3::X, target));
        assert!(projectile_hits(HitShape::Line, &PARAMS, 5.0, pos, Vec3::X, target));
        // Point shapes only reach 0.5 + 1.0 regardless of effect radius
        for shape in [HitShape::SingleTarget, HitShape::Circle, HitShape::Sphere, HitShape::Unspecified] {
            assert!(!projectile_hits(shape, &PARAMS, 5.0, pos, Vec3::X, target));
            assert!(projectile_hits(shape, &PARAMS, 5.0, pos, Vec3::X, Vec3::new(1.5, 0.0, 0.0)));
        }
    }
}
