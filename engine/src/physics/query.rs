//! Spatial queries over the physics world
//!
//! Radius, box and point lookups plus raycasting and line of sight. Every
//! query visits active bodies in registration order and reports results in
//! that order.
//!
//! # Raycast order
//!
//! [`PhysicsWorld::raycast`] returns the *first registered* body whose
//! bounding sphere the ray enters within range, not the nearest one. Use
//! [`PhysicsWorld::raycast_all`] and pick the minimum distance when the
//! nearest hit matters.

use glam::Vec3;

use super::body::{Body, BodyHandle};
use super::collision::ray_sphere_intersect;
use super::types::DIRECTION_EPSILON;
use super::world::PhysicsWorld;

/// Result of a successful raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Body that was hit
    pub handle: BodyHandle,
    /// Entry point on the body's bounding sphere
    pub point: Vec3,
    /// Distance from the ray origin to `point`
    pub distance: f32,
}

impl PhysicsWorld {
    fn active_bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.order
            .iter()
            .filter_map(|&h| self.bodies.get(h).filter(|b| b.active).map(|b| (h, b)))
    }

    /// Active bodies whose position lies within `radius` of `center` (inclusive).
    pub fn bodies_in_radius(&self, center: Vec3, radius: f32) -> Vec<BodyHandle> {
        self.active_bodies()
            .filter(|(_, body)| body.position.distance(center) <= radius)
            .map(|(h, _)| h)
            .collect()
    }

    /// Active bodies whose position lies inside the box `min..max` (inclusive).
    pub fn bodies_in_aabb(&self, min: Vec3, max: Vec3) -> Vec<BodyHandle> {
        let (lo, hi) = (min.min(max), min.max(max));
        self.active_bodies()
            .filter(|(_, body)| body.position.cmpge(lo).all() && body.position.cmple(hi).all())
            .map(|(h, _)| h)
            .collect()
    }

    /// Active bodies within `tolerance` of `position`.
    pub fn bodies_at_position(&self, position: Vec3, tolerance: f32) -> Vec<BodyHandle> {
        self.bodies_in_radius(position, tolerance)
    }

    /// Whether any active body sits strictly closer than `radius` to `position`.
    pub fn is_position_occupied(&self, position: Vec3, radius: f32) -> bool {
        self.active_bodies()
            .any(|(_, body)| body.position.distance(position) < radius)
    }

    /// First body, in registration order, hit by the ray within `max_distance`.
    ///
    /// Every collider is treated as its bounding sphere. A zero direction
    /// hits nothing.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.ray_hits(origin, direction, max_distance).next()
    }

    /// Every body hit by the ray within `max_distance`, in registration order.
    pub fn raycast_all(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<RayHit> {
        self.ray_hits(origin, direction, max_distance).collect()
    }

    fn ray_hits(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> impl Iterator<Item = RayHit> + '_ {
        let dir = if direction.length_squared() > DIRECTION_EPSILON * DIRECTION_EPSILON {
            Some(direction.normalize())
        } else {
            None
        };

        self.active_bodies().filter_map(move |(handle, body)| {
            let dir = dir?;
            let collider = &body.collider;
            let distance = ray_sphere_intersect(origin, dir, collider.center(), collider.bounding_radius())?;
            (distance <= max_distance).then(|| RayHit {
                handle,
                point: origin + dir * distance,
                distance,
            })
        })
    }

    /// `true` when no active body's bounding sphere crosses the segment
    /// from `start` to `end`. Bodies sitting on either point block too.
    pub fn line_of_sight_between(&self, start: Vec3, end: Vec3) -> bool {
        self.segment_clear(start, end, &[])
    }

    /// `true` when nothing blocks the segment between two bodies.
    ///
    /// The two endpoints themselves never block. Stale handles have no line
    /// of sight.
    pub fn line_of_sight(&self, from: BodyHandle, to: BodyHandle) -> bool {
        if from == to {
            return self.contains(from);
        }
        let (Some(start), Some(end)) = (self.position(from), self.position(to)) else {
            return false;
        };
        self.segment_clear(start, end, &[from, to])
    }

    fn segment_clear(&self, start: Vec3, end: Vec3, ignore: &[BodyHandle]) -> bool {
        let delta = end - start;
        let distance = delta.length();
        if distance <= DIRECTION_EPSILON {
            return true;
        }
        !self
            .ray_hits(start, delta, distance)
            .any(|hit| !ignore.contains(&hit.handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collider::Collider;
    use crate::physics::config::PhysicsConfig;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(PhysicsConfig::zero_gravity())
    }

    #[test]
    fn test_bodies_in_radius_inclusive() {
        let mut w = world();
        let a = w.create_body(Vec3::ZERO, 1.0);
        let b = w.create_body(Vec3::new(5.0, 0.0, 0.0), 1.0);
        w.create_body(Vec3::new(5.1, 0.0, 0.0), 1.0);
        assert_eq!(w.bodies_in_radius(Vec3::ZERO, 5.0), vec![a, b]);
    }

    #[test]
    fn test_inactive_bodies_invisible_to_queries() {
        let mut w = world();
        let a = w.create_body(Vec3::ZERO, 1.0);
        w.set_active(a, false);
        assert!(w.bodies_in_radius(Vec3::ZERO, 10.0).is_empty());
        assert!(!w.is_position_occupied(Vec3::ZERO, 1.0));
        assert!(w.raycast(Vec3::new(-5.0, 0.0, 0.0), Vec3::X, 100.0).is_none());
    }

    #[test]
    fn test_bodies_in_aabb() {
        let mut w = world();
        let inside = w.create_body(Vec3::new(1.0, 1.0, 1.0), 1.0);
        w.create_body(Vec3::new(3.0, 1.0, 1.0), 1.0);
        assert_eq!(w.bodies_in_aabb(Vec3::splat(2.0), Vec3::ZERO), vec![inside]);
    }

    #[test]
    fn test_position_occupied_is_strict() {
        let mut w = world();
        w.create_body(Vec3::ZERO, 1.0);
        assert!(w.is_position_occupied(Vec3::new(0.5, 0.0, 0.0), 1.0));
        assert!(!w.is_position_occupied(Vec3::new(1.0, 0.0, 0.0), 1.0));
        assert_eq!(w.bodies_at_position(Vec3::new(1.0, 0.0, 0.0), 1.0).len(), 1);
    }

    #[test]
    fn test_raycast_hit_point() {
        let mut w = world();
        let target = w.create_body(Vec3::new(10.0, 0.0, 0.0), 1.0);
        let hit = w.raycast(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 50.0).expect("ray hits");
        assert_eq!(hit.handle, target);
        assert!((hit.distance - 9.0).abs() < 1e-4);
        assert!((hit.point - Vec3::new(9.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_raycast_respects_max_distance() {
        let mut w = world();
        w.create_body(Vec3::new(10.0, 0.0, 0.0), 1.0);
        assert!(w.raycast(Vec3::ZERO, Vec3::X, 8.5).is_none());
        assert!(w.raycast(Vec3::ZERO, Vec3::X, 9.0).is_some());
    }

    #[test]
    fn test_raycast_zero_direction_hits_nothing() {
        let mut w = world();
        w.create_body(Vec3::new(1.5, 0.0, 0.0), 1.0);
        assert!(w.raycast(Vec3::ZERO, Vec3::ZERO, 100.0).is_none());
    }

    #[test]
    fn test_raycast_returns_first_registered_not_nearest() {
        let mut w = world();
        let far = w.create_body(Vec3::new(10.0, 0.0, 0.0), 1.0);
        let near = w.create_body(Vec3::new(9.5, 0.0, 0.0), 1.0);

        let hit = w.raycast(Vec3::ZERO, Vec3::X, 100.0).unwrap();
        assert_eq!(hit.handle, far);

        let all = w.raycast_all(Vec3::ZERO, Vec3::X, 100.0);
        assert_eq!(all.len(), 2);
        let nearest = all
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .unwrap();
        assert_eq!(nearest.handle, near);
    }

    #[test]
    fn test_raycast_uses_bounding_sphere_for_boxes() {
        let mut w = world();
        let crate_box = w.create_body(Vec3::new(10.0, 0.0, 0.0), 1.0);
        w.set_collider(crate_box, Collider::cuboid(Vec3::splat(1.0)));
        // Passes above the box face but inside its bounding sphere (radius sqrt(3))
        let hit = w.raycast(Vec3::new(0.0, 0.0, 1.5), Vec3::X, 100.0);
        assert_eq!(hit.map(|h| h.handle), Some(crate_box));
    }

    #[test]
    fn test_line_of_sight() {
        let mut w = world();
        let a = w.create_body(Vec3::ZERO, 1.0);
        let b = w.create_body(Vec3::new(20.0, 0.0, 0.0), 1.0);
        assert!(w.line_of_sight(a, b));
        assert!(w.line_of_sight(a, a));

        let wall = w.create_body(Vec3::new(10.0, 0.0, 0.0), 0.0);
        assert!(!w.line_of_sight(a, b));
        assert!(!w.line_of_sight(b, a));

        w.set_active(wall, false);
        assert!(w.line_of_sight(a, b));

        w.remove_body(b);
        assert!(!w.line_of_sight(a, b));
    }

    #[test]
    fn test_line_of_sight_between_points() {
        let mut w = world();
        let wall = w.create_body(Vec3::new(10.0, 0.0, 0.0), 0.0);
        let start = Vec3::new(0.0, 0.0, 0.0);

        assert!(!w.line_of_sight_between(start, Vec3::new(20.0, 0.0, 0.0)));
        // Stops short of the wall's sphere
        assert!(w.line_of_sight_between(start, Vec3::new(8.5, 0.0, 0.0)));
        assert!(w.line_of_sight_between(start, Vec3::new(0.0, 20.0, 0.0)));

        w.remove_body(wall);
        assert!(w.line_of_sight_between(start, Vec3::new(20.0, 0.0, 0.0)));
    }
}
