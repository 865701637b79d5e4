//! Collision detection module
//!
//! Pair finding and overlap correction for registered bodies, plus the
//! ray-sphere test used by the query layer.
//!
//! # Pair Finding
//!
//! With [`BroadPhase::AllPairs`](super::config::BroadPhase) every active pair
//! is tested in registration order. With `BroadPhase::Grid` only pairs that
//! share a spatial grid cell are tested; the surviving pairs are still
//! reported in registration order so callback order does not depend on the
//! strategy.
//!
//! # Overlap Correction
//!
//! A colliding pair is pushed apart along the line between the two body
//! positions until they are `min_separation` apart. The correction is split
//! evenly between the pair and only dynamic bodies move. The split ignores
//! mass.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use slotmap::SlotMap;

use super::body::{Body, BodyHandle};
use super::grid::SpatialGrid;

/// Two bodies whose colliders overlapped during a tick.
///
/// `a` was registered before `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Contact {
    pub a: BodyHandle,
    pub b: BodyHandle,
}

/// Ray-sphere intersection.
///
/// `ray_dir` must be normalized. Returns the distance to the entry point if
/// it lies strictly in front of the origin. Spheres behind the origin, or
/// containing it, are not hit.
pub fn ray_sphere_intersect(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - ray_origin;
    let projection = to_center.dot(ray_dir);
    if projection < 0.0 {
        return None;
    }

    // Squared distance from the sphere center to the ray line
    let closest_sq = to_center.length_squared() - projection * projection;
    let radius_sq = radius * radius;
    if closest_sq > radius_sq {
        return None;
    }

    let half_chord = (radius_sq - closest_sq).max(0.0).sqrt();
    let t = projection - half_chord;
    (t > 0.0).then_some(t)
}

/// Correction to add to body A (and subtract from body B) so that their
/// positions end up `min_separation` apart.
///
/// Returns `None` when they are already far enough apart, or exactly
/// coincident (no direction to push along).
pub fn separation_correction(pos_a: Vec3, pos_b: Vec3, min_separation: f32) -> Option<Vec3> {
    let separation = pos_a - pos_b;
    let distance = separation.length();
    if distance <= 0.0 {
        return None;
    }
    let overlap = min_separation - distance;
    if overlap <= 0.0 {
        return None;
    }
    Some(separation / distance * (overlap * 0.5))
}

/// Test every active pair in registration order.
pub(crate) fn all_pairs(order: &[BodyHandle], bodies: &SlotMap<BodyHandle, Body>) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for (i, &a) in order.iter().enumerate() {
        let Some(body_a) = bodies.get(a).filter(|b| b.active) else {
            continue;
        };
        for &b in &order[i + 1..] {
            let Some(body_b) = bodies.get(b).filter(|b| b.active) else {
                continue;
            };
            if body_a.collider.intersects(&body_b.collider) {
                contacts.push(Contact { a, b });
            }
        }
    }
    contacts
}

/// Test only pairs sharing a grid cell. `grid` must reflect current positions.
pub(crate) fn grid_pairs(
    order: &[BodyHandle],
    bodies: &SlotMap<BodyHandle, Body>,
    grid: &SpatialGrid,
) -> Vec<Contact> {
    let rank: HashMap<BodyHandle, usize> = order.iter().enumerate().map(|(i, &h)| (h, i)).collect();

    let mut candidates: HashSet<(usize, usize)> = HashSet::new();
    for cell in grid.occupied_cells() {
        for (i, &x) in cell.iter().enumerate() {
            for &y in &cell[i + 1..] {
                let (Some(&rx), Some(&ry)) = (rank.get(&x), rank.get(&y)) else {
                    continue;
                };
                if rx != ry {
                    candidates.insert((rx.min(ry), rx.max(ry)));
                }
            }
        }
    }

    let mut sorted: Vec<(usize, usize)> = candidates.into_iter().collect();
    sorted.sort_unstable();

    sorted
        .into_iter()
        .filter_map(|(ra, rb)| {
            let (a, b) = (order[ra], order[rb]);
            let body_a = bodies.get(a).filter(|b| b.active)?;
            let body_b = bodies.get(b).filter(|b| b.active)?;
            body_a
                .collider
                .intersects(&body_b.collider)
                .then_some(Contact { a, b })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collider::Collider;

    fn body_at(pos: Vec3) -> Body {
        Body::new(pos, 1.0, 1.0, 0.0)
    }

    #[test]
    fn test_ray_sphere_hit_distance() {
        let t = ray_sphere_intersect(Vec3::ZERO, Vec3::X, Vec3::new(10.0, 0.0, 0.0), 1.0);
        assert!((t.unwrap() - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_sphere_miss_and_behind() {
        assert!(ray_sphere_intersect(Vec3::ZERO, Vec3::X, Vec3::new(10.0, 5.0, 0.0), 1.0).is_none());
        assert!(ray_sphere_intersect(Vec3::ZERO, Vec3::X, Vec3::new(-10.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_ray_from_inside_sphere_does_not_hit() {
        assert!(ray_sphere_intersect(Vec3::ZERO, Vec3::X, Vec3::new(0.5, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_separation_correction_halves_overlap() {
        let c = separation_correction(Vec3::new(0.4, 0.0, 0.0), Vec3::ZERO, 1.0).unwrap();
        assert!((c - Vec3::new(0.3, 0.0, 0.0)).length() < 1e-6);
        assert!(separation_correction(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, 1.0).is_none());
        assert!(separation_correction(Vec3::ZERO, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_all_pairs_registration_order() {
        let mut bodies: SlotMap<BodyHandle, Body> = SlotMap::with_key();
        let a = bodies.insert(body_at(Vec3::ZERO));
        let b = bodies.insert(body_at(Vec3::new(1.5, 0.0, 0.0)));
        let c = bodies.insert(body_at(Vec3::new(50.0, 0.0, 0.0)));
        let order = vec![b, a, c];

        let contacts = all_pairs(&order, &bodies);
        assert_eq!(contacts, vec![Contact { a: b, b: a }]);
    }

    #[test]
    fn test_inactive_bodies_skipped() {
        let mut bodies: SlotMap<BodyHandle, Body> = SlotMap::with_key();
        let a = bodies.insert(body_at(Vec3::ZERO));
        let mut sleeping = body_at(Vec3::new(0.5, 0.0, 0.0));
        sleeping.active = false;
        let b = bodies.insert(sleeping);

        assert!(all_pairs(&[a, b], &bodies).is_empty());
    }

    #[test]
    fn test_grid_pairs_matches_all_pairs_when_sharing_cells() {
        let mut bodies: SlotMap<BodyHandle, Body> = SlotMap::with_key();
        let mut grid = SpatialGrid::new(10.0, Vec3::splat(100.0));
        let positions = [Vec3::splat(5.0), Vec3::new(6.0, 5.0, 5.0), Vec3::splat(55.0)];
        let mut order = Vec::new();
        for p in positions {
            let h = bodies.insert(body_at(p));
            grid.insert(h, p, 1.0);
            order.push(h);
        }
        // A big box far from the others' cells only meets them through all-pairs.
        let wall = bodies.insert(Body {
            collider: Collider::aabb(Vec3::splat(0.0), Vec3::splat(90.0)),
            ..body_at(Vec3::splat(80.0))
        });
        grid.insert(wall, Vec3::splat(80.0), 1.0);
        order.push(wall);

        let by_grid = grid_pairs(&order, &bodies, &grid);
        assert_eq!(by_grid, vec![Contact { a: order[0], b: order[1] }]);
        assert_eq!(all_pairs(&order, &bodies).len(), 4);
    }
}
