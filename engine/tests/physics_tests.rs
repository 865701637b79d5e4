//! Physics Tests - Integration, Collision Boundaries, Queries
//!
//! Exercises the physics world through its public API only: body
//! registration, the tick loop, overlap resolution, the spatial grid and
//! the query layer.

use std::cell::RefCell;
use std::rc::Rc;

use skirmish_engine::physics::{
    BodyKind, BroadPhase, Collider, PhysicsConfig, PhysicsWorld, Vec3,
};

fn world() -> PhysicsWorld {
    PhysicsWorld::new(PhysicsConfig::default())
}

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

// ============================================================================
// Integration
// ============================================================================

#[test]
fn test_massless_bodies_never_move() {
    let mut world = world();
    let zero = world.create_body(Vec3::new(5.0, 5.0, 5.0), 0.0);
    let negative = world.create_body(Vec3::new(20.0, 5.0, 5.0), -3.0);
    // Overlaps `zero` and gets pushed away alone
    world.create_body(Vec3::new(5.5, 5.0, 5.0), 1.0);
    world.apply_force(zero, Vec3::new(100.0, 0.0, 0.0));

    for handle in [zero, negative] {
        assert_eq!(world.body(handle).unwrap().inverse_mass, 0.0);
    }
    for _ in 0..30 {
        world.tick(1.0 / 60.0);
    }
    assert_eq!(world.position(zero), Some(Vec3::new(5.0, 5.0, 5.0)));
    assert_eq!(world.velocity(zero), Some(Vec3::ZERO));
    assert_eq!(world.position(negative), Some(Vec3::new(20.0, 5.0, 5.0)));
    assert_eq!(world.velocity(negative), Some(Vec3::ZERO));
}

#[test]
fn test_velocity_clamped_to_max_keeps_direction() {
    let mut world = PhysicsWorld::new(PhysicsConfig::zero_gravity());
    let handle = world.create_body(Vec3::new(50.0, 50.0, 10.0), 1.0);
    world.set_linear_damping(handle, 0.0);
    let direction = Vec3::new(3.0, 4.0, 0.0).normalize();
    world.set_velocity(handle, direction * 400.0);

    world.tick(1.0 / 60.0);

    let velocity = world.velocity(handle).unwrap();
    assert!((velocity.length() - world.config().max_velocity).abs() < 1e-3);
    assert!(approx(velocity.normalize(), direction));
}

#[test]
fn test_zero_tick_is_identity() {
    let mut world = world();
    let a = world.create_body(Vec3::new(10.0, 10.0, 3.0), 2.0);
    let b = world.create_body(Vec3::new(10.5, 10.0, 3.0), 1.0);
    world.set_velocity(a, Vec3::new(1.0, 2.0, 3.0));
    world.set_velocity(b, Vec3::new(-1.0, 0.0, 0.0));
    let before: Vec<_> = [a, b]
        .iter()
        .map(|&h| (world.position(h), world.velocity(h)))
        .collect();

    world.tick(0.0);

    let after: Vec<_> = [a, b]
        .iter()
        .map(|&h| (world.position(h), world.velocity(h)))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_fixed_dt_is_deterministic() {
    let run = || {
        let mut world = world();
        let a = world.create_body(Vec3::new(10.0, 10.0, 8.0), 1.0);
        let b = world.create_body(Vec3::new(10.8, 10.2, 8.0), 3.0);
        world.set_velocity(a, Vec3::new(4.0, 0.0, 2.0));
        for _ in 0..90 {
            world.tick(1.0 / 60.0);
        }
        (world.position(a), world.position(b))
    };
    assert_eq!(run(), run());
}

// ============================================================================
// Collision
// ============================================================================

#[test]
fn test_sphere_boundary_is_strict() {
    let a = Collider::sphere(Vec3::ZERO, 1.0);
    assert!(a.intersects(&Collider::sphere(Vec3::new(1.9, 0.0, 0.0), 1.0)));
    assert!(!a.intersects(&Collider::sphere(Vec3::new(2.0, 0.0, 0.0), 1.0)));
}

#[test]
fn test_box_collisions_are_strict() {
    let unit = Collider::aabb(Vec3::ZERO, Vec3::ONE);
    assert!(unit.intersects(&Collider::aabb(Vec3::splat(0.5), Vec3::splat(1.5))));
    // Shared face
    assert!(!unit.intersects(&Collider::aabb(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0))));
    // Sphere just touching the face
    assert!(!unit.intersects(&Collider::sphere(Vec3::new(1.5, 0.5, 0.5), 0.5)));
    assert!(unit.intersects(&Collider::sphere(Vec3::new(1.4, 0.5, 0.5), 0.5)));
}

#[test]
fn test_enter_callback_fires_for_both_bodies() {
    let mut world = PhysicsWorld::new(PhysicsConfig::zero_gravity());
    let a = world.create_body(Vec3::new(10.0, 10.0, 5.0), 1.0);
    let b = world.create_body(Vec3::new(11.0, 10.0, 5.0), 1.0);
    let seen = Rc::new(RefCell::new(Vec::new()));

    for (handle, label) in [(a, 'a'), (b, 'b')] {
        let seen = Rc::clone(&seen);
        world.set_on_collision_enter(handle, Box::new(move |other| seen.borrow_mut().push((label, other))));
    }
    world.tick(1.0 / 60.0);

    let seen = seen.borrow();
    assert!(seen.contains(&('a', b)));
    assert!(seen.contains(&('b', a)));
    assert_eq!(world.collision_events().len(), 1);
}

#[test]
fn test_static_body_never_pushed() {
    let mut world = PhysicsWorld::new(PhysicsConfig::zero_gravity());
    let wall = world.create_body(Vec3::new(10.0, 10.0, 5.0), 1.0);
    world.set_body_kind(wall, BodyKind::Static);
    let ball = world.create_body(Vec3::new(10.5, 10.0, 5.0), 1.0);

    world.tick(1.0 / 60.0);

    assert_eq!(world.position(wall), Some(Vec3::new(10.0, 10.0, 5.0)));
    assert!(world.position(ball).unwrap().x > 10.5);
}

#[test]
fn test_grid_broad_phase_matches_all_pairs() {
    let positions = [
        Vec3::new(5.0, 5.0, 5.0),
        Vec3::new(5.8, 5.0, 5.0),
        Vec3::new(40.0, 40.0, 5.0),
        Vec3::new(40.5, 40.5, 5.0),
        Vec3::new(9.5, 5.0, 5.0),
        Vec3::new(10.5, 5.0, 5.0),
    ];
    let run = |broad_phase| {
        let mut world = PhysicsWorld::new(PhysicsConfig {
            broad_phase,
            ..PhysicsConfig::zero_gravity()
        });
        let handles: Vec<_> = positions.iter().map(|&p| world.create_body(p, 1.0)).collect();
        world.tick(1.0 / 60.0);
        handles.iter().map(|&h| world.position(h).unwrap()).collect::<Vec<_>>()
    };
    let all_pairs = run(BroadPhase::AllPairs);
    let grid = run(BroadPhase::Grid);
    for (a, b) in all_pairs.iter().zip(&grid) {
        assert!(approx(*a, *b), "{a} != {b}");
    }
}

#[test]
fn test_out_of_bounds_positions_clamp_to_grid() {
    let mut world = world();
    let far = world.create_body(Vec3::new(-500.0, 10_000.0, 3.0), 1.0);
    world.tick(1.0 / 60.0);

    let [nx, ny, nz] = world.grid().dimensions();
    let cell = world.cell_of(world.position(far).unwrap());
    assert!(cell[0] < nx && cell[1] < ny && cell[2] < nz);
    assert_eq!(cell[0], 0);
    assert_eq!(cell[1], ny - 1);
}

#[test]
fn test_unusable_grid_parameters_are_ignored() {
    let mut world = world();
    world.create_body(Vec3::new(10.0, 10.0, 5.0), 1.0);
    let before = world.grid().dimensions();

    world.set_grid_parameters(1.0, Vec3::new(f32::INFINITY, 10.0, 10.0));
    world.set_grid_parameters(1e-3, Vec3::splat(1e5));
    world.tick(1.0 / 60.0);

    assert_eq!(world.grid().dimensions(), before);
    assert_eq!(world.config().world_bounds, PhysicsConfig::default().world_bounds);
}

// ============================================================================
// Handles
// ============================================================================

#[test]
fn test_removed_handle_is_inert() {
    let mut world = world();
    let handle = world.create_body(Vec3::new(10.0, 10.0, 5.0), 1.0);
    assert!(world.remove_body(handle));

    world.set_velocity(handle, Vec3::X);
    world.apply_force(handle, Vec3::X);
    world.set_collider(handle, Collider::sphere(Vec3::ZERO, 2.0));
    world.tick(1.0 / 60.0);

    assert!(!world.remove_body(handle));
    assert!(world.position(handle).is_none());
    let replacement = world.create_body(Vec3::new(10.0, 10.0, 5.0), 1.0);
    assert_ne!(handle, replacement);
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_raycast_returns_first_registered_not_nearest() {
    let mut world = PhysicsWorld::new(PhysicsConfig::zero_gravity());
    let far = world.create_body(Vec3::new(10.0, 0.0, 0.0), 0.0);
    let near = world.create_body(Vec3::new(8.5, 0.0, 0.0), 0.0);

    let hit = world.raycast(Vec3::ZERO, Vec3::X, 100.0).unwrap();
    assert_eq!(hit.handle, far);

    let nearest = world
        .raycast_all(Vec3::ZERO, Vec3::X, 100.0)
        .into_iter()
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
        .unwrap();
    assert_eq!(nearest.handle, near);
}

#[test]
fn test_raycast_respects_max_distance() {
    let mut world = world();
    world.create_body(Vec3::new(10.0, 0.0, 0.0), 0.0);
    assert!(world.raycast(Vec3::ZERO, Vec3::X, 5.0).is_none());
    assert!(world.raycast(Vec3::ZERO, -Vec3::X, 100.0).is_none());
    assert!(world.raycast(Vec3::ZERO, Vec3::X, 9.5).is_some());
}

#[test]
fn test_bodies_in_radius_and_line_of_sight() {
    let mut world = world();
    let a = world.create_body(Vec3::new(0.0, 0.0, 0.0), 0.0);
    let b = world.create_body(Vec3::new(20.0, 0.0, 0.0), 0.0);
    let c = world.create_body(Vec3::new(0.0, 20.0, 0.0), 0.0);
    let blocker = world.create_body(Vec3::new(10.0, 0.0, 0.0), 0.0);

    let mut nearby = world.bodies_in_radius(Vec3::new(5.0, 0.0, 0.0), 5.0);
    nearby.sort();
    let mut expected = vec![a, blocker];
    expected.sort();
    assert_eq!(nearby, expected);

    assert!(!world.line_of_sight(a, b));
    assert!(world.line_of_sight(a, c));
    assert!(!world.line_of_sight_between(Vec3::new(0.0, 3.0, 0.0), Vec3::new(20.0, -3.0, 0.0)));
    assert!(world.line_of_sight_between(Vec3::new(0.0, 3.0, 0.0), Vec3::new(20.0, 3.0, 0.0)));

    world.remove_body(blocker);
    assert!(world.line_of_sight(a, b));
}
