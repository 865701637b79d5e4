//! Physics bodies and their handles
//!
//! Bodies live in the [`PhysicsWorld`](super::world::PhysicsWorld) arena.
//! Outside code only ever holds a [`BodyHandle`], a generational key that
//! goes stale the moment its body is removed and is never handed out again.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collider::Collider;

slotmap::new_key_type! {
    /// Non-owning handle to a body in a [`PhysicsWorld`](super::world::PhysicsWorld).
    pub struct BodyHandle;
}

static_assertions::assert_impl_all!(BodyHandle: Copy, Eq, std::hash::Hash, Send, Sync);

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyKind {
    /// Immovable (walls, terrain). Never integrated, never pushed.
    Static,
    /// Moved by forces and by overlap correction.
    #[default]
    Dynamic,
    /// Integrated from its own velocity but never pushed by overlap correction.
    Kinematic,
}

/// Surface properties of a body.
///
/// Tracked for gameplay code but not consumed by the overlap resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    pub friction: f32,
    /// Bounciness
    pub restitution: f32,
    pub density: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.0,
            density: 1.0,
        }
    }
}

/// Callback receiving the handle of the other body in a contact.
pub type CollisionCallback = Box<dyn FnMut(BodyHandle)>;

/// Per-body contact callbacks.
///
/// Only `on_enter` is ever invoked, once per detected pair per tick.
/// `on_stay` and `on_exit` are accepted and stored but the world does not
/// track contact persistence, so they never fire.
#[derive(Default)]
pub struct CollisionHooks {
    pub on_enter: Option<CollisionCallback>,
    pub on_stay: Option<CollisionCallback>,
    pub on_exit: Option<CollisionCallback>,
}

impl std::fmt::Debug for CollisionHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionHooks")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_stay", &self.on_stay.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

/// A simulated body.
#[derive(Debug)]
pub struct Body {
    /// Position in world space (meters)
    pub position: Vec3,
    /// Velocity (m/s)
    pub velocity: Vec3,
    /// Acceleration computed on the last tick (m/s²)
    pub acceleration: Vec3,
    /// Force accumulated since the last tick (N), zeroed after use
    pub force: Vec3,
    /// Mass (kg), 0 for immovable bodies
    pub mass: f32,
    /// 1 / mass, exactly 0 when the body must never move under integration
    pub inverse_mass: f32,
    /// Fraction of velocity lost per second
    pub linear_damping: f32,
    pub kind: BodyKind,
    pub material: PhysicsMaterial,
    pub collider: Collider,
    pub is_trigger: bool,
    pub active: bool,
    pub(crate) hooks: CollisionHooks,
}

impl Body {
    /// Create a dynamic body with a sphere collider centered on `position`.
    pub fn new(position: Vec3, mass: f32, collider_radius: f32, linear_damping: f32) -> Self {
        let mut body = Self {
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            force: Vec3::ZERO,
            mass: 0.0,
            inverse_mass: 0.0,
            linear_damping,
            kind: BodyKind::Dynamic,
            material: PhysicsMaterial::default(),
            collider: Collider::sphere(position, collider_radius),
            is_trigger: false,
            active: true,
            hooks: CollisionHooks::default(),
        };
        body.set_mass(mass);
        body
    }

    /// Set mass and derive inverse mass. Non-positive (or NaN) mass makes the
    /// body immovable.
    pub fn set_mass(&mut self, mass: f32) {
        if mass > 0.0 && mass.is_finite() {
            self.mass = mass;
            self.inverse_mass = 1.0 / mass;
        } else {
            self.mass = 0.0;
            self.inverse_mass = 0.0;
        }
    }

    /// True for [`BodyKind::Static`].
    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    /// True for [`BodyKind::Dynamic`].
    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// Whether the integrator should touch this body this tick.
    pub fn is_integrated(&self) -> bool {
        self.active && !self.is_static() && self.inverse_mass > 0.0
    }
}
