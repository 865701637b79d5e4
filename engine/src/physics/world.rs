//! Physics world: body registry, integrator and overlap resolver
//!
//! Owns every [`Body`] and the [`SpatialGrid`]. One call to
//! [`PhysicsWorld::tick`] runs a full step:
//!
//! 1. integrate every active, non-static body (gravity, damping, clamp)
//! 2. find overlapping pairs and fire `on_enter` hooks
//! 3. push overlapping pairs apart
//! 4. rebuild the spatial grid
//!
//! # Example
//!
//! ```ignore
//! use skirmish_engine::physics::{PhysicsWorld, PhysicsConfig, Collider, BodyKind, Vec3};
//!
//! let mut world = PhysicsWorld::new(PhysicsConfig::default());
//! let floor = world.create_body(Vec3::ZERO, 0.0);
//! world.set_body_kind(floor, BodyKind::Static);
//! world.set_collider(floor, Collider::cuboid(Vec3::new(50.0, 50.0, 0.5)));
//!
//! let crate_body = world.create_body(Vec3::new(0.0, 0.0, 10.0), 5.0);
//! for _ in 0..60 {
//!     world.tick(1.0 / 60.0);
//! }
//! ```

use glam::Vec3;
use slotmap::SlotMap;
use tracing::{debug, trace, warn};

use super::body::{Body, BodyHandle, BodyKind, CollisionCallback, CollisionHooks, PhysicsMaterial};
use super::collider::Collider;
use super::collision::{self, Contact};
use super::config::{BroadPhase, PhysicsConfig};
use super::error::PhysicsResult;
use super::grid::{CellIndex, SpatialGrid};
use super::types::UP;

/// Registry and simulation loop for all physics bodies.
pub struct PhysicsWorld {
    pub(crate) bodies: SlotMap<BodyHandle, Body>,
    /// Registration order, used for deterministic pair and query order.
    pub(crate) order: Vec<BodyHandle>,
    grid: SpatialGrid,
    config: PhysicsConfig,
    contacts: Vec<Contact>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl PhysicsWorld {
    /// Create an empty world.
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            order: Vec::new(),
            grid: SpatialGrid::new(config.cell_size, config.world_bounds),
            config,
            contacts: Vec::new(),
        }
    }

    /// Create a world from a validated config.
    pub fn try_new(config: PhysicsConfig) -> PhysicsResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    // =========================================================================
    // Body management
    // =========================================================================

    /// Register a dynamic body with the default sphere collider.
    ///
    /// A non-positive `mass` makes the body immovable (inverse mass 0).
    pub fn create_body(&mut self, position: Vec3, mass: f32) -> BodyHandle {
        let body = Body::new(
            position,
            mass,
            self.config.default_collider_radius,
            self.config.default_linear_damping,
        );
        let handle = self.bodies.insert(body);
        self.order.push(handle);
        self.grid.insert(handle, position, self.config.grid_probe_radius);
        debug!(?handle, ?position, mass, "body created");
        handle
    }

    /// Remove a body. The handle is stale from now on.
    ///
    /// Returns `false` if the handle was already stale.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        if self.bodies.remove(handle).is_none() {
            warn!(?handle, "remove_body on stale handle ignored");
            return false;
        }
        self.order.retain(|&h| h != handle);
        self.contacts.retain(|c| c.a != handle && c.b != handle);
        self.rebuild_grid();
        debug!(?handle, "body removed");
        true
    }

    /// Remove every body. All outstanding handles become stale.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.order.clear();
        self.contacts.clear();
        self.grid.clear();
        debug!("all bodies cleared");
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// Read-only access to a body.
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|b| b.position)
    }

    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|b| b.velocity)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Handles in registration order.
    pub fn handles(&self) -> &[BodyHandle] {
        &self.order
    }

    // =========================================================================
    // Body mutation (stale handles are ignored)
    // =========================================================================

    /// Replace a body's collider and center it on the body.
    pub fn set_collider(&mut self, handle: BodyHandle, mut collider: Collider) {
        self.with_body(handle, "set_collider", |body| {
            collider.recenter(body.position);
            body.collider = collider;
        });
    }

    /// Change a body's kind. Becoming static clears all motion state.
    pub fn set_body_kind(&mut self, handle: BodyHandle, kind: BodyKind) {
        self.with_body(handle, "set_body_kind", |body| {
            body.kind = kind;
            if kind == BodyKind::Static {
                body.velocity = Vec3::ZERO;
                body.acceleration = Vec3::ZERO;
                body.force = Vec3::ZERO;
            }
        });
    }

    pub fn set_body_mass(&mut self, handle: BodyHandle, mass: f32) {
        self.with_body(handle, "set_body_mass", |body| body.set_mass(mass));
    }

    /// Teleport a body, moving its collider with it.
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec3) {
        self.with_body(handle, "set_position", |body| {
            body.position = position;
            body.collider.recenter(position);
        });
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        self.with_body(handle, "set_velocity", |body| {
            if !body.is_static() {
                body.velocity = velocity;
            }
        });
    }

    pub fn set_linear_damping(&mut self, handle: BodyHandle, damping: f32) {
        self.with_body(handle, "set_linear_damping", |body| {
            body.linear_damping = damping.max(0.0);
        });
    }

    pub fn set_material(&mut self, handle: BodyHandle, material: PhysicsMaterial) {
        self.with_body(handle, "set_material", |body| body.material = material);
    }

    /// Inactive bodies are skipped by integration, detection and queries.
    pub fn set_active(&mut self, handle: BodyHandle, active: bool) {
        self.with_body(handle, "set_active", |body| body.active = active);
    }

    /// Mark a body as a trigger volume. The flag is tracked for callers;
    /// detection and resolution treat triggers like any other body.
    pub fn set_trigger(&mut self, handle: BodyHandle, is_trigger: bool) {
        self.with_body(handle, "set_trigger", |body| body.is_trigger = is_trigger);
    }

    /// Install the callback fired when this body overlaps another.
    pub fn set_on_collision_enter(&mut self, handle: BodyHandle, callback: CollisionCallback) {
        self.with_body(handle, "set_on_collision_enter", |body| {
            body.hooks.on_enter = Some(callback);
        });
    }

    /// Install all contact hooks at once. See [`CollisionHooks`] for which fire.
    pub fn set_collision_hooks(&mut self, handle: BodyHandle, hooks: CollisionHooks) {
        self.with_body(handle, "set_collision_hooks", |body| body.hooks = hooks);
    }

    /// Accumulate a force consumed by the next tick.
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec3) {
        self.with_body(handle, "apply_force", |body| {
            if !body.is_static() {
                body.force += force;
            }
        });
    }

    /// Instant velocity change: `v += impulse / mass`.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        self.with_body(handle, "apply_impulse", |body| {
            if !body.is_static() {
                body.velocity += impulse * body.inverse_mass;
            }
        });
    }

    fn with_body(&mut self, handle: BodyHandle, op: &'static str, f: impl FnOnce(&mut Body)) {
        match self.bodies.get_mut(handle) {
            Some(body) => f(body),
            None => warn!(?handle, op, "operation on stale body handle ignored"),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Gravity along the up axis (negative pulls down).
    pub fn set_gravity(&mut self, gravity: f32) {
        self.config.gravity = gravity;
    }

    /// Velocity cap. Non-positive values are ignored.
    pub fn set_max_velocity(&mut self, max_velocity: f32) {
        if max_velocity > 0.0 {
            self.config.max_velocity = max_velocity;
        } else {
            warn!(max_velocity, "ignoring non-positive max velocity");
        }
    }

    pub fn set_broad_phase(&mut self, broad_phase: BroadPhase) {
        self.config.broad_phase = broad_phase;
    }

    /// Resize the spatial grid and repopulate it.
    ///
    /// Ignored when the cell size is not positive, a bound is not finite,
    /// or the grid would exceed [`MAX_GRID_CELLS`](super::grid::MAX_GRID_CELLS) cells.
    pub fn set_grid_parameters(&mut self, cell_size: f32, bounds: Vec3) {
        if SpatialGrid::dimensions_for(cell_size, bounds).is_none() {
            warn!(cell_size, ?bounds, "ignoring unusable grid parameters");
            return;
        }
        self.config.cell_size = cell_size;
        self.config.world_bounds = bounds;
        self.grid = SpatialGrid::new(cell_size, bounds);
        self.rebuild_grid();
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Grid cell a position falls into (clamped).
    pub fn cell_of(&self, position: Vec3) -> CellIndex {
        self.grid.cell_of(position)
    }

    /// Pairs found overlapping during the last tick, in registration order.
    pub fn collision_events(&self) -> &[Contact] {
        &self.contacts
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance the simulation by `dt` seconds.
    ///
    /// `dt <= 0` (or non-finite) changes no body state.
    pub fn tick(&mut self, dt: f32) {
        if !(dt > 0.0) || !dt.is_finite() {
            if dt != 0.0 {
                warn!(dt, "ignoring invalid physics time step");
            }
            return;
        }

        self.integrate(dt);

        if self.config.broad_phase == BroadPhase::Grid {
            self.rebuild_grid();
        }
        self.detect_collisions();
        self.resolve_collisions();
        self.rebuild_grid();
    }

    fn integrate(&mut self, dt: f32) {
        let config = self.config;
        for &handle in &self.order {
            let Some(body) = self.bodies.get_mut(handle) else {
                continue;
            };
            if !body.is_integrated() {
                continue;
            }

            body.force += UP * (config.gravity * body.mass);
            body.acceleration = body.force * body.inverse_mass;

            body.velocity += body.acceleration * dt;
            body.velocity *= (1.0 - body.linear_damping * dt).max(0.0);
            body.position += body.velocity * dt;

            clamp_velocity(body, config.max_velocity, config.velocity_threshold);

            body.force = Vec3::ZERO;
            body.collider.recenter(body.position);
        }
    }

    fn detect_collisions(&mut self) {
        self.contacts = match self.config.broad_phase {
            BroadPhase::AllPairs => collision::all_pairs(&self.order, &self.bodies),
            BroadPhase::Grid => collision::grid_pairs(&self.order, &self.bodies, &self.grid),
        };

        for contact in &self.contacts {
            trace!(a = ?contact.a, b = ?contact.b, "contact");
            if let Some(callback) = self.bodies.get_mut(contact.a).and_then(|b| b.hooks.on_enter.as_mut()) {
                callback(contact.b);
            }
            if let Some(callback) = self.bodies.get_mut(contact.b).and_then(|b| b.hooks.on_enter.as_mut()) {
                callback(contact.a);
            }
        }
    }

    fn resolve_collisions(&mut self) {
        let min_separation = self.config.min_separation;
        for contact in &self.contacts {
            let (Some(a), Some(b)) = (self.bodies.get(contact.a), self.bodies.get(contact.b)) else {
                continue;
            };
            // Massless dynamic bodies are immovable too
            let (move_a, move_b) = (
                a.is_dynamic() && a.inverse_mass > 0.0,
                b.is_dynamic() && b.inverse_mass > 0.0,
            );
            if !move_a && !move_b {
                continue;
            }
            let Some(correction) = collision::separation_correction(a.position, b.position, min_separation) else {
                continue;
            };

            if move_a {
                if let Some(body) = self.bodies.get_mut(contact.a) {
                    body.position += correction;
                    body.collider.recenter(body.position);
                }
            }
            if move_b {
                if let Some(body) = self.bodies.get_mut(contact.b) {
                    body.position -= correction;
                    body.collider.recenter(body.position);
                }
            }
        }
    }

    fn rebuild_grid(&mut self) {
        self.grid.clear();
        let probe = self.config.grid_probe_radius;
        for &handle in &self.order {
            if let Some(body) = self.bodies.get(handle).filter(|b| b.active) {
                self.grid.insert(handle, body.position, probe);
            }
        }
    }
}

/// Cap speed at `max_velocity`; speeds under `threshold` become exactly zero.
fn clamp_velocity(body: &mut Body, max_velocity: f32, threshold: f32) {
    let speed = body.velocity.length();
    if speed > max_velocity {
        body.velocity = body.velocity / speed * max_velocity;
    } else if speed < threshold {
        body.velocity = Vec3::ZERO;
    }
}
