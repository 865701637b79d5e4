//! Ballistics simulation for projectile trajectories
//!
//! Projectiles fly independently of the body registry. Each one carries a
//! [`FlightProfile`] fixed at spawn time: a vertical gravity pull and a linear
//! drag coefficient. Integration is explicit Euler (velocity first, then
//! position) so a fixed `dt` reproduces the same trajectory every run.
//!
//! # Example
//!
//! ```ignore
//! use skirmish_engine::physics::ballistics::{FlightProfile, Projectile, ProjectileState};
//! use glam::Vec3;
//!
//! let mut arrow = Projectile::launch(Vec3::new(0.0, 0.0, 2.0), Vec3::X, 20.0, 1.5, FlightProfile::physical());
//! while let ProjectileState::Flying = arrow.advance(1.0 / 60.0, 0.0) {}
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::types::UP;

/// Gravity and drag applied to a projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightProfile {
    /// Downward pull (m/s², positive pulls towards the ground)
    pub gravity: f32,
    /// Linear drag coefficient (1/s): `a -= drag * v`
    pub drag: f32,
}

impl FlightProfile {
    /// No gravity, no drag: straight-line flight.
    pub const NONE: Self = Self {
        gravity: 0.0,
        drag: 0.0,
    };

    /// Arrows, thrown weapons.
    pub fn physical() -> Self {
        Self {
            gravity: 9.8,
            drag: 0.1,
        }
    }

    /// Spell bolts ignore gravity and air.
    pub fn magical() -> Self {
        Self::NONE
    }

    /// Acceleration acting on a projectile moving at `velocity`.
    pub fn acceleration(&self, velocity: Vec3) -> Vec3 {
        let mut acceleration = -UP * self.gravity;
        if self.drag > 0.0 {
            acceleration -= velocity * self.drag;
        }
        acceleration
    }
}

impl Default for FlightProfile {
    fn default() -> Self {
        Self::NONE
    }
}

/// A projectile being simulated through the air.
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    /// Current position in world space (meters)
    pub position: Vec3,
    /// Current velocity vector (meters/second)
    pub velocity: Vec3,
    /// Time alive (seconds), only ever increases
    pub elapsed: f32,
    /// Lifetime after which the projectile expires (seconds)
    pub max_lifetime: f32,
    /// Collision radius used by hit tests (meters)
    pub radius: f32,
    pub profile: FlightProfile,
    /// Whether the projectile is still being simulated
    pub active: bool,
    /// Total path length flown since spawn (meters)
    pub distance_traveled: f32,
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            elapsed: 0.0,
            max_lifetime: 0.0,
            radius: 0.5,
            profile: FlightProfile::NONE,
            active: true,
            distance_traveled: 0.0,
        }
    }
}

impl Projectile {
    /// Launch a projectile from `position` along `direction` (normalized here).
    ///
    /// # Arguments
    /// * `speed` - Initial speed (meters/second)
    /// * `max_lifetime` - Seconds before the projectile expires
    /// * `profile` - Gravity and drag applied each step
    pub fn launch(position: Vec3, direction: Vec3, speed: f32, max_lifetime: f32, profile: FlightProfile) -> Self {
        Self {
            position,
            velocity: direction.normalize_or_zero() * speed,
            max_lifetime,
            profile,
            ..Self::default()
        }
    }

    /// Unit travel direction, zero if the projectile is at rest.
    pub fn direction(&self) -> Vec3 {
        self.velocity.normalize_or_zero()
    }

    /// Advance one time step.
    ///
    /// Expiry is checked before moving: a projectile whose lifetime runs out
    /// this step does not move and reports [`ProjectileState::Expired`].
    /// Crossing `ground_level` while descending reports
    /// [`ProjectileState::GroundImpact`]. Both deactivate the projectile.
    pub fn advance(&mut self, dt: f32, ground_level: f32) -> ProjectileState {
        if !self.active {
            return ProjectileState::Expired;
        }

        self.elapsed += dt;
        if self.elapsed >= self.max_lifetime {
            self.active = false;
            return ProjectileState::Expired;
        }

        self.velocity += self.profile.acceleration(self.velocity) * dt;
        let displacement = self.velocity * dt;
        self.position += displacement;
        self.distance_traveled += displacement.length();

        if self.position.dot(UP) <= ground_level && self.velocity.dot(UP) < 0.0 {
            self.active = false;
            return ProjectileState::GroundImpact {
                position: self.position,
            };
        }

        ProjectileState::Flying
    }
}

/// Outcome of one [`Projectile::advance`] step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ProjectileState {
    /// Still in the air, eligible for hit testing
    #[default]
    Flying,
    /// Reached the ground while descending
    GroundImpact {
        /// Position after the step that crossed the ground (meters)
        position: Vec3,
    },
    /// Lifetime ran out
    Expired,
}
