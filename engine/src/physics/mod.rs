//! Physics module for the Skirmish engine
//!
//! Custom rigid-body and projectile physics, built from scratch without an
//! external physics library.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout), **Z is up**.
//!
//! - Distances in meters
//! - Velocities in m/s
//! - Accelerations in m/s²
//! - Mass in kg
//!
//! # Submodules
//!
//! - [`types`] - Vector type and the axis convention
//! - [`collider`] - Sphere / box colliders and their overlap predicates
//! - [`body`] - Bodies, body kinds and generational handles
//! - [`config`] - World tuning, loadable from JSON
//! - [`grid`] - Uniform spatial grid rebuilt every tick
//! - [`collision`] - Pair finding, overlap correction, ray-sphere test
//! - [`world`] - Body registry, integrator and tick loop
//! - [`query`] - Radius queries, raycasting and line of sight
//! - [`ballistics`] - Projectile flight profiles and trajectory integration
//! - [`error`] - Error type for configuration and spawn failures

pub mod ballistics;
pub mod body;
pub mod collider;
pub mod collision;
pub mod config;
pub mod error;
pub mod grid;
pub mod query;
pub mod types;
pub mod world;

// Re-export commonly used types at the physics module level
pub use ballistics::{FlightProfile, Projectile, ProjectileState};
pub use body::{Body, BodyHandle, BodyKind, CollisionCallback, CollisionHooks, PhysicsMaterial};
pub use collider::Collider;
pub use collision::{Contact, ray_sphere_intersect};
pub use config::{BroadPhase, PhysicsConfig};
pub use error::{PhysicsError, PhysicsResult};
pub use grid::{CellIndex, SpatialGrid};
pub use query::RayHit;
pub use types::{UP, Vec3, ground_distance, height};
pub use world::PhysicsWorld;
