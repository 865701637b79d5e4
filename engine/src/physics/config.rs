//! Physics world configuration
//!
//! Global parameters that affect every registered body. `Default` returns
//! the tuning the arena ships with; configs can also be loaded from JSON.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::error::{PhysicsError, PhysicsResult};
use super::grid::SpatialGrid;

/// Strategy used to pick candidate pairs before the narrow phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BroadPhase {
    /// Test every active pair. The grid is only used by queries.
    #[default]
    AllPairs,
    /// Test only pairs that share at least one spatial grid cell.
    Grid,
}

/// Configuration for the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration along the up axis (m/s², negative pulls down).
    pub gravity: f32,
    /// Velocity magnitude cap applied after integration (m/s).
    pub max_velocity: f32,
    /// Speeds below this snap to exactly zero (m/s).
    pub velocity_threshold: f32,
    /// Linear damping given to newly created bodies (1/s).
    pub default_linear_damping: f32,
    /// Center distance the overlap resolver pushes bodies towards (meters).
    pub min_separation: f32,
    /// Edge length of one spatial grid cell (meters).
    pub cell_size: f32,
    /// Extent of the spatial grid from the origin (meters).
    pub world_bounds: Vec3,
    /// Half-size of the probe box used to place a body into grid cells.
    pub grid_probe_radius: f32,
    /// Radius of the sphere collider every new body starts with.
    pub default_collider_radius: f32,
    /// Candidate pair selection for collision detection.
    pub broad_phase: BroadPhase,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            max_velocity: 50.0,
            velocity_threshold: 0.01,
            default_linear_damping: 0.01,
            min_separation: 1.0,
            cell_size: 10.0,
            world_bounds: Vec3::new(100.0, 100.0, 20.0),
            grid_probe_radius: 1.0,
            default_collider_radius: 1.0,
            broad_phase: BroadPhase::AllPairs,
        }
    }
}

impl PhysicsConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> PhysicsResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> PhysicsResult<()> {
        if !(self.cell_size > 0.0) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "cell_size must be positive",
            });
        }
        if !(self.max_velocity > 0.0) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "max_velocity must be positive",
            });
        }
        if self.velocity_threshold < 0.0 || self.min_separation < 0.0 || self.grid_probe_radius < 0.0 {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "thresholds and radii must not be negative",
            });
        }
        if !self.world_bounds.is_finite() || self.world_bounds.min_element() < 0.0 {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "world_bounds must be finite and non-negative",
            });
        }
        if SpatialGrid::dimensions_for(self.cell_size, self.world_bounds).is_none() {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "world_bounds / cell_size give too many grid cells",
            });
        }
                if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "gravity must be finite",
            });
        }
        Ok(())
    }

    /// Same config with gravity disabled.
    pub fn zero_gravity() -> Self {
        Self {
            gravity: 0.0,
            ..Self::default()
        }
    }
}
