//! Game systems: self-contained modules that own state and logic.

pub mod hit_shapes;
pub mod projectile_system;

pub use hit_shapes::HitParams;
pub use projectile_system::{
    CategoryProfiles, ProjectileConfig, ProjectileEvent, ProjectileId, ProjectileInstance, ProjectileSystem,
};
