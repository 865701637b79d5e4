//! Game Module
//!
//! Gameplay built on top of the physics core: abilities, combatants,
//! the projectile system and the state that ties them into one loop.

pub mod ability;
pub mod combatant;
pub mod state;
pub mod systems;

pub use ability::{
    AbilityDefinition, AbilityTarget, Activation, CastType, DamageCategory, EffectKind, HitShape,
};
pub use combatant::{Character, Combatant, EntityId, Mob, StatBlock};
pub use state::{CastError, GameConfig, GameState};
pub use systems::{ProjectileConfig, ProjectileEvent, ProjectileId, ProjectileSystem};
