//! Skirmish Engine Library
//!
//! Headless simulation core for an arena combat game: a small rigid-body
//! world with collision resolution and spatial queries, plus ability-driven
//! projectiles that hit characters and mobs.
//!
//! # Modules
//!
//! - [`physics`] - Bodies, colliders, spatial grid, tick loop, raycasts, ballistics
//! - [`game`] - Abilities, combatants, the projectile system and the game state
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use skirmish_engine::game::{AbilityDefinition, DamageCategory, EffectKind, GameConfig, GameState, StatBlock};
//! use skirmish_engine::physics::Vec3;
//!
//! let mut state = GameState::new(GameConfig::default());
//! let hero = state.add_character("Aria", Vec3::new(10.0, 10.0, 1.0), StatBlock::default());
//! state.add_mob("Goblin", Vec3::new(20.0, 10.0, 1.0), StatBlock::default());
//!
//! let bolt = Arc::new(
//!     AbilityDefinition::new("Firebolt", DamageCategory::Magical, EffectKind::Damage, 12)
//!         .with_projectile(20.0)
//!         .with_range(30.0),
//! );
//! state.cast_projectile(&bolt, hero, Vec3::X)?;
//!
//! for _ in 0..120 {
//!     let events = state.update(1.0 / 60.0);
//! }
//! ```

pub mod physics;

// Game-specific modules (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

// Re-export the most used entry points at crate level
pub use game::{GameConfig, GameState};
pub use physics::{PhysicsConfig, PhysicsError, PhysicsResult, PhysicsWorld};
