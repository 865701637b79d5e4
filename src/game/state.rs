//! Game State
//!
//! Central state struct that holds the physics world, the projectile
//! system and every combatant together, and drives them from one
//! fixed-step loop.
//!
//! Each character and mob owns a dynamic physics body. After every physics
//! step the body positions are copied back onto the entities, so projectiles
//! always test against where the physics world put them.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::game::ability::AbilityDefinition;
use crate::game::combatant::{Character, Combatant, EntityId, Mob, StatBlock};
use crate::game::systems::{ProjectileConfig, ProjectileEvent, ProjectileId, ProjectileSystem};
use crate::physics::body::BodyHandle;
use crate::physics::config::PhysicsConfig;
use crate::physics::error::{PhysicsError, PhysicsResult};
use crate::physics::types::{UP, height};
use crate::physics::world::PhysicsWorld;

/// Upper bound on fixed steps run by one [`GameState::update`] call.
const MAX_STEPS_PER_UPDATE: u32 = 240;

/// Configuration for the whole simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub projectiles: ProjectileConfig,
    /// Length of one simulation step (seconds)
    pub fixed_timestep: f32,
    /// Frame deltas above this are clamped (seconds)
    pub max_frame_delta: f32,
    /// Mass of the body given to each character and mob (kg)
    pub entity_mass: f32,
    /// Keep entity bodies from sinking below the ground plane
    pub ground_entities: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            projectiles: ProjectileConfig::default(),
            fixed_timestep: 1.0 / 60.0,
            max_frame_delta: 1.0 / 15.0,
            entity_mass: 1.0,
            ground_entities: true,
        }
    }
}

impl GameConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> PhysicsResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PhysicsResult<()> {
        self.physics.validate()?;
        if !(self.fixed_timestep > 0.0) || !self.fixed_timestep.is_finite() {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "fixed_timestep must be positive",
            });
        }
        if !(self.max_frame_delta > 0.0) || self.max_frame_delta.is_nan() {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "max_frame_delta must be positive",
            });
        }
        Ok(())
    }
}

/// Why a cast was refused.
#[derive(Debug, Error)]
pub enum CastError {
    #[error("no combatant with id {0}")]
    UnknownCaster(EntityId),

    #[error("'{ability}' is not a projectile ability")]
    NotAProjectile { ability: String },

    #[error("not enough mana: need {needed}, have {available}")]
    InsufficientMana { needed: i32, available: i32 },

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// Central game state holding all systems
pub struct GameState {
    physics: PhysicsWorld,
    projectiles: ProjectileSystem,
    characters: Vec<Character>,
    mobs: Vec<Mob>,
    bodies: HashMap<EntityId, BodyHandle>,
    bodies_by_name: HashMap<String, BodyHandle>,
    config: GameConfig,
    accumulator: f32,
    next_entity: u32,
    steps: u64,
    paused: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameState {
    /// Create a game state from a validated config.
    pub fn try_new(config: GameConfig) -> PhysicsResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Create a game state without validating `config`.
    ///
    /// A non-positive or non-finite `fixed_timestep` makes [`update`](Self::update)
    /// a no-op. Use [`try_new`](Self::try_new) to reject such configs up front.
    pub fn new(config: GameConfig) -> Self {
        info!(
            fixed_timestep = config.fixed_timestep,
            broad_phase = ?config.physics.broad_phase,
            "game state initialized"
        );
        Self {
            physics: PhysicsWorld::new(config.physics),
            projectiles: ProjectileSystem::new(config.projectiles),
            characters: Vec::new(),
            mobs: Vec::new(),
            bodies: HashMap::new(),
            bodies_by_name: HashMap::new(),
            config,
            accumulator: 0.0,
            next_entity: 1,
            steps: 0,
            paused: false,
        }
    }

    // === Entities ===

    /// Add a character and give it a physics body.
    pub fn add_character(&mut self, name: impl Into<String>, position: Vec3, stats: StatBlock) -> EntityId {
        let id = self.allocate_id();
        let character = Character::new(id, name, position).with_stats(stats);
        self.register_body(id, &character.name, position);
        info!(%id, name = %character.name, "character added");
        self.characters.push(character);
        id
    }

    /// Add a mob and give it a physics body.
    pub fn add_mob(&mut self, name: impl Into<String>, position: Vec3, stats: StatBlock) -> EntityId {
        let id = self.allocate_id();
        let mob = Mob::new(id, name, position).with_stats(stats);
        self.register_body(id, &mob.name, position);
        info!(%id, name = %mob.name, "mob added");
        self.mobs.push(mob);
        id
    }

    /// Remove a character or mob and its body. Returns `false` for unknown ids.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let before = self.characters.len() + self.mobs.len();
        self.characters.retain(|c| c.id != id);
        self.mobs.retain(|m| m.id != id);
        if before == self.characters.len() + self.mobs.len() {
            return false;
        }
        if let Some(handle) = self.bodies.remove(&id) {
            self.physics.remove_body(handle);
            self.bodies_by_name.retain(|_, h| *h != handle);
        }
        info!(%id, "entity removed");
        true
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    fn register_body(&mut self, id: EntityId, name: &str, position: Vec3) {
        let handle = self.physics.create_body(position, self.config.entity_mass);
        self.bodies.insert(id, handle);
        if self.bodies_by_name.insert(name.to_owned(), handle).is_some() {
            warn!(name, "duplicate entity name, name lookup now returns the newest body");
        }
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn mobs(&self) -> &[Mob] {
        &self.mobs
    }

    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn mob(&self, id: EntityId) -> Option<&Mob> {
        self.mobs.iter().find(|m| m.id == id)
    }

    /// Stats of any combatant.
    pub fn stats(&self, id: EntityId) -> Option<&StatBlock> {
        self.character(id)
            .map(|c| &c.stats)
            .or_else(|| self.mob(id).map(|m| &m.stats))
    }

    pub fn stats_mut(&mut self, id: EntityId) -> Option<&mut StatBlock> {
        if let Some(c) = self.characters.iter_mut().find(|c| c.id == id) {
            return Some(&mut c.stats);
        }
        self.mobs.iter_mut().find(|m| m.id == id).map(|m| &mut m.stats)
    }

    /// Physics body of a combatant.
    pub fn body_of(&self, id: EntityId) -> Option<BodyHandle> {
        self.bodies.get(&id).copied()
    }

    /// Physics body registered under a display name.
    pub fn body_for(&self, name: &str) -> Option<BodyHandle> {
        self.bodies_by_name.get(name).copied()
    }

    /// Move a combatant and its body instantly.
    pub fn teleport(&mut self, id: EntityId, position: Vec3) {
        let Some(handle) = self.body_of(id) else {
            warn!(%id, "teleport of unknown entity ignored");
            return;
        };
        self.physics.set_position(handle, position);
        self.sync_entity_positions();
    }

    /// Set the velocity of a combatant's body.
    pub fn set_entity_velocity(&mut self, id: EntityId, velocity: Vec3) {
        match self.body_of(id) {
            Some(handle) => self.physics.set_velocity(handle, velocity),
            None => warn!(%id, "velocity change for unknown entity ignored"),
        }
    }

    // === Casting ===

    /// Spend the caster's mana and launch a projectile ability.
    ///
    /// Nothing is spent when the cast is refused.
    pub fn cast_projectile(
        &mut self,
        ability: &Arc<AbilityDefinition>,
        caster: EntityId,
        direction: Vec3,
    ) -> Result<ProjectileId, CastError> {
        let available = self.stats(caster).ok_or(CastError::UnknownCaster(caster))?.mana;
        if !ability.is_projectile() {
            return Err(CastError::NotAProjectile {
                ability: ability.name.clone(),
            });
        }
        if available < ability.mana_cost {
            return Err(CastError::InsufficientMana {
                needed: ability.mana_cost,
                available,
            });
        }

        let id = if let Some(c) = self.characters.iter().find(|c| c.id == caster) {
            self.projectiles.spawn(Arc::clone(ability), c, direction)?
        } else if let Some(m) = self.mobs.iter().find(|m| m.id == caster) {
            self.projectiles.spawn(Arc::clone(ability), m, direction)?
        } else {
            return Err(CastError::UnknownCaster(caster));
        };

        if let Some(stats) = self.stats_mut(caster) {
            stats.consume_mana(ability.mana_cost);
        }
        Ok(id)
    }

    // === Loop ===

    /// Advance by one rendered frame.
    ///
    /// The frame delta is clamped to `max_frame_delta` and consumed in
    /// `fixed_timestep` steps; leftover time carries into the next frame.
    /// Returns every projectile event produced by the steps taken.
    pub fn update(&mut self, frame_delta: f32) -> Vec<ProjectileEvent> {
        let mut events = Vec::new();
        if self.paused {
            return events;
        }
        if !frame_delta.is_finite() || frame_delta < 0.0 {
            warn!(frame_delta, "ignoring invalid frame delta");
            return events;
        }

        let step = self.config.fixed_timestep;
        if !(step > 0.0) || !step.is_finite() {
            warn!(step, "fixed timestep is not positive, nothing simulated");
            return events;
        }

        self.accumulator += frame_delta.min(self.config.max_frame_delta);
        let mut taken = 0;
        while self.accumulator >= step {
            if taken == MAX_STEPS_PER_UPDATE {
                debug!(dropped = self.accumulator, "step budget spent, dropping leftover time");
                self.accumulator = 0.0;
                break;
            }
            self.step(step, &mut events);
            self.accumulator -= step;
            taken += 1;
        }
        events
    }

    /// Run exactly one simulation step of `dt` seconds, ignoring pause.
    pub fn step(&mut self, dt: f32, events: &mut Vec<ProjectileEvent>) {
        self.physics.tick(dt);
        if self.config.ground_entities {
            self.keep_bodies_above_ground();
        }
        self.sync_entity_positions();

        let produced = self.projectiles.update(dt, &mut self.characters, &mut self.mobs);
        for event in &produced {
            if let ProjectileEvent::Hit { target, .. } = event {
                if self.stats(*target).is_some_and(|s| !s.is_alive()) {
                    info!(%target, "combatant defeated");
                }
            }
        }
        events.extend(produced);
        self.steps += 1;
        if self.steps % 60 == 0 && self.projectiles.active_count() > 0 {
            debug!(active = self.projectiles.active_count(), "projectiles in flight");
        }
    }

    fn keep_bodies_above_ground(&mut self) {
        let ground = self.config.projectiles.ground_level;
        for &handle in self.bodies.values() {
            let (Some(position), Some(velocity)) = (self.physics.position(handle), self.physics.velocity(handle)) else {
                continue;
            };
            let z = height(position);
            if z < ground {
                self.physics.set_position(handle, position + UP * (ground - z));
                let vz = height(velocity);
                if vz < 0.0 {
                    self.physics.set_velocity(handle, velocity - UP * vz);
                }
            }
        }
    }

    fn sync_entity_positions(&mut self) {
        for character in &mut self.characters {
            if let Some(p) = self.bodies.get(&character.id).and_then(|&h| self.physics.position(h)) {
                character.set_position(p);
            }
        }
        for mob in &mut self.mobs {
            if let Some(p) = self.bodies.get(&mob.id).and_then(|&h| self.physics.position(h)) {
                mob.set_position(p);
            }
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fixed steps simulated so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn projectiles(&self) -> &ProjectileSystem {
        &self.projectiles
    }

    pub fn projectiles_mut(&mut self) -> &mut ProjectileSystem {
        &mut self.projectiles
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
