//! Combatants: characters, mobs and their stat blocks
//!
//! The projectile system never cares whether it is hitting a player
//! character or a monster; both implement [`Combatant`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Stable identifier of a combatant, unique within a [`GameState`](super::state::GameState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Attributes and resource pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self::new(10, 10, 10, 50, 25)
    }
}

impl StatBlock {
    /// Stat block with full health and mana.
    pub fn new(strength: i32, dexterity: i32, intelligence: i32, max_health: i32, max_mana: i32) -> Self {
        Self {
            strength,
            dexterity,
            intelligence,
            health: max_health,
            max_health,
            mana: max_mana,
            max_mana,
        }
    }

    /// Lose health, never below zero.
    pub fn damage(&mut self, amount: i32) {
        self.health = self.health.saturating_sub(amount.max(0)).max(0);
    }

    /// Regain health, never above the maximum.
    pub fn heal(&mut self, amount: i32) {
        self.health = self.health.saturating_add(amount.max(0)).min(self.max_health);
    }

    pub fn restore_mana(&mut self, amount: i32) {
        self.mana = self.mana.saturating_add(amount.max(0)).min(self.max_mana);
    }

    /// Spend mana. Returns `false` (and spends nothing) if there is not enough.
    pub fn consume_mana(&mut self, amount: i32) -> bool {
        let amount = amount.max(0);
        if self.mana < amount {
            return false;
        }
        self.mana -= amount;
        true
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Anything projectiles and abilities can hit.
pub trait Combatant {
    fn id(&self) -> EntityId;
    fn name(&self) -> &str;
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn stats(&self) -> &StatBlock;
    fn stats_mut(&mut self) -> &mut StatBlock;

    fn is_alive(&self) -> bool {
        self.stats().is_alive()
    }
}

/// A player-controlled or allied hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: EntityId,
    pub name: String,
    pub position: Vec3,
    pub stats: StatBlock,
    pub level: u32,
}

impl Character {
    pub fn new(id: EntityId, name: impl Into<String>, position: Vec3) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            stats: StatBlock::default(),
            level: 1,
        }
    }

    pub fn with_stats(mut self, stats: StatBlock) -> Self {
        self.stats = stats;
        self
    }
}

impl Combatant for Character {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn stats(&self) -> &StatBlock {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut StatBlock {
        &mut self.stats
    }
}

/// A hostile creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mob {
    pub id: EntityId,
    pub name: String,
    pub position: Vec3,
    pub stats: StatBlock,
    /// Mobs that are not aggressive ignore the player until attacked
    pub aggressive: bool,
}

impl Mob {
    pub fn new(id: EntityId, name: impl Into<String>, position: Vec3) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            stats: StatBlock::default(),
            aggressive: true,
        }
    }

    pub fn with_stats(mut self, stats: StatBlock) -> Self {
        self.stats = stats;
        self
    }
}

impl Combatant for Mob {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn stats(&self) -> &StatBlock {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut StatBlock {
        &mut self.stats
    }
}
