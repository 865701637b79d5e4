//! Ability definitions and effect math
//!
//! An [`AbilityDefinition`] is static data: what the ability costs, how it
//! is delivered, what shape it hits and how much it does. Effect amounts
//! scale with the caster's strength or intelligence depending on the
//! ability's [`DamageCategory`].
//!
//! # Example
//!
//! ```ignore
//! use skirmish_engine::game::ability::{AbilityDefinition, DamageCategory, EffectKind, HitShape};
//!
//! let fireball = AbilityDefinition::new("Fireball", DamageCategory::Magical, EffectKind::Damage, 20)
//!     .with_mana_cost(10)
//!     .with_range(30.0)
//!     .with_projectile(15.0)
//!     .with_shape(HitShape::Sphere, 4.0);
//!
//! assert_eq!(fireball.calculate_damage(10, 15), 23);
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::combatant::{Combatant, EntityId, StatBlock};
use super::systems::hit_shapes;

/// School of an ability. Picks the scaling stat and the projectile flight profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageCategory {
    Physical,
    Magical,
    Healing,
    Utility,
}

/// Who an ability may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AbilityTarget {
    /// Only affects the caster
    SelfOnly,
    #[default]
    Enemy,
    /// Fired in a direction, hits whatever it meets
    Projectile,
    /// Placed at a location, affects an area
    GroundTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Damage,
    Heal,
    Buff,
    Debuff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Activation {
    #[default]
    Active,
    Passive,
}

/// How the effect is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CastType {
    #[default]
    Instant,
    /// Travels through the air as a projectile
    Projectile,
    Beam,
    GroundCast,
    Channeled,
}

/// Area an ability (or its projectile) tests targets against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitShape {
    #[default]
    SingleTarget,
    Line,
    Cone,
    /// Top-down circle, height ignored
    Circle,
    Sphere,
    /// No declared shape; treated as a point hit
    Unspecified,
}

impl HitShape {
    /// Area shapes keep testing candidates after the first hit in a tick.
    pub fn is_area(self) -> bool {
        matches!(self, Self::Line | Self::Cone | Self::Circle | Self::Sphere)
    }
}

/// Static description of an ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    pub name: String,
    pub description: String,
    pub category: DamageCategory,
    /// Base effect amount before stat scaling
    pub amount: i32,
    pub mana_cost: i32,
    /// Seconds
    pub cooldown: f32,
    /// Seconds
    pub cast_time: f32,
    /// Meters
    pub range: f32,
    pub target: AbilityTarget,
    pub effect: EffectKind,
    pub activation: Activation,
    pub cast_type: CastType,
    pub shape: HitShape,
    /// Meters per second, only meaningful for [`CastType::Projectile`]
    pub projectile_speed: f32,
    /// Meters, the size of cone / line / circle / sphere areas
    pub effect_radius: f32,
}

impl AbilityDefinition {
    /// Instant, single-target, active ability with no cost.
    pub fn new(name: impl Into<String>, category: DamageCategory, effect: EffectKind, amount: i32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category,
            amount,
            mana_cost: 0,
            cooldown: 0.0,
            cast_time: 0.0,
            range: 0.0,
            target: AbilityTarget::default(),
            effect,
            activation: Activation::default(),
            cast_type: CastType::default(),
            shape: HitShape::default(),
            projectile_speed: 0.0,
            effect_radius: 0.0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_mana_cost(mut self, mana_cost: i32) -> Self {
        self.mana_cost = mana_cost;
        self
    }

    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_cast_time(mut self, cast_time: f32) -> Self {
        self.cast_time = cast_time;
        self
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn with_target(mut self, target: AbilityTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Deliver as a projectile flying at `speed`.
    pub fn with_projectile(mut self, speed: f32) -> Self {
        self.cast_type = CastType::Projectile;
        self.target = AbilityTarget::Projectile;
        self.projectile_speed = speed;
        self
    }

    pub fn with_cast_type(mut self, cast_type: CastType) -> Self {
        self.cast_type = cast_type;
        self
    }

    pub fn with_shape(mut self, shape: HitShape, effect_radius: f32) -> Self {
        self.shape = shape;
        self.effect_radius = effect_radius;
        self
    }

    pub fn is_projectile(&self) -> bool {
        self.cast_type == CastType::Projectile
    }

    pub fn is_in_range(&self, caster: Vec3, target: Vec3) -> bool {
        caster.distance(target) <= self.range
    }

    // =========================================================================
    // Effect math
    // =========================================================================

    /// Damage dealt, or 0 if this is not a damage ability.
    pub fn calculate_damage(&self, strength: i32, intelligence: i32) -> i32 {
        if self.effect != EffectKind::Damage {
            return 0;
        }
        let bonus = match self.category {
            DamageCategory::Physical => scaled(strength, 0.2),
            DamageCategory::Magical => scaled(intelligence, 0.2),
            DamageCategory::Healing | DamageCategory::Utility => 0,
        };
        self.amount.saturating_add(bonus)
    }

    /// Health restored, or 0 if this is not a heal.
    pub fn calculate_heal(&self, intelligence: i32) -> i32 {
        if self.effect != EffectKind::Heal {
            return 0;
        }
        self.amount.saturating_add(scaled(intelligence, 0.2))
    }

    /// Stat increase, or 0 if this is not a buff.
    pub fn calculate_buff(&self, strength: i32, intelligence: i32) -> i32 {
        if self.effect != EffectKind::Buff {
            return 0;
        }
        let bonus = match self.category {
            DamageCategory::Physical => scaled(strength, 0.3),
            DamageCategory::Magical => scaled(intelligence, 0.3),
            DamageCategory::Healing => scaled(intelligence, 0.25),
            DamageCategory::Utility => scaled(strength.saturating_add(intelligence), 0.15),
        };
        self.amount.saturating_add(bonus)
    }

    /// Stat decrease, or 0 if this is not a debuff.
    pub fn calculate_debuff(&self, strength: i32, intelligence: i32) -> i32 {
        if self.effect != EffectKind::Debuff {
            return 0;
        }
        let bonus = match self.category {
            DamageCategory::Physical => scaled(strength, 0.25),
            DamageCategory::Magical => scaled(intelligence, 0.3),
            DamageCategory::Utility => scaled(intelligence, 0.2),
            DamageCategory::Healing => 0,
        };
        self.amount.saturating_add(bonus)
    }

    /// Amount of whichever effect this ability has.
    pub fn effect_amount(&self, strength: i32, intelligence: i32) -> i32 {
        match self.effect {
            EffectKind::Damage => self.calculate_damage(strength, intelligence),
            EffectKind::Heal => self.calculate_heal(intelligence),
            EffectKind::Buff => self.calculate_buff(strength, intelligence),
            EffectKind::Debuff => self.calculate_debuff(strength, intelligence),
        }
    }

    /// Apply a precomputed effect amount to a target.
    pub fn apply_effect(&self, target: &mut StatBlock, amount: i32) {
        match self.effect {
            EffectKind::Damage => target.damage(amount),
            EffectKind::Heal => target.heal(amount),
            EffectKind::Buff => self.apply_buff(target, amount),
            EffectKind::Debuff => self.apply_debuff(target, amount),
        }
    }

    // =========================================================================
    // Buff / debuff stat selection
    // =========================================================================

    pub fn affects_strength(&self) -> bool {
        match self.category {
            DamageCategory::Physical => true,
            DamageCategory::Utility => self.name.contains("Strength"),
            _ => false,
        }
    }

    pub fn affects_dexterity(&self) -> bool {
        match self.category {
            DamageCategory::Utility => true,
            DamageCategory::Physical => self.name.contains("Agility"),
            _ => false,
        }
    }

    pub fn affects_intelligence(&self) -> bool {
        match self.category {
            DamageCategory::Magical | DamageCategory::Healing => true,
            DamageCategory::Utility => self.name.contains("Intelligence"),
            DamageCategory::Physical => false,
        }
    }

    pub fn affects_max_health(&self) -> bool {
        match self.category {
            DamageCategory::Healing => true,
            DamageCategory::Utility => self.name.contains("Health") || self.name.contains("Protection"),
            _ => false,
        }
    }

    pub fn affects_max_mana(&self) -> bool {
        match self.category {
            DamageCategory::Magical => true,
            DamageCategory::Utility => self.name.contains("Mana") || self.name.contains("Magic"),
            _ => false,
        }
    }

    /// Raise every selected stat by `amount`. Raising a pool maximum refills the pool.
    pub fn apply_buff(&self, target: &mut StatBlock, amount: i32) {
        if self.affects_strength() {
            target.strength = target.strength.saturating_add(amount);
        }
        if self.affects_dexterity() {
            target.dexterity = target.dexterity.saturating_add(amount);
        }
        if self.affects_intelligence() {
            target.intelligence = target.intelligence.saturating_add(amount);
        }
        if self.affects_max_health() {
            target.max_health = target.max_health.saturating_add(amount);
            target.health = target.max_health;
        }
        if self.affects_max_mana() {
            target.max_mana = target.max_mana.saturating_add(amount);
            target.mana = target.max_mana;
        }
    }

    /// Lower every selected stat by `amount`, respecting per-stat floors.
    pub fn apply_debuff(&self, target: &mut StatBlock, amount: i32) {
        if self.affects_strength() {
            target.strength = target.strength.saturating_sub(amount).max(MIN_ATTRIBUTE);
        }
        if self.affects_dexterity() {
            target.dexterity = target.dexterity.saturating_sub(amount).max(MIN_ATTRIBUTE);
        }
        if self.affects_intelligence() {
            target.intelligence = target.intelligence.saturating_sub(amount).max(MIN_ATTRIBUTE);
        }
        if self.affects_max_health() {
            target.max_health = target.max_health.saturating_sub(amount).max(MIN_MAX_HEALTH);
            target.health = target.health.min(target.max_health);
        }
        if self.affects_max_mana() {
            target.max_mana = target.max_mana.saturating_sub(amount).max(MIN_MAX_MANA);
            target.mana = target.mana.min(target.max_mana);
        }
    }

    // =========================================================================
    // Area helpers (use this ability's effect radius)
    // =========================================================================

    pub fn is_target_in_cone(&self, origin: Vec3, target: Vec3, direction: Vec3, half_angle_degrees: f32) -> bool {
        hit_shapes::in_cone(origin, target, direction, self.effect_radius, half_angle_degrees)
    }

    pub fn is_target_in_line(&self, origin: Vec3, target: Vec3, direction: Vec3, width: f32) -> bool {
        hit_shapes::in_line(origin, target, direction, self.effect_radius, width)
    }

    pub fn is_target_in_circle(&self, center: Vec3, target: Vec3) -> bool {
        hit_shapes::in_circle(center, target, self.effect_radius)
    }

    pub fn is_target_in_sphere(&self, center: Vec3, target: Vec3) -> bool {
        hit_shapes::in_sphere(center, target, self.effect_radius)
    }

    /// Whether `target` is inside this ability's area placed at `origin`.
    ///
    /// Cones and lines are aimed from `origin` straight at the target.
    pub fn is_target_in_shape(&self, origin: Vec3, target: Vec3) -> bool {
        let aim = (target - origin).normalize_or_zero();
        match self.shape {
            HitShape::SingleTarget => hit_shapes::within_reach(origin, target, self.effect_radius),
            HitShape::Cone => self.is_target_in_cone(origin, target, aim, DEFAULT_CONE_HALF_ANGLE),
            HitShape::Line => self.is_target_in_line(origin, target, aim, self.effect_radius),
            HitShape::Sphere => self.is_target_in_sphere(origin, target),
            HitShape::Circle | HitShape::Unspecified => self.is_target_in_circle(origin, target),
        }
    }

    /// Ids of every candidate inside this ability's area, in list order.
    pub fn targets_in_area<C: Combatant>(&self, center: Vec3, candidates: &[C]) -> Vec<EntityId> {
        candidates
            .iter()
            .filter(|c| self.is_target_in_shape(center, c.position()))
            .map(|c| c.id())
            .collect()
    }
}

/// Cone half-angle used when an area ability is placed without a direction.
pub const DEFAULT_CONE_HALF_ANGLE: f32 = 45.0;

const MIN_ATTRIBUTE: i32 = 1;
const MIN_MAX_HEALTH: i32 = 10;
const MIN_MAX_MANA: i32 = 5;

fn scaled(stat: i32, factor: f64) -> i32 {
    (f64::from(stat) * factor).round() as i32
}
