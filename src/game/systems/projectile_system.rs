//! Projectile lifecycle management system.
//!
//! Owns every in-flight ability projectile and runs the per-tick state
//! machine:
//!
//! 1. advance lifetime; expired projectiles stop here
//! 2. integrate flight; projectiles reaching the ground while descending stop here
//! 3. hit-test characters, then mobs, and apply the ability's effect
//!
//! Finished projectiles are removed in one compaction pass at the end of
//! [`ProjectileSystem::update`], never mid-iteration.
//!
//! # Hit policy
//!
//! A projectile without an area shape
//! ([`HitShape::is_area`](crate::game::ability::HitShape::is_area)) stops testing
//! at its first hit. Area shapes test every remaining candidate that tick, so one projectile
//! can hit several targets at once, but any hit still ends its flight at
//! the end of the tick.

use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::game::ability::{AbilityDefinition, DamageCategory, EffectKind};
use crate::game::combatant::{Combatant, EntityId};
use crate::game::systems::hit_shapes::{self, HitParams};
use crate::physics::ballistics::{FlightProfile, Projectile, ProjectileState};
use crate::physics::error::{PhysicsError, PhysicsResult};

/// Flight profile per damage category, fixed at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryProfiles {
    pub physical: FlightProfile,
    pub magical: FlightProfile,
    pub healing: FlightProfile,
    pub utility: FlightProfile,
}

impl Default for CategoryProfiles {
    fn default() -> Self {
        Self {
            physical: FlightProfile::physical(),
            magical: FlightProfile::magical(),
            healing: FlightProfile::NONE,
            utility: FlightProfile::NONE,
        }
    }
}

impl CategoryProfiles {
    pub fn get(&self, category: DamageCategory) -> FlightProfile {
        match category {
            DamageCategory::Physical => self.physical,
            DamageCategory::Magical => self.magical,
            DamageCategory::Healing => self.healing,
            DamageCategory::Utility => self.utility,
        }
    }
}

/// Tuning shared by every projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Radius of every projectile (meters)
    pub collision_radius: f32,
    /// Radius every character and mob is treated as (meters)
    pub target_radius: f32,
    /// Half-angle of cone-shaped projectiles (degrees)
    pub cone_half_angle_degrees: f32,
    /// Height of the ground plane (meters)
    pub ground_level: f32,
    pub profiles: CategoryProfiles,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            collision_radius: 0.5,
            target_radius: 1.0,
            cone_half_angle_degrees: 45.0,
            ground_level: 0.0,
            profiles: CategoryProfiles::default(),
        }
    }
}

impl ProjectileConfig {
    fn hit_params(&self) -> HitParams {
        HitParams {
            collision_radius: self.collision_radius,
            target_radius: self.target_radius,
            cone_half_angle_degrees: self.cone_half_angle_degrees,
        }
    }
}

/// Identifier of a spawned projectile. Never reused by the same system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(pub u64);

/// One in-flight ability projectile.
#[derive(Debug, Clone)]
pub struct ProjectileInstance {
    id: ProjectileId,
    flight: Projectile,
    ability: Arc<AbilityDefinition>,
    caster: EntityId,
    /// Caster strength / intelligence at spawn, used if the caster is gone
    caster_snapshot: (i32, i32),
    hit_this_tick: bool,
}

impl ProjectileInstance {
    pub fn id(&self) -> ProjectileId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.flight.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.flight.velocity
    }

    pub fn elapsed(&self) -> f32 {
        self.flight.elapsed
    }

    pub fn max_lifetime(&self) -> f32 {
        self.flight.max_lifetime
    }

    pub fn radius(&self) -> f32 {
        self.flight.radius
    }

    pub fn profile(&self) -> FlightProfile {
        self.flight.profile
    }

    pub fn is_active(&self) -> bool {
        self.flight.active
    }

    pub fn ability(&self) -> &AbilityDefinition {
        &self.ability
    }

    pub fn caster(&self) -> EntityId {
        self.caster
    }
}

/// Something that happened to a projectile during [`ProjectileSystem::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectileEvent {
    /// Lifetime ran out. No hit test was made this tick.
    Expired { id: ProjectileId, position: Vec3 },
    /// Reached the ground while descending. No effect applied.
    GroundImpact { id: ProjectileId, position: Vec3 },
    /// The ability's effect was applied to a target.
    Hit {
        id: ProjectileId,
        target: EntityId,
        effect: EffectKind,
        amount: i32,
    },
    /// Removed at end of tick after hitting at least one target.
    Spent { id: ProjectileId, position: Vec3 },
}

/// Manages the full lifecycle of ability projectiles.
pub struct ProjectileSystem {
    projectiles: Vec<ProjectileInstance>,
    config: ProjectileConfig,
    next_id: u64,
}

impl Default for ProjectileSystem {
    fn default() -> Self {
        Self::new(ProjectileConfig::default())
    }
}

impl ProjectileSystem {
    /// Create a new system with the given projectile configuration.
    pub fn new(config: ProjectileConfig) -> Self {
        Self {
            projectiles: Vec::new(),
            config,
            next_id: 0,
        }
    }

    /// Launch `ability` from the caster's position along `direction`.
    ///
    /// Lifetime is `range / projectile_speed`. Fails with
    /// [`PhysicsError::InvalidAbilityConfiguration`] (creating nothing) when
    /// the speed is not a positive finite number or the range is not finite.
    pub fn spawn<C: Combatant + ?Sized>(
        &mut self,
        ability: Arc<AbilityDefinition>,
        caster: &C,
        direction: Vec3,
    ) -> PhysicsResult<ProjectileId> {
        let speed = ability.projectile_speed;
        if !(speed > 0.0) || !speed.is_finite() {
            warn!(ability = %ability.name, speed, "rejected projectile spawn");
            return Err(PhysicsError::InvalidAbilityConfiguration {
                ability: ability.name.clone(),
                reason: "projectile speed must be positive and finite",
            });
        }
        if !ability.range.is_finite() || ability.range < 0.0 {
            warn!(ability = %ability.name, range = ability.range, "rejected projectile spawn");
            return Err(PhysicsError::InvalidAbilityConfiguration {
                ability: ability.name.clone(),
                reason: "range must be finite and non-negative",
            });
        }

        let max_lifetime = ability.range / speed;
        let profile = self.config.profiles.get(ability.category);
        let mut flight = Projectile::launch(caster.position(), direction, speed, max_lifetime, profile);
        flight.radius = self.config.collision_radius;

        let id = ProjectileId(self.next_id);
        self.next_id += 1;

        let stats = caster.stats();
        info!(
            ?id,
            caster = caster.name(),
            ability = %ability.name,
            speed,
            max_lifetime,
            "projectile fired"
        );
        self.projectiles.push(ProjectileInstance {
            id,
            flight,
            caster: caster.id(),
            caster_snapshot: (stats.strength, stats.intelligence),
            ability,
            hit_this_tick: false,
        });
        Ok(id)
    }

    /// Advance every projectile by `dt` and apply hits to `characters` and `mobs`.
    ///
    /// Returns what happened, in processing order.
    pub fn update<C: Combatant, M: Combatant>(
        &mut self,
        dt: f32,
        characters: &mut [C],
        mobs: &mut [M],
    ) -> Vec<ProjectileEvent> {
        let mut events = Vec::new();
        if !(dt >= 0.0) || !dt.is_finite() {
            warn!(dt, "ignoring invalid projectile time step");
            return events;
        }

        let config = &self.config;
        let params = config.hit_params();

        for instance in &mut self.projectiles {
            if !instance.flight.active {
                continue;
            }
            instance.hit_this_tick = false;

            match instance.flight.advance(dt, config.ground_level) {
                ProjectileState::Expired => {
                    debug!(id = ?instance.id, "projectile expired");
                    events.push(ProjectileEvent::Expired {
                        id: instance.id,
                        position: instance.flight.position,
                    });
                    continue;
                }
                ProjectileState::GroundImpact { position } => {
                    debug!(id = ?instance.id, ?position, "projectile hit the ground");
                    events.push(ProjectileEvent::GroundImpact {
                        id: instance.id,
                        position,
                    });
                    continue;
                }
                ProjectileState::Flying => {}
            }

            test_hits(instance, &params, characters, mobs, &mut events);

            if instance.hit_this_tick {
                instance.flight.active = false;
                events.push(ProjectileEvent::Spent {
                    id: instance.id,
                    position: instance.flight.position,
                });
            }
        }

        self.projectiles.retain(|p| p.flight.active);
        events
    }

    /// Remove a projectile before it finishes. Returns `false` for unknown ids.
    pub fn cancel(&mut self, id: ProjectileId) -> bool {
        let before = self.projectiles.len();
        self.projectiles.retain(|p| p.id != id);
        before != self.projectiles.len()
    }

    /// Remove all projectiles.
    pub fn clear(&mut self) {
        self.projectiles.clear();
    }

    /// Number of live projectiles.
    pub fn active_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Iterate over live projectiles (e.g. for rendering).
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileInstance> {
        self.projectiles.iter()
    }

    pub fn get(&self, id: ProjectileId) -> Option<&ProjectileInstance> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    /// Access the projectile configuration.
    pub fn config(&self) -> &ProjectileConfig {
        &self.config
    }

    /// Mutably access the projectile configuration. Affects later spawns and
    /// hit tests, not the profiles of projectiles already in flight.
    pub fn config_mut(&mut self) -> &mut ProjectileConfig {
        &mut self.config
    }
}

/// Caster strength and intelligence, read live from whichever list holds them.
fn caster_stats<C: Combatant, M: Combatant>(
    instance: &ProjectileInstance,
    characters: &[C],
    mobs: &[M],
) -> (i32, i32) {
    let live = characters
        .iter()
        .find(|c| c.id() == instance.caster)
        .map(|c| c.stats())
        .or_else(|| mobs.iter().find(|m| m.id() == instance.caster).map(|m| m.stats()));
    match live {
        Some(stats) => (stats.strength, stats.intelligence),
        None => instance.caster_snapshot,
    }
}

fn test_hits<C: Combatant, M: Combatant>(
    instance: &mut ProjectileInstance,
    params: &HitParams,
    characters: &mut [C],
    mobs: &mut [M],
    events: &mut Vec<ProjectileEvent>,
) {
    let ability = Arc::clone(&instance.ability);
    let (strength, intelligence) = caster_stats(instance, characters, mobs);
    let amount = ability.effect_amount(strength, intelligence);
    let single_target = !ability.shape.is_area();
    let position = instance.flight.position;
    let direction = instance.flight.direction();

    let mut try_hit = |target: &mut dyn Combatant| -> bool {
        if target.id() == instance.caster {
            return false;
        }
        let hit = hit_shapes::projectile_hits(
            ability.shape,
            params,
            ability.effect_radius,
            position,
            direction,
            target.position(),
        );
        if hit {
            ability.apply_effect(target.stats_mut(), amount);
            debug!(
                id = ?instance.id,
                target = target.name(),
                effect = ?ability.effect,
                amount,
                "projectile hit"
            );
            events.push(ProjectileEvent::Hit {
                id: instance.id,
                target: target.id(),
                effect: ability.effect,
                amount,
            });
            instance.hit_this_tick = true;
        }
        hit
    };

    for character in characters.iter_mut() {
        if try_hit(character) && single_target {
            return;
        }
    }
    for mob in mobs.iter_mut() {
        if try_hit(mob) && single_target {
            return;
        }
    }
}
