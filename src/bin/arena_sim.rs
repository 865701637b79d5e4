//! Arena Sim - Headless Combat Run
//!
//! Run with: `cargo run --bin arena_sim [config.json]`
//!
//! Spawns a hero and a pack of mobs, fires a few abilities and steps the
//! simulation for a fixed number of frames, logging every projectile event.
//! Set `RUST_LOG=debug` for per-body output.

use std::process::ExitCode;
use std::sync::Arc;

use glam::Vec3;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use skirmish_engine::game::{
    AbilityDefinition, DamageCategory, EffectKind, GameConfig, GameState, HitShape, ProjectileEvent,
    StatBlock,
};

const FRAMES: u32 = 300;
const FRAME_DELTA: f32 = 1.0 / 60.0;

fn load_config() -> Result<GameConfig, String> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(GameConfig::default());
    };
    let json = std::fs::read_to_string(&path).map_err(|e| format!("failed to read {path}: {e}"))?;
    GameConfig::from_json(&json).map_err(|e| format!("invalid config {path}: {e}"))
}

fn abilities() -> [Arc<AbilityDefinition>; 3] {
    let firebolt = AbilityDefinition::new("Firebolt", DamageCategory::Magical, EffectKind::Damage, 12)
        .with_description("A fast bolt of flame")
        .with_projectile(20.0)
        .with_range(30.0)
        .with_mana_cost(5);
    let arrow = AbilityDefinition::new("Arrow", DamageCategory::Physical, EffectKind::Damage, 8)
        .with_projectile(35.0)
        .with_range(40.0);
    let frost_cone = AbilityDefinition::new("Frost Cone", DamageCategory::Magical, EffectKind::Damage, 6)
        .with_projectile(10.0)
        .with_range(12.0)
        .with_mana_cost(8)
        .with_shape(HitShape::Cone, 4.0);
    [Arc::new(firebolt), Arc::new(arrow), Arc::new(frost_cone)]
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut state = match GameState::try_new(config) {
        Ok(state) => state,
        Err(e) => {
            error!("invalid config: {e}");
            return ExitCode::FAILURE;
        }
    };
    let hero = state.add_character("Aria", Vec3::new(10.0, 10.0, 1.0), StatBlock::new(12, 10, 14, 60, 40));
    state.add_mob("Goblin", Vec3::new(20.0, 10.0, 1.0), StatBlock::default());
    state.add_mob("Goblin Archer", Vec3::new(22.0, 11.0, 1.0), StatBlock::new(8, 14, 6, 35, 0));
    state.add_mob("Wolf", Vec3::new(10.0, 24.0, 1.0), StatBlock::new(14, 12, 2, 40, 0));

    let [firebolt, arrow, frost_cone] = abilities();
    let casts = [(0, &firebolt, Vec3::X), (30, &arrow, Vec3::Y), (60, &frost_cone, Vec3::X)];

    let mut hits = 0;
    for frame in 0..FRAMES {
        for (cast_frame, ability, direction) in &casts {
            if *cast_frame == frame {
                if let Err(e) = state.cast_projectile(ability, hero, *direction) {
                    error!(ability = %ability.name, "cast failed: {e}");
                }
            }
        }

        for event in state.update(FRAME_DELTA) {
            match event {
                ProjectileEvent::Hit { id, target, effect, amount } => {
                    hits += 1;
                    info!(frame, ?id, %target, ?effect, amount, "hit");
                }
                ProjectileEvent::GroundImpact { id, position } => info!(frame, ?id, %position, "ground impact"),
                ProjectileEvent::Expired { id, .. } => info!(frame, ?id, "expired"),
                ProjectileEvent::Spent { id, .. } => info!(frame, ?id, "spent"),
            }
        }
    }

    for mob in state.mobs() {
        info!(
            name = %mob.name,
            health = mob.stats.health,
            position = %mob.position,
            "final mob state"
        );
    }
    info!(steps = state.steps(), hits, "simulation finished");
    ExitCode::SUCCESS
}
