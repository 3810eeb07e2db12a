//! Ladderjam Simulation Core
//!
//! Игрок 2D платформера: ходьба, прыжок, подбор/бросок предметов,
//! установка переносной лестницы и лазание по ней.
//!
//! Слои:
//! - `interaction` — engine-agnostic state machine (PlayerInteractionController + collaborator traits)
//! - `host` — Bevy ECS хост: тела, contact probe, WorldHost adapter, SoundCue events

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod config;
pub mod error;
pub mod host;
pub mod interaction;
pub mod logger;

// Re-export базовых типов для удобства
pub use config::{ControllerConfig, InteractionRules, LadderPrefabs};
pub use error::{ConfigurationFault, TransientPhysicsMismatch};
pub use host::{
    player_snapshot, set_player_enabled, spawn_carryable, spawn_player, spawn_surface, HostConfig, InteractionPlugin,
    ObjectId, ObjectRegistry, Player, PlayerController, PlayerIntent, PlayerSnapshot, SoundCue,
};
pub use interaction::{
    FrameAction, FrameOutcome, Intent, InteractionHost, ObjectHandle, PlayerInteractionController, PlayerState,
    PrefabKind, SoundCategory, SurfaceLayer,
};
pub use logger::{init_logger, init_logger_from_env, log, log_error, log_info, log_warning, LogLevel};

/// Fixed timestep симуляции
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .add_plugins(InteractionPlugin);

        // Детерминистичный RNG (seed по умолчанию, если app не задал свой)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ));

    app
}

/// Один детерминированный fixed tick (без зависимости от реального времени)
pub fn step_fixed(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

/// Snapshot мира для сравнения детерминизма
///
/// Сортировка по ObjectId: Entity индексы зависят от порядка spawn/despawn.
pub fn world_snapshot<T>(world: &mut World) -> Vec<u8>
where
    T: Component + std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(&ObjectId, &T)>();
    let mut objects: Vec<_> = query.iter(world).collect();
    objects.sort_by_key(|(id, _)| **id);

    for (id, component) in objects {
        snapshot.extend_from_slice(&id.0 .0.to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
