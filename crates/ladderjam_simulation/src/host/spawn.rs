//! Spawn helpers (игрок, геометрия, carryables) + snapshot игрока

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::components::*;
use super::systems::set_player_enabled;
use crate::config::ControllerConfig;
use crate::error::ConfigurationFault;
use crate::interaction::{ObjectHandle, PlayerInteractionController, PlayerState, SurfaceLayer};
use crate::logger::log_info;

/// Spawn игрока с контроллером (сразу enabled)
///
/// Невалидный конфиг → ConfigurationFault, entity не создаётся.
pub fn spawn_player(world: &mut World, position: Vec2, config: ControllerConfig) -> Result<Entity, ConfigurationFault> {
    let controller = PlayerInteractionController::new(config)?;

    world.init_resource::<ObjectRegistry>();
    world.init_resource::<HostConfig>();
    let shape = world.resource::<HostConfig>().player_shape();

    let player = world
        .spawn((
            Player,
            Transform::from_xyz(position.x, position.y, 0.0),
            KinematicBody::default(),
            shape,
            PlayerController(controller),
            PlayerIntent::default(),
            ContactInbox::default(),
            ContactMemory::default(),
            Facing::default(),
            MovingFlag::default(),
        ))
        .id();

    let handle = world.resource_mut::<ObjectRegistry>().register(player);
    world.entity_mut(player).insert(ObjectId(handle));

    set_player_enabled(world, player, true);
    log_info(&format!("player {} spawned at ({:.2}, {:.2})", handle, position.x, position.y));

    Ok(player)
}

/// Статическая поверхность (пол, стена, лестница уровня)
pub fn spawn_surface(world: &mut World, position: Vec2, size: Vec2, layer: SurfaceLayer) -> ObjectHandle {
    let entity = world
        .spawn((
            Transform::from_xyz(position.x, position.y, 0.0),
            BodyShape::new(size.x, size.y),
            Surface { layer, solid: true },
        ))
        .id();
    register(world, entity)
}

/// Carryable с физикой (масса/сила броска из HostConfig)
pub fn spawn_carryable(world: &mut World, position: Vec2, size: Vec2) -> ObjectHandle {
    world.init_resource::<HostConfig>();
    let config = world.resource::<HostConfig>().clone();

    let entity = world
        .spawn((
            Transform::from_xyz(position.x, position.y, 0.0),
            BodyShape::new(size.x, size.y),
            KinematicBody { mass: config.prop_mass, ..Default::default() },
            CarryableItem { throw_force: config.throw_force },
        ))
        .id();
    register(world, entity)
}

fn register(world: &mut World, entity: Entity) -> ObjectHandle {
    world.init_resource::<ObjectRegistry>();
    let handle = world.resource_mut::<ObjectRegistry>().register(entity);
    world.entity_mut(entity).insert(ObjectId(handle));
    handle
}

/// Сериализуемый срез состояния игрока (логи, determinism тесты)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub facing: f32,
    pub moving: bool,
    pub enabled: bool,
    pub state: PlayerState,
}

impl PlayerSnapshot {
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::to_string(self)
    }
}

pub fn player_snapshot(world: &World, player: Entity) -> Option<PlayerSnapshot> {
    let transform = world.get::<Transform>(player)?;
    let body = world.get::<KinematicBody>(player)?;
    let PlayerController(controller) = world.get::<PlayerController>(player)?;

    Some(PlayerSnapshot {
        position: transform.translation.truncate().to_array(),
        velocity: body.velocity.to_array(),
        facing: world.get::<Facing>(player).copied().unwrap_or_default().0,
        moving: world.get::<MovingFlag>(player).is_some_and(|flag| flag.0),
        enabled: controller.is_enabled(),
        state: controller.state().clone(),
    })
}
