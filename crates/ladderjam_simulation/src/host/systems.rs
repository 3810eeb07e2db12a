//! Exclusive system: шаг PlayerInteractionController для каждого игрока

use bevy::prelude::*;

use super::components::{ObjectId, ObjectRegistry, Player, PlayerController, PlayerIntent};
use super::world_host::WorldHost;
use crate::logger::{log, log_warning};

/// Чистит ObjectRegistry от объектов, despawn'утых в обход SpawnService
pub fn prune_object_registry(mut registry: ResMut<ObjectRegistry>, objects: Query<(), With<ObjectId>>) {
    let pruned = registry.retain_live(|entity| objects.contains(entity));
    if pruned > 0 {
        log(&format!("ObjectRegistry: pruned {} despawned objects", pruned));
    }
}

/// Шаг всех controller'ов (FixedUpdate, после probe_contacts)
///
/// Controller снимается с entity (`take`), шагает против `WorldHost` с полным
/// `&mut World`, потом возвращается вместе с потреблённым intent'ом.
pub fn run_player_controllers(world: &mut World) {
    let delta = world.resource::<Time<Fixed>>().timestep().as_secs_f32();

    let mut players: Vec<Entity> = world
        .query_filtered::<Entity, (With<Player>, With<PlayerController>)>()
        .iter(world)
        .collect();
    players.sort_by_key(|entity| entity.index());

    for player in players {
        let Some(PlayerController(mut controller)) = world.entity_mut(player).take::<PlayerController>() else {
            continue;
        };
        let mut intent = world.get::<PlayerIntent>(player).map(|intent| intent.0).unwrap_or_default();

        controller.step(&mut intent, &mut WorldHost::new(world, player), delta);

        world
            .entity_mut(player)
            .insert((PlayerController(controller), PlayerIntent(intent)));
    }
}

/// Включение/выключение controller'а (on_enable / on_disable)
///
/// Возвращает false, если у entity нет PlayerController.
pub fn set_player_enabled(world: &mut World, player: Entity, enabled: bool) -> bool {
    let Ok(mut entity) = world.get_entity_mut(player) else {
        log_warning(&format!("set_player_enabled: entity {:?} not found", player));
        return false;
    };
    let Some(PlayerController(mut controller)) = entity.take::<PlayerController>() else {
        log_warning(&format!("set_player_enabled: {:?} has no PlayerController", player));
        return false;
    };

    let mut host = WorldHost::new(world, player);
    if enabled {
        controller.on_enable(&mut host);
    } else {
        controller.on_disable(&mut host);
    }

    world.entity_mut(player).insert(PlayerController(controller));
    true
}
