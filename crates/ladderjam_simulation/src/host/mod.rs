//! Bevy host для interaction domain
//!
//! ECS ответственность:
//! - Тела, поверхности, carryables (components)
//! - Минимальная 2D физика + AABB contact probe
//! - Шаг PlayerInteractionController через `WorldHost` (все collaborators)
//! - SoundCue events для аудио слоя

use bevy::prelude::*;

pub mod components;
pub mod physics;
pub mod spawn;
pub mod systems;
pub mod world_host;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod physics_tests;

pub use components::*;
pub use physics::{aabb_penetration, apply_gravity, integrate_bodies, probe_contacts, settle_carryables, Penetration};
pub use spawn::{player_snapshot, spawn_carryable, spawn_player, spawn_surface, PlayerSnapshot};
pub use systems::{prune_object_registry, run_player_controllers, set_player_enabled};
pub use world_host::WorldHost;

/// Interaction Plugin
///
/// Порядок выполнения (FixedUpdate, .chain()):
/// 1. prune_object_registry — handles внешне despawn'утых объектов
/// 2. apply_gravity — gravity_scale учитывает лазание
/// 3. integrate_bodies — velocity → Transform
/// 4. settle_carryables — предметы не проваливаются сквозь пол
/// 5. probe_contacts — контакты игрока → ContactInbox
/// 6. run_player_controllers — state machine (exclusive)
pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ObjectRegistry>()
            .init_resource::<HostConfig>()
            .add_event::<SoundCue>();

        app.add_systems(
            FixedUpdate,
            (
                prune_object_registry,
                apply_gravity,
                integrate_bodies,
                settle_carryables,
                probe_contacts,
                run_player_controllers,
            )
                .chain(),
        );
    }
}
