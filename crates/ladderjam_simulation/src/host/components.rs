//! ECS компоненты/ресурсы хоста: тела, поверхности, carryables, игрок

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::interaction::{
    ContactReport, ContactPhase, Intent, ObjectHandle, PlayerInteractionController, SoundCategory, SurfaceLayer,
};

/// Marker component для player-controlled entity
///
/// Только entities с этим компонентом получают `PlayerController` шаг в FixedUpdate.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Стабильный handle объекта (то, что видит controller вместо Entity)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub ObjectHandle);

/// Простое 2D тело: velocity интегрируем сами (не Rapier)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct KinematicBody {
    pub velocity: Vec2,
    /// Множитель гравитации (controller выключает на лестнице)
    pub gravity_scale: f32,
    pub mass: f32,
    /// true → гравитация и интеграция не применяются (held item)
    pub kinematic: bool,
}

impl Default for KinematicBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            mass: 1.0,
            kinematic: false,
        }
    }
}

/// AABB (half extents) для contact probe
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct BodyShape {
    pub half_extents: Vec2,
}

impl BodyShape {
    pub fn new(width: f32, height: f32) -> Self {
        Self { half_extents: Vec2::new(width * 0.5, height * 0.5) }
    }
}

/// Статическая геометрия уровня (пол, лестницы)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub layer: SurfaceLayer,
    /// false → trigger-like (только overlap, без выталкивания)
    pub solid: bool,
}

/// Предмет, который можно поднять и бросить
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CarryableItem {
    pub throw_force: f32,
}

/// Entity заспавнена из ladder prefab (held или placed)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LadderProp;

/// Путь prefab'а, из которого создан объект
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct PrefabPath(pub String);

/// State machine игрока. Снимается с entity на время шага (см. `run_player_controllers`).
#[derive(Component, Debug, Clone)]
pub struct PlayerController(pub PlayerInteractionController);

/// Ввод на текущий кадр (для headless — пишется тестом/скриптом)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerIntent(pub Intent);

/// Контакты, накопленные probe'ом с прошлого шага controller'а
#[derive(Component, Debug, Clone, Default)]
pub struct ContactInbox(pub ContactReport);

/// Что probe видел в прошлом кадре (для генерации ended событий)
#[derive(Component, Debug, Clone, Default)]
pub struct ContactMemory {
    pub touching: BTreeMap<ObjectHandle, RememberedContact>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RememberedContact {
    pub layer: SurfaceLayer,
    pub carryable: bool,
    pub collided: bool,
    pub overlapped: bool,
}

impl RememberedContact {
    /// Ended события для контакта, который пропал
    pub fn ended_phases(&self) -> impl Iterator<Item = ContactPhase> {
        let collision = self.collided.then_some(ContactPhase::CollisionEnded);
        let overlap = self.overlapped.then_some(ContactPhase::OverlapEnded);
        collision.into_iter().chain(overlap)
    }
}

/// Знак направления взгляда (+1 вправо, -1 влево)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Facing(pub f32);

impl Default for Facing {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Флаг "движется" для анимации
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovingFlag(pub bool);

/// Звуковой cue для аудио слоя (pitch/volume уже рандомизированы)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SoundCue {
    pub category: SoundCategory,
    pub position: Vec2,
    pub pitch: f32,
    pub volume: f32,
}

/// Handle → Entity для всех объектов, которые может видеть controller
///
/// BTreeMap — детерминированный порядок, handles монотонные (не переиспользуются).
#[derive(Resource, Debug, Default)]
pub struct ObjectRegistry {
    entities: BTreeMap<ObjectHandle, Entity>,
    last_handle: u64,
}

impl ObjectRegistry {
    pub fn register(&mut self, entity: Entity) -> ObjectHandle {
        self.last_handle += 1;
        let handle = ObjectHandle(self.last_handle);
        self.entities.insert(handle, entity);
        handle
    }

    pub fn entity(&self, handle: ObjectHandle) -> Option<Entity> {
        self.entities.get(&handle).copied()
    }

    pub fn remove(&mut self, handle: ObjectHandle) -> Option<Entity> {
        self.entities.remove(&handle)
    }

    /// Удаляет handles, чьи entities больше не живы. Возвращает число удалённых.
    pub fn retain_live(&mut self, mut alive: impl FnMut(Entity) -> bool) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, entity| alive(*entity));
        before - self.entities.len()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Параметры хоста (мир, prefabs, аудио)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// m/s² (отрицательная = вниз)
    pub gravity: f32,
    /// Сила броска по умолчанию для новых carryables
    pub throw_force: f32,
    /// Масса props (held ladder, crates по умолчанию)
    pub prop_mass: f32,
    /// Диапазон случайного pitch/volume для звуков
    pub sound_variation: (f32, f32),
    pub player_size: (f32, f32),
    pub held_ladder_size: (f32, f32),
    pub placed_ladder_size: (f32, f32),
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            throw_force: 100.0,
            prop_mass: 10.0,
            sound_variation: (0.75, 1.25),
            player_size: (0.7, 1.0),
            held_ladder_size: (0.5, 2.0),
            placed_ladder_size: (0.5, 2.0),
        }
    }
}

impl HostConfig {
    pub fn player_shape(&self) -> BodyShape {
        BodyShape::new(self.player_size.0, self.player_size.1)
    }
}
