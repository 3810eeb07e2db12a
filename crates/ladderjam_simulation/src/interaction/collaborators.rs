//! Collaborator contracts — узкие интерфейсы к движку
//!
//! Controller не знает ни про ECS, ни про физику: всё через эти traits.
//! Хост (Bevy `WorldHost`, mock в тестах) реализует все четыре,
//! `InteractionHost` собирает их blanket impl'ом.

use bevy::math::Vec2;
use std::fmt;

use super::contacts::ContactReport;
use super::state::ObjectHandle;
use crate::error::TransientPhysicsMismatch;

/// Тип префаба, который controller просит заспавнить
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefabKind {
    /// Лестница в руках (carryable, kinematic пока держим)
    HeldLadder,
    /// Установленная лестница (climbable surface)
    PlacedLadder,
}

impl fmt::Display for PrefabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefabKind::HeldLadder => write!(f, "held ladder"),
            PrefabKind::PlacedLadder => write!(f, "placed ladder"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCategory {
    Jump,
    Throw,
    PickUp,
}

/// Тело игрока
pub trait PhysicsBody {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
    /// Мгновенный импульс (Δv = impulse / mass на стороне хоста)
    fn apply_impulse(&mut self, impulse: Vec2);
    fn gravity_scale(&self) -> f32;
    fn set_gravity_scale(&mut self, scale: f32);
    /// Все контакты, накопленные с прошлого кадра (drain)
    fn take_contacts(&mut self) -> ContactReport;
    /// Переключение solid/trigger у climbable поверхности
    fn set_surface_solid(&mut self, surface: ObjectHandle, solid: bool) -> Result<(), TransientPhysicsMismatch>;
}

/// Throwable предметы, адресуемые по handle
pub trait Carryables {
    fn item_exists(&self, item: ObjectHandle) -> bool;
    /// Импульс броска вдоль `direction` (сила броска — свойство предмета)
    fn throw_item(&mut self, item: ObjectHandle, direction: Vec2) -> Result<(), TransientPhysicsMismatch>;
    fn set_item_kinematic(&mut self, item: ObjectHandle, kinematic: bool) -> Result<(), TransientPhysicsMismatch>;
    /// Жёстко ставит предмет в `position` с поворотом `rotation` (радианы, вокруг Z)
    fn attach_item(&mut self, item: ObjectHandle, position: Vec2, rotation: f32) -> Result<(), TransientPhysicsMismatch>;
}

pub trait SpawnService {
    fn spawn(&mut self, kind: PrefabKind, prefab_path: &str, position: Vec2, rotation: f32) -> ObjectHandle;
    fn destroy(&mut self, object: ObjectHandle) -> Result<(), TransientPhysicsMismatch>;
}

pub trait Presentation {
    /// `sign` ∈ {-1.0, +1.0}
    fn set_facing(&mut self, sign: f32);
    fn set_moving(&mut self, moving: bool);
    fn play_sound(&mut self, category: SoundCategory);
}

/// Полный набор collaborators для одного кадра
pub trait InteractionHost: PhysicsBody + Carryables + SpawnService + Presentation {}

impl<T> InteractionHost for T where T: PhysicsBody + Carryables + SpawnService + Presentation {}
