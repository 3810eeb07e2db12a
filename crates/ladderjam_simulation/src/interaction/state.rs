//! PlayerState — owned mutable state контроллера

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle объекта, которым владеет хост (SpawnService / physics world)
///
/// Controller хранит только handle (weak reference): объект может исчезнуть
/// в любой момент, обращения через collaborators возвращают
/// `TransientPhysicsMismatch::StaleHandle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHandle(pub u64);

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Откуда взялся предмет в руках
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeldKind {
    /// Лестница, заспавненная при подборе установленной лестницы
    Ladder,
    /// Любой carryable, подобранный из `touched_carryable`
    Carryable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldItem {
    pub handle: ObjectHandle,
    pub kind: HeldKind,
}

impl HeldItem {
    pub fn ladder(handle: ObjectHandle) -> Self {
        Self { handle, kind: HeldKind::Ladder }
    }

    pub fn carryable(handle: ObjectHandle) -> Self {
        Self { handle, kind: HeldKind::Carryable }
    }

    pub fn is_ladder(&self) -> bool {
        self.kind == HeldKind::Ladder
    }
}

/// Состояние игрока (мутирует только PlayerInteractionController)
///
/// Инварианты:
/// - лестница либо в руках (`held_item.kind == Ladder`), либо установлена (`ladder_placed`), не оба сразу
/// - `climbing` ⇒ `touching_climbable ∧ ladder_placed`
/// - `placed_ladder.is_some()` ⇔ `ladder_placed`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub grounded: bool,
    pub touching_climbable: bool,
    pub climbing: bool,
    pub held_item: Option<HeldItem>,
    pub ladder_placed: bool,
    pub placed_ladder: Option<ObjectHandle>,
    pub touched_carryable: Option<ObjectHandle>,
}

impl PlayerState {
    pub fn is_holding(&self) -> bool {
        self.held_item.is_some()
    }

    pub fn held_handle(&self) -> Option<ObjectHandle> {
        self.held_item.map(|held| held.handle)
    }

    pub fn can_climb(&self) -> bool {
        self.touching_climbable && self.ladder_placed
    }

    pub fn holds_ladder(&self) -> bool {
        self.held_item.is_some_and(|held| held.is_ladder())
    }

    /// Проверка инвариантов (используется в debug логах и тестах)
    pub fn invariants_hold(&self) -> bool {
        let ladder_exclusive = !(self.holds_ladder() && self.ladder_placed);
        let placed_consistent = self.ladder_placed == self.placed_ladder.is_some();
        let climb_consistent = !self.climbing || self.can_climb();
        ladder_exclusive && placed_consistent && climb_consistent
    }

    pub fn phase(&self) -> InteractionPhase {
        InteractionPhase {
            support: if self.grounded { Support::Grounded } else { Support::Airborne },
            climb: if self.climbing { ClimbMode::Climbing } else { ClimbMode::NotClimbing },
            hands: if self.is_holding() { Hands::Holding } else { Hands::Empty },
            ladder: if self.ladder_placed { LadderMode::Placed } else { LadderMode::Stowed },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Grounded,
    Airborne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimbMode {
    Climbing,
    NotClimbing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hands {
    Holding,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderMode {
    Placed,
    Stowed,
}

/// Композитное состояние: оси независимы (не взаимоисключающие биты одного enum)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionPhase {
    pub support: Support,
    pub climb: ClimbMode,
    pub hands: Hands,
    pub ladder: LadderMode,
}

impl fmt::Display for InteractionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}|{:?}|{:?}|{:?}", self.support, self.climb, self.hands, self.ladder)
    }
}
