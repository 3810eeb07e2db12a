//! Contact tracking — fold contact report в grounded / climbable / carryable
//!
//! Physics collaborator может прислать несколько контактов на один объект за кадр
//! (по одному на геометрию) и не гарантирует порядок. Поэтому контакты сначала
//! группируются по handle, потом применяются ранжированными правилами:
//! - stay и end одного объекта в одном кадре → побеждает stay
//! - grounded = непустое множество grounding поверхностей (не один bool, который
//!   перетирается последним событием)

use bevy::math::Vec2;
use std::collections::{BTreeMap, BTreeSet};

use super::state::ObjectHandle;

/// Классификация геометрии (physics layer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceLayer {
    Ground,
    Climbable,
    Other,
}

impl SurfaceLayer {
    /// На этих слоях можно стоять
    pub fn supports_standing(self) -> bool {
        matches!(self, SurfaceLayer::Ground | SurfaceLayer::Climbable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    /// Solid контакт продолжается (collision stay)
    Collision,
    CollisionEnded,
    /// Пересечение с trigger-like объектом (overlap stay)
    Overlap,
    OverlapEnded,
}

impl ContactPhase {
    pub fn is_ended(self) -> bool {
        matches!(self, ContactPhase::CollisionEnded | ContactPhase::OverlapEnded)
    }
}

/// Один контакт с другим объектом
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub other: ObjectHandle,
    pub layer: SurfaceLayer,
    /// У объекта есть carryable компонент
    pub carryable: bool,
    /// Позиция другого объекта (для выбора ближайшего carryable и центровки на лестнице)
    pub position: Vec2,
    pub phase: ContactPhase,
    /// Нормали точек контакта (от поверхности к игроку); пусто для overlap/ended
    pub normals: Vec<Vec2>,
}

impl Contact {
    pub fn collision(other: ObjectHandle, layer: SurfaceLayer, position: Vec2, normals: Vec<Vec2>) -> Self {
        Self { other, layer, carryable: false, position, phase: ContactPhase::Collision, normals }
    }

    pub fn overlap(other: ObjectHandle, layer: SurfaceLayer, position: Vec2) -> Self {
        Self { other, layer, carryable: false, position, phase: ContactPhase::Overlap, normals: Vec::new() }
    }

    pub fn ended(other: ObjectHandle, layer: SurfaceLayer, phase: ContactPhase) -> Self {
        Self { other, layer, carryable: false, position: Vec2::ZERO, phase, normals: Vec::new() }
    }

    pub fn carryable(mut self) -> Self {
        self.carryable = true;
        self
    }

    /// Есть ли точка контакта "снизу" (поверхность ближе к горизонтали, чем порог)
    pub fn has_ground_normal(&self, threshold: f32) -> bool {
        self.normals.iter().any(|normal| normal.y > threshold)
    }
}

/// Все контакты с прошлого кадра
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactReport {
    pub contacts: Vec<Contact>,
}

impl ContactReport {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }

    pub fn push(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

impl FromIterator<Contact> for ContactReport {
    fn from_iter<I: IntoIterator<Item = Contact>>(iter: I) -> Self {
        Self { contacts: iter.into_iter().collect() }
    }
}

/// Сгруппированные за кадр события одного объекта
#[derive(Debug, Clone, Copy)]
struct FoldedContact {
    layer: SurfaceLayer,
    carryable: bool,
    position: Vec2,
    collided: bool,
    grounding: bool,
    overlapped: bool,
    ended: bool,
    overlap_ended: bool,
}

impl FoldedContact {
    fn staying(&self) -> bool {
        self.collided || self.overlapped
    }
}

/// Side effects, которые controller должен применить через collaborators
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactFold {
    /// Climbable поверхности, которые надо сделать проходимыми (trigger-like)
    pub make_passable: Vec<ObjectHandle>,
    /// Climbable поверхности, которым надо вернуть solidity
    pub restore_solid: Vec<ObjectHandle>,
    /// Carryables в контакте в этом кадре (handle, позиция)
    pub carryable_touches: Vec<(ObjectHandle, Vec2)>,
    /// Carryables, контакт с которыми закончился
    pub carryable_exits: Vec<ObjectHandle>,
    /// Climbable region опустел в этом кадре
    pub climbable_lost: bool,
}

/// Состояние контактов между кадрами
///
/// BTree* — детерминированный порядок обхода (snapshots, логи).
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    grounding: BTreeSet<ObjectHandle>,
    climbables: BTreeMap<ObjectHandle, Vec2>,
    passable: BTreeSet<ObjectHandle>,
}

impl ContactTracker {
    pub fn grounded(&self) -> bool {
        !self.grounding.is_empty()
    }

    pub fn touching_climbable(&self) -> bool {
        !self.climbables.is_empty()
    }

    pub fn is_passable(&self, surface: ObjectHandle) -> bool {
        self.passable.contains(&surface)
    }

    pub fn passable_surfaces(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.passable.iter().copied()
    }

    /// X лестницы для центровки: предпочитаем `preferred` (установленная лестница),
    /// иначе любая climbable поверхность из региона
    pub fn ladder_x(&self, preferred: Option<ObjectHandle>) -> Option<f32> {
        preferred
            .and_then(|handle| self.climbables.get(&handle))
            .or_else(|| self.climbables.values().next())
            .map(|position| position.x)
    }

    /// Fold одного report'а. `ignored` — держимый предмет (его контакты не считаются).
    pub fn fold(&mut self, report: &ContactReport, threshold: f32, ignored: Option<ObjectHandle>) -> ContactFold {
        let had_climbable = self.touching_climbable();
        let mut fold = ContactFold::default();

        for (handle, folded) in group_by_handle(report, threshold, ignored) {
            if folded.layer.supports_standing() {
                if folded.collided {
                    if folded.grounding {
                        self.grounding.insert(handle);
                    } else {
                        self.grounding.remove(&handle);
                    }
                } else if folded.ended {
                    self.grounding.remove(&handle);
                }
            }

            if folded.layer == SurfaceLayer::Climbable {
                // Сбоку — проходим насквозь, сверху — стоим
                if folded.collided && !folded.grounding && self.passable.insert(handle) {
                    fold.make_passable.push(handle);
                }

                if folded.overlapped {
                    self.climbables.insert(handle, folded.position);
                } else if folded.overlap_ended {
                    self.climbables.remove(&handle);
                    if self.passable.remove(&handle) {
                        fold.restore_solid.push(handle);
                    }
                }
            }

            if folded.carryable {
                if folded.staying() {
                    fold.carryable_touches.push((handle, folded.position));
                } else if folded.ended || folded.overlap_ended {
                    fold.carryable_exits.push(handle);
                }
            }
        }

        fold.climbable_lost = had_climbable && !self.touching_climbable();
        fold
    }

    /// Объект уничтожен хостом/контроллером — exit событие для него уже не придёт
    pub fn forget(&mut self, handle: ObjectHandle) {
        self.grounding.remove(&handle);
        self.climbables.remove(&handle);
        self.passable.remove(&handle);
    }

    pub fn clear(&mut self) {
        self.grounding.clear();
        self.climbables.clear();
        self.passable.clear();
    }
}

fn group_by_handle(
    report: &ContactReport,
    threshold: f32,
    ignored: Option<ObjectHandle>,
) -> BTreeMap<ObjectHandle, FoldedContact> {
    let mut grouped: BTreeMap<ObjectHandle, FoldedContact> = BTreeMap::new();

    for contact in report.contacts.iter().filter(|contact| Some(contact.other) != ignored) {
        let entry = grouped.entry(contact.other).or_insert(FoldedContact {
            layer: contact.layer,
            carryable: contact.carryable,
            position: contact.position,
            collided: false,
            grounding: false,
            overlapped: false,
            ended: false,
            overlap_ended: false,
        });

        entry.carryable |= contact.carryable;
        // Позиция берётся из stay событий (у ended она не заполнена)
        if !contact.phase.is_ended() {
            entry.position = contact.position;
        }

        match contact.phase {
            ContactPhase::Collision => {
                entry.collided = true;
                entry.grounding |= contact.has_ground_normal(threshold);
            }
            ContactPhase::CollisionEnded => entry.ended = true,
            ContactPhase::Overlap => entry.overlapped = true,
            ContactPhase::OverlapEnded => entry.overlap_ended = true,
        }
    }

    grouped
}
