//! Минимальная 2D физика хоста: гравитация, интеграция, AABB contact probe
//!
//! Не претендует на настоящий solver: достаточно, чтобы controller получал
//! collision/overlap события (с нормалями) в headless симуляции.
//!
//! dt = `Time<Fixed>::timestep()` — шаг не зависит от реального времени.

use bevy::prelude::*;
use std::collections::BTreeMap;

use super::components::*;
use crate::interaction::{Contact, SurfaceLayer};

/// Зазор, в пределах которого тела считаются касающимися (стоим на полу без проникновения)
pub const CONTACT_SKIN: f32 = 0.01;

/// Пересечение двух AABB
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Нормаль от `other` к `body` по оси минимального проникновения
    pub normal: Vec2,
    /// Глубина по этой оси (<= 0 → касание в пределах skin)
    pub depth: f32,
}

/// AABB тест с учётом `CONTACT_SKIN`
pub fn aabb_penetration(body: Vec2, body_half: Vec2, other: Vec2, other_half: Vec2) -> Option<Penetration> {
    let delta = body - other;
    let overlap = body_half + other_half - delta.abs();

    if overlap.x < -CONTACT_SKIN || overlap.y < -CONTACT_SKIN {
        return None;
    }

    // delta == 0 по оси → выталкиваем вверх / вправо
    let sign = |value: f32| if value < 0.0 { -1.0 } else { 1.0 };

    let penetration = if overlap.y <= overlap.x {
        Penetration { normal: Vec2::new(0.0, sign(delta.y)), depth: overlap.y }
    } else {
        Penetration { normal: Vec2::new(sign(delta.x), 0.0), depth: overlap.x }
    };
    Some(penetration)
}

/// Гравитация → velocity (kinematic тела пропускаем)
pub fn apply_gravity(mut bodies: Query<&mut KinematicBody>, time: Res<Time<Fixed>>, config: Res<HostConfig>) {
    let delta = time.timestep().as_secs_f32();

    for mut body in bodies.iter_mut() {
        if !body.kinematic {
            body.velocity.y += config.gravity * body.gravity_scale * delta;
        }
    }
}

/// velocity → Transform (explicit Euler)
pub fn integrate_bodies(mut bodies: Query<(&KinematicBody, &mut Transform)>, time: Res<Time<Fixed>>) {
    let delta = time.timestep().as_secs_f32();

    for (body, mut transform) in bodies.iter_mut() {
        if !body.kinematic {
            transform.translation += (body.velocity * delta).extend(0.0);
        }
    }
}

/// Брошенные/упавшие carryables не проваливаются сквозь solid поверхности
pub fn settle_carryables(
    mut items: Query<(&mut Transform, &mut KinematicBody, &BodyShape), (With<CarryableItem>, Without<Surface>)>,
    surfaces: Query<(&Transform, &BodyShape, &Surface), Without<CarryableItem>>,
) {
    for (mut transform, mut body, shape) in items.iter_mut() {
        if body.kinematic {
            continue;
        }

        for (surface_transform, surface_shape, surface) in surfaces.iter() {
            if !surface.solid {
                continue;
            }
            let Some(hit) = aabb_penetration(
                transform.translation.truncate(),
                shape.half_extents,
                surface_transform.translation.truncate(),
                surface_shape.half_extents,
            ) else {
                continue;
            };
            resolve(&mut transform, &mut body, hit);

            // Трение о пол: предмет останавливается после приземления
            if hit.normal.y > 0.0 {
                body.velocity.x = 0.0;
            }
        }
    }
}

/// AABB probe игрока против всех объектов → ContactInbox
///
/// Правила:
/// - solid Surface → Collision (нормаль по оси минимального проникновения) + выталкивание
/// - Climbable → дополнительно Overlap (регион лазания), сбоку не выталкивает
/// - non-solid Surface / carryable → Overlap
/// - объект, который был в контакте в прошлом кадре и пропал → ended события
pub fn probe_contacts(
    mut players: Query<
        (&mut Transform, &mut KinematicBody, &BodyShape, &mut ContactMemory, &mut ContactInbox),
        With<Player>,
    >,
    objects: Query<(&ObjectId, &Transform, &BodyShape, Option<&Surface>, Option<&CarryableItem>), Without<Player>>,
) {
    for (mut transform, mut body, shape, mut memory, mut inbox) in players.iter_mut() {
        let mut touching = BTreeMap::new();

        for (id, other_transform, other_shape, surface, carryable) in objects.iter() {
            let other_position = other_transform.translation.truncate();
            let Some(hit) = aabb_penetration(
                transform.translation.truncate(),
                shape.half_extents,
                other_position,
                other_shape.half_extents,
            ) else {
                continue;
            };

            let layer = surface.map(|s| s.layer).unwrap_or(SurfaceLayer::Other);
            let is_carryable = carryable.is_some();
            let solid = surface.is_some_and(|s| s.solid);
            let mut remembered = RememberedContact { layer, carryable: is_carryable, collided: false, overlapped: false };

            if solid {
                let mut contact = Contact::collision(id.0, layer, other_position, vec![hit.normal]);
                contact.carryable = is_carryable;
                inbox.0.push(contact);
                remembered.collided = true;

                // Лестницу сбоку не выталкиваем: controller сам сделает её проходимой
                let side_of_ladder = layer == SurfaceLayer::Climbable && hit.normal.y == 0.0;
                if !side_of_ladder {
                    resolve(&mut transform, &mut body, hit);
                }
            }

            if !solid || layer == SurfaceLayer::Climbable {
                let mut contact = Contact::overlap(id.0, layer, other_position);
                contact.carryable = is_carryable;
                inbox.0.push(contact);
                remembered.overlapped = true;
            }

            touching.insert(id.0, remembered);
        }

        for (handle, previous) in memory.touching.iter() {
            let current = touching.get(handle);
            let lost_collision = previous.collided && !current.is_some_and(|c| c.collided);
            let lost_overlap = previous.overlapped && !current.is_some_and(|c| c.overlapped);

            let gone = RememberedContact { collided: lost_collision, overlapped: lost_overlap, ..*previous };
            for phase in gone.ended_phases() {
                let mut contact = Contact::ended(*handle, previous.layer, phase);
                contact.carryable = previous.carryable;
                inbox.0.push(contact);
            }
        }

        memory.touching = touching;
    }
}

/// Выталкивание по нормали + гашение скорости, направленной в поверхность
fn resolve(transform: &mut Transform, body: &mut KinematicBody, hit: Penetration) {
    if hit.depth > 0.0 {
        transform.translation += (hit.normal * hit.depth).extend(0.0);
    }

    let into_surface = body.velocity.dot(hit.normal);
    if into_surface < 0.0 {
        body.velocity -= hit.normal * into_surface;
    }
}
