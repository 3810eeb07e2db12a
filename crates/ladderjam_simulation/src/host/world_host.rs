//! WorldHost — InteractionHost поверх `&mut World`
//!
//! Один адаптер реализует все четыре collaborator trait'а: controller шагает внутри
//! exclusive system, поэтому отдельные `Query` на каждый trait не нужны
//! (и не было бы конфликтов заимствования).

use bevy::prelude::*;
use rand::Rng;

use super::components::*;
use crate::error::TransientPhysicsMismatch;
use crate::interaction::{
    Carryables, ContactReport, ObjectHandle, PhysicsBody, PrefabKind, Presentation, SoundCategory, SpawnService,
    SurfaceLayer,
};
use crate::logger::log_error;
use crate::DeterministicRng;

pub struct WorldHost<'w> {
    world: &'w mut World,
    player: Entity,
}

impl<'w> WorldHost<'w> {
    pub fn new(world: &'w mut World, player: Entity) -> Self {
        world.init_resource::<ObjectRegistry>();
        world.init_resource::<HostConfig>();
        Self { world, player }
    }

    fn entity_of(&self, handle: ObjectHandle) -> Result<Entity, TransientPhysicsMismatch> {
        self.world
            .resource::<ObjectRegistry>()
            .entity(handle)
            .filter(|entity| self.world.get_entity(*entity).is_ok())
            .ok_or(TransientPhysicsMismatch::StaleHandle(handle))
    }

    fn carryable_entity(&self, item: ObjectHandle) -> Result<Entity, TransientPhysicsMismatch> {
        let entity = self.entity_of(item)?;
        if self.world.get::<CarryableItem>(entity).is_none() {
            return Err(TransientPhysicsMismatch::NotCarryable(item));
        }
        Ok(entity)
    }

    fn with_player_body(&mut self, update: impl FnOnce(&mut KinematicBody)) {
        match self.world.get_mut::<KinematicBody>(self.player) {
            Some(mut body) => update(&mut body),
            None => log_error(&format!("WorldHost: player {:?} has no KinematicBody", self.player)),
        }
    }

    fn player_body(&self) -> KinematicBody {
        self.world.get::<KinematicBody>(self.player).copied().unwrap_or_default()
    }

    /// pitch/volume из seeded RNG (без ресурса — нейтральные 1.0)
    fn sound_variation(&mut self) -> (f32, f32) {
        let (min, max) = self.world.resource::<HostConfig>().sound_variation;
        let Some(mut rng) = self.world.get_resource_mut::<DeterministicRng>() else {
            return (1.0, 1.0);
        };
        if min >= max {
            return (min, min);
        }
        (rng.rng.gen_range(min..=max), rng.rng.gen_range(min..=max))
    }
}

impl PhysicsBody for WorldHost<'_> {
    fn position(&self) -> Vec2 {
        self.world
            .get::<Transform>(self.player)
            .map(|transform| transform.translation.truncate())
            .unwrap_or_default()
    }

    fn set_position(&mut self, position: Vec2) {
        if let Some(mut transform) = self.world.get_mut::<Transform>(self.player) {
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
    }

    fn velocity(&self) -> Vec2 {
        self.player_body().velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.with_player_body(|body| body.velocity = velocity);
    }

    fn apply_impulse(&mut self, impulse: Vec2) {
        self.with_player_body(|body| {
            let mass = body.mass.max(f32::EPSILON);
            body.velocity += impulse / mass;
        });
    }

    fn gravity_scale(&self) -> f32 {
        self.player_body().gravity_scale
    }

    fn set_gravity_scale(&mut self, scale: f32) {
        self.with_player_body(|body| body.gravity_scale = scale);
    }

    fn take_contacts(&mut self) -> ContactReport {
        self.world
            .get_mut::<ContactInbox>(self.player)
            .map(|mut inbox| std::mem::take(&mut inbox.0))
            .unwrap_or_default()
    }

    fn set_surface_solid(&mut self, surface: ObjectHandle, solid: bool) -> Result<(), TransientPhysicsMismatch> {
        let entity = self.entity_of(surface)?;
        let mut target = self
            .world
            .get_mut::<Surface>(entity)
            .ok_or(TransientPhysicsMismatch::NotSurface(surface))?;
        target.solid = solid;
        Ok(())
    }
}

impl Carryables for WorldHost<'_> {
    fn item_exists(&self, item: ObjectHandle) -> bool {
        self.carryable_entity(item).is_ok()
    }

    fn throw_item(&mut self, item: ObjectHandle, direction: Vec2) -> Result<(), TransientPhysicsMismatch> {
        let entity = self.carryable_entity(item)?;
        let force = self.world.get::<CarryableItem>(entity).map(|c| c.throw_force).unwrap_or_default();
        let mut body = self
            .world
            .get_mut::<KinematicBody>(entity)
            .ok_or(TransientPhysicsMismatch::StaleHandle(item))?;
        // Impulse: Δv = F / m
        let mass = body.mass.max(f32::EPSILON);
        body.velocity += direction * force / mass;
        Ok(())
    }

    fn set_item_kinematic(&mut self, item: ObjectHandle, kinematic: bool) -> Result<(), TransientPhysicsMismatch> {
        let entity = self.carryable_entity(item)?;
        let mut body = self
            .world
            .get_mut::<KinematicBody>(entity)
            .ok_or(TransientPhysicsMismatch::StaleHandle(item))?;
        if kinematic && !body.kinematic {
            body.velocity = Vec2::ZERO;
        }
        body.kinematic = kinematic;
        Ok(())
    }

    fn attach_item(&mut self, item: ObjectHandle, position: Vec2, rotation: f32) -> Result<(), TransientPhysicsMismatch> {
        let entity = self.carryable_entity(item)?;
        let mut transform = self
            .world
            .get_mut::<Transform>(entity)
            .ok_or(TransientPhysicsMismatch::StaleHandle(item))?;
        transform.translation.x = position.x;
        transform.translation.y = position.y;
        transform.rotation = Quat::from_rotation_z(rotation);
        Ok(())
    }
}

impl SpawnService for WorldHost<'_> {
    fn spawn(&mut self, kind: PrefabKind, prefab_path: &str, position: Vec2, rotation: f32) -> ObjectHandle {
        let config = self.world.resource::<HostConfig>().clone();
        let transform = Transform::from_xyz(position.x, position.y, 0.0).with_rotation(Quat::from_rotation_z(rotation));

        let mut entity = self.world.spawn((transform, LadderProp, PrefabPath(prefab_path.to_string())));
        match kind {
            PrefabKind::HeldLadder => {
                entity.insert((
                    BodyShape::new(config.held_ladder_size.0, config.held_ladder_size.1),
                    CarryableItem { throw_force: config.throw_force },
                    KinematicBody { kinematic: true, mass: config.prop_mass, ..Default::default() },
                ));
            }
            PrefabKind::PlacedLadder => {
                entity.insert((
                    BodyShape::new(config.placed_ladder_size.0, config.placed_ladder_size.1),
                    Surface { layer: SurfaceLayer::Climbable, solid: true },
                ));
            }
        }
        let entity = entity.id();

        let handle = self.world.resource_mut::<ObjectRegistry>().register(entity);
        self.world.entity_mut(entity).insert(ObjectId(handle));
        handle
    }

    fn destroy(&mut self, object: ObjectHandle) -> Result<(), TransientPhysicsMismatch> {
        let entity = self
            .world
            .resource_mut::<ObjectRegistry>()
            .remove(object)
            .ok_or(TransientPhysicsMismatch::StaleHandle(object))?;
        if !self.world.despawn(entity) {
            return Err(TransientPhysicsMismatch::StaleHandle(object));
        }
        Ok(())
    }
}

impl Presentation for WorldHost<'_> {
    fn set_facing(&mut self, sign: f32) {
        if let Some(mut facing) = self.world.get_mut::<Facing>(self.player) {
            facing.0 = sign;
        }
    }

    fn set_moving(&mut self, moving: bool) {
        if let Some(mut flag) = self.world.get_mut::<MovingFlag>(self.player) {
            flag.0 = moving;
        }
    }

    fn play_sound(&mut self, category: SoundCategory) {
        let (pitch, volume) = self.sound_variation();
        let position = self.position();
        self.world.send_event(SoundCue { category, position, pitch, volume });
    }
}
