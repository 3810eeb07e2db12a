//! In-memory InteractionHost для unit тестов controller'а

use bevy::math::Vec2;
use std::collections::{BTreeMap, BTreeSet};

use super::collaborators::*;
use super::contacts::ContactReport;
use super::state::ObjectHandle;
use crate::error::TransientPhysicsMismatch;

#[derive(Debug, Clone, PartialEq)]
pub struct MockItem {
    pub position: Vec2,
    pub rotation: f32,
    pub kinematic: bool,
    pub impulses: Vec<Vec2>,
}

impl MockItem {
    fn at(position: Vec2) -> Self {
        Self { position, rotation: 0.0, kinematic: false, impulses: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spawned {
    pub handle: ObjectHandle,
    pub kind: PrefabKind,
    pub path: String,
    pub position: Vec2,
}

#[derive(Debug, Default)]
pub struct MockHost {
    pub position: Vec2,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub impulses: Vec<Vec2>,
    pub pending_contacts: ContactReport,

    /// Carryables (включая заспавненные held ladders)
    pub items: BTreeMap<ObjectHandle, MockItem>,
    /// Существующие поверхности → solid
    pub surfaces: BTreeMap<ObjectHandle, bool>,
    pub spawned: Vec<Spawned>,
    pub destroyed: Vec<ObjectHandle>,
    next_handle: u64,

    pub facing: Option<f32>,
    pub moving: bool,
    pub sounds: Vec<SoundCategory>,
}

impl MockHost {
    pub fn new() -> Self {
        Self { gravity_scale: 1.0, next_handle: 1000, ..Default::default() }
    }

    pub fn at(position: Vec2) -> Self {
        Self { position, ..Self::new() }
    }

    pub fn add_item(&mut self, handle: ObjectHandle, position: Vec2) {
        self.items.insert(handle, MockItem::at(position));
    }

    pub fn add_surface(&mut self, handle: ObjectHandle) {
        self.surfaces.insert(handle, true);
    }

    pub fn last_spawned(&self) -> Option<&Spawned> {
        self.spawned.last()
    }

    pub fn live_objects(&self) -> BTreeSet<ObjectHandle> {
        self.items.keys().chain(self.surfaces.keys()).copied().collect()
    }
}

impl PhysicsBody for MockHost {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn apply_impulse(&mut self, impulse: Vec2) {
        self.impulses.push(impulse);
        self.velocity += impulse;
    }

    fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }

    fn take_contacts(&mut self) -> ContactReport {
        std::mem::take(&mut self.pending_contacts)
    }

    fn set_surface_solid(&mut self, surface: ObjectHandle, solid: bool) -> Result<(), TransientPhysicsMismatch> {
        let slot = self.surfaces.get_mut(&surface).ok_or(TransientPhysicsMismatch::NotSurface(surface))?;
        *slot = solid;
        Ok(())
    }
}

impl Carryables for MockHost {
    fn item_exists(&self, item: ObjectHandle) -> bool {
        self.items.contains_key(&item)
    }

    fn throw_item(&mut self, item: ObjectHandle, direction: Vec2) -> Result<(), TransientPhysicsMismatch> {
        let entry = self.items.get_mut(&item).ok_or(TransientPhysicsMismatch::StaleHandle(item))?;
        entry.impulses.push(direction);
        Ok(())
    }

    fn set_item_kinematic(&mut self, item: ObjectHandle, kinematic: bool) -> Result<(), TransientPhysicsMismatch> {
        let entry = self.items.get_mut(&item).ok_or(TransientPhysicsMismatch::StaleHandle(item))?;
        entry.kinematic = kinematic;
        Ok(())
    }

    fn attach_item(&mut self, item: ObjectHandle, position: Vec2, rotation: f32) -> Result<(), TransientPhysicsMismatch> {
        let entry = self.items.get_mut(&item).ok_or(TransientPhysicsMismatch::StaleHandle(item))?;
        entry.position = position;
        entry.rotation = rotation;
        Ok(())
    }
}

impl SpawnService for MockHost {
    fn spawn(&mut self, kind: PrefabKind, prefab_path: &str, position: Vec2, _rotation: f32) -> ObjectHandle {
        self.next_handle += 1;
        let handle = ObjectHandle(self.next_handle);

        match kind {
            PrefabKind::HeldLadder => self.add_item(handle, position),
            PrefabKind::PlacedLadder => self.add_surface(handle),
        }

        self.spawned.push(Spawned { handle, kind, path: prefab_path.to_string(), position });
        handle
    }

    fn destroy(&mut self, object: ObjectHandle) -> Result<(), TransientPhysicsMismatch> {
        let removed = self.items.remove(&object).is_some() | self.surfaces.remove(&object).is_some();
        if !removed {
            return Err(TransientPhysicsMismatch::StaleHandle(object));
        }
        self.destroyed.push(object);
        Ok(())
    }
}

impl Presentation for MockHost {
    fn set_facing(&mut self, sign: f32) {
        self.facing = Some(sign);
    }

    fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }

    fn play_sound(&mut self, category: SoundCategory) {
        self.sounds.push(category);
    }
}
