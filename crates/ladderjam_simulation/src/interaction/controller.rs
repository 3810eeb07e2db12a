//! PlayerInteractionController — per-frame state machine игрока
//!
//! Порядок кадра (`on_frame`):
//! 0. fold контактов с прошлого кадра (grounded / climbable / carryable)
//! 1. горизонтальное движение
//! 2. одно действие за кадр: place > throw > pick-up (первое сработавшее)
//! 3. лазание
//! 4. прыжок
//! 5. интеграция motion → position
//! 6. держимый предмет над головой
//! 7. presentation (facing, moving flag)
//! 8. сброс press-флагов intent'а
//!
//! Ошибки collaborators (`TransientPhysicsMismatch`) не выходят из кадра:
//! warning в лог, событие дропается.

use bevy::math::Vec2;

use super::collaborators::{InteractionHost, PrefabKind, SoundCategory};
use super::contacts::{ContactReport, ContactTracker};
use super::intent::Intent;
use super::state::{HeldItem, ObjectHandle, PlayerState};
use crate::config::ControllerConfig;
use crate::error::{ConfigurationFault, TransientPhysicsMismatch};
use crate::logger::{log, log_info, log_warning};

const GRAVITY_ON: f32 = 1.0;
const GRAVITY_OFF: f32 = 0.0;

/// Действие, выбранное в шаге 2 (не более одного за кадр)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    Place,
    Throw,
    PickUp,
}

/// Итог кадра (для логов / тестов / host событий)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOutcome {
    pub action: Option<FrameAction>,
    pub jumped: bool,
    /// Controller motion за кадр (без физической velocity тела)
    pub motion: Vec2,
}

#[derive(Debug, Clone)]
pub struct PlayerInteractionController {
    config: ControllerConfig,
    state: PlayerState,
    contacts: ContactTracker,
    /// Собственная kinematic скорость контроллера (walk/climb), отдельно от физики тела
    motion: Vec2,
    enabled: bool,
}

impl PlayerInteractionController {
    /// Fail fast: невалидный конфиг / неназначенные префабы → ConfigurationFault
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigurationFault> {
        config.validate()?;

        Ok(Self {
            config,
            state: PlayerState::default(),
            contacts: ContactTracker::default(),
            motion: Vec2::ZERO,
            enabled: false,
        })
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn motion(&self) -> Vec2 {
        self.motion
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn contacts(&self) -> &ContactTracker {
        &self.contacts
    }

    pub fn on_enable(&mut self, host: &mut impl InteractionHost) {
        self.enabled = true;
        host.set_gravity_scale(GRAVITY_ON);
        log_info(&format!("PlayerInteractionController enabled ({})", self.state.phase()));
    }

    /// Откат всех изменений, которые controller навязал миру
    pub fn on_disable(&mut self, host: &mut impl InteractionHost) {
        for surface in self.contacts.passable_surfaces().collect::<Vec<_>>() {
            if let Err(err) = host.set_surface_solid(surface, true) {
                log_warning(&format!("on_disable: cannot restore solidity: {}", err));
            }
        }
        self.contacts.clear();

        self.state.grounded = false;
        self.state.touching_climbable = false;
        self.state.climbing = false;
        self.state.touched_carryable = None;
        self.motion = Vec2::ZERO;
        host.set_gravity_scale(GRAVITY_ON);

        self.enabled = false;
        log_info(&format!("PlayerInteractionController disabled ({})", self.state.phase()));
    }

    /// Кадр с контактами из PhysicsBody
    pub fn step(&mut self, intent: &mut Intent, host: &mut impl InteractionHost, dt: f32) -> FrameOutcome {
        let contacts = host.take_contacts();
        self.on_frame(intent, &contacts, host, dt)
    }

    pub fn on_frame(
        &mut self,
        intent: &mut Intent,
        contacts: &ContactReport,
        host: &mut impl InteractionHost,
        dt: f32,
    ) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();

        if !self.enabled {
            intent.consume_pulses();
            return outcome;
        }

        intent.clamp_axes();
        let phase_before = self.state.phase();

        self.apply_contacts(contacts, host);

        // 1. Horizontal: на лестнице в воздухе не дрейфуем
        self.motion.x = if self.state.climbing && !self.state.grounded {
            0.0
        } else {
            intent.walk * self.config.movement_speed
        };

        // 2. Actions
        outcome.action = self.resolve_action(intent, host);

        // 3. Climb
        self.resolve_climb(intent, host);

        // 4. Jump
        if intent.jump_pressed && (self.state.grounded || self.state.climbing) {
            host.apply_impulse(Vec2::Y * self.config.jump_impulse);
            host.play_sound(SoundCategory::Jump);
            outcome.jumped = true;
            log("jump");
        }

        // 5. Apply motion (explicit Euler)
        let position = host.position() + self.motion * dt;
        host.set_position(position);

        // 6. Held item над головой, kinematic пока держим
        self.track_held_item(position, host);

        // 7. Presentation
        if self.motion.x != 0.0 {
            host.set_facing(self.motion.x.signum());
        }
        host.set_moving(self.motion.x.abs() > 0.0);

        // 8. Pulses
        intent.consume_pulses();

        let phase_after = self.state.phase();
        if phase_after != phase_before {
            log(&format!("phase {} → {}", phase_before, phase_after));
        }

        outcome.motion = self.motion;
        outcome
    }

    // ------------------------------------------------------------------
    // Contacts
    // ------------------------------------------------------------------

    fn apply_contacts(&mut self, report: &ContactReport, host: &mut impl InteractionHost) {
        let threshold = self.config.grounded_normal_threshold;
        let fold = self.contacts.fold(report, threshold, self.state.held_handle());

        for surface in fold.make_passable {
            if let Err(err) = host.set_surface_solid(surface, false) {
                self.drop_stale(err);
            }
        }

        for surface in fold.restore_solid {
            if let Err(err) = host.set_surface_solid(surface, true) {
                self.drop_stale(err);
            }
        }

        // Exits до stays: устаревший exit не затирает более свежий touch
        for exited in fold.carryable_exits {
            if self.state.touched_carryable == Some(exited) {
                self.state.touched_carryable = None;
            }
        }

        let player = host.position();
        let nearest = fold
            .carryable_touches
            .iter()
            .filter(|(handle, _)| {
                if host.item_exists(*handle) {
                    true
                } else {
                    log_warning(&format!("contact with vanished carryable {} dropped", handle));
                    false
                }
            })
            .min_by(|(_, a), (_, b)| a.distance_squared(player).total_cmp(&b.distance_squared(player)))
            .map(|(handle, _)| *handle);

        if let Some(handle) = nearest {
            self.state.touched_carryable = Some(handle);
        }

        self.state.grounded = self.contacts.grounded();
        self.state.touching_climbable = self.contacts.touching_climbable();

        if fold.climbable_lost {
            self.state.climbing = false;
            host.set_gravity_scale(GRAVITY_ON);
        }
    }

    /// TransientPhysicsMismatch: лог + забываем handle везде, где он мог застрять
    fn drop_stale(&mut self, err: TransientPhysicsMismatch) {
        log_warning(&format!("physics mismatch dropped: {}", err));
        let handle = err.handle();
        self.contacts.forget(handle);
        self.state.touching_climbable = self.contacts.touching_climbable();
        self.state.grounded = self.contacts.grounded();
        if self.state.touched_carryable == Some(handle) {
            self.state.touched_carryable = None;
        }
        if self.state.held_handle() == Some(handle) {
            self.state.held_item = None;
        }
    }

    // ------------------------------------------------------------------
    // Actions (place > throw > pick-up)
    // ------------------------------------------------------------------

    fn resolve_action(&mut self, intent: &Intent, host: &mut impl InteractionHost) -> Option<FrameAction> {
        let rules = self.config.rules;

        if intent.place_pressed && (!rules.place_requires_down || intent.down_held()) {
            if let Some(held) = self.state.held_item {
                self.place(held, host);
                return Some(FrameAction::Place);
            }
        }

        if intent.throw_pressed && !(rules.throw_blocked_while_down && intent.down_held()) {
            if let Some(held) = self.state.held_item {
                self.throw(held, host);
                return Some(FrameAction::Throw);
            }
        }

        if intent.pick_up_pressed && self.state.held_item.is_none() && self.pick_up(host) {
            return Some(FrameAction::PickUp);
        }

        None
    }

    fn place(&mut self, held: HeldItem, host: &mut impl InteractionHost) {
        self.destroy_object(held.handle, host);
        self.state.held_item = None;

        // Replacement: вторая лестница вытесняет первую
        if let Some(previous) = self.state.placed_ladder.take() {
            self.destroy_object(previous, host);
        }

        let position = host.position() + Vec2::new(0.0, self.config.place_offset);
        let ladder = self.spawn_prefab(PrefabKind::PlacedLadder, position, host);

        self.state.placed_ladder = Some(ladder);
        self.state.ladder_placed = true;
        log_info(&format!("ladder {} placed at ({:.2}, {:.2})", ladder, position.x, position.y));
    }

    fn throw(&mut self, held: HeldItem, host: &mut impl InteractionHost) {
        // sign(0) → +1 (tie-break)
        let direction = if self.motion.x < 0.0 { -1.0 } else { 1.0 };

        self.state.held_item = None;

        let thrown = host
            .set_item_kinematic(held.handle, false)
            .and_then(|_| host.throw_item(held.handle, Vec2::new(direction, 0.0)));

        match thrown {
            Ok(()) => {
                host.play_sound(SoundCategory::Throw);
                log(&format!("threw {} (direction {})", held.handle, direction));
            }
            Err(err) => self.drop_stale(err),
        }
    }

    /// true если что-то подобрали
    fn pick_up(&mut self, host: &mut impl InteractionHost) -> bool {
        let ladder_reachable = !self.config.rules.ladder_pickup_requires_touch || self.state.touching_climbable;

        if self.state.ladder_placed && ladder_reachable {
            if let Some(placed) = self.state.placed_ladder.take() {
                self.destroy_object(placed, host);
            }
            self.state.ladder_placed = false;
            self.state.climbing = false;
            host.set_gravity_scale(GRAVITY_ON);

            let position = host.position() + Vec2::new(0.0, self.config.pick_up_offset);
            let ladder = self.spawn_prefab(PrefabKind::HeldLadder, position, host);
            self.state.held_item = Some(HeldItem::ladder(ladder));

            host.play_sound(SoundCategory::PickUp);
            log_info(&format!("picked up placed ladder → held {}", ladder));
            return true;
        }

        let Some(touched) = self.state.touched_carryable else {
            return false;
        };

        if !host.item_exists(touched) {
            self.drop_stale(TransientPhysicsMismatch::StaleHandle(touched));
            return false;
        }

        // Touch поглощён: предмет теперь в руках
        self.state.touched_carryable = None;
        self.state.held_item = Some(HeldItem::carryable(touched));
        host.play_sound(SoundCategory::PickUp);
        log(&format!("picked up carryable {}", touched));
        true
    }

    fn spawn_prefab(&self, kind: PrefabKind, position: Vec2, host: &mut impl InteractionHost) -> ObjectHandle {
        // validate() в new() гарантирует Some
        let path = self.config.prefabs.path(kind).unwrap_or_default();
        host.spawn(kind, path, position, 0.0)
    }

    fn destroy_object(&mut self, handle: ObjectHandle, host: &mut impl InteractionHost) {
        if let Err(err) = host.destroy(handle) {
            log_warning(&format!("destroy skipped: {}", err));
        }
        self.contacts.forget(handle);
        self.state.grounded = self.contacts.grounded();
        self.state.touching_climbable = self.contacts.touching_climbable();
        if self.state.touched_carryable == Some(handle) {
            self.state.touched_carryable = None;
        }
    }

    // ------------------------------------------------------------------
    // Climb
    // ------------------------------------------------------------------

    fn resolve_climb(&mut self, intent: &Intent, host: &mut impl InteractionHost) {
        let descent_blocked =
            self.config.rules.block_descent_when_grounded && intent.climb < 0.0 && self.state.grounded;

        if self.state.can_climb() && intent.climb != 0.0 && !descent_blocked {
            self.motion.y = intent.climb * self.config.movement_speed;

            // Физика не должна тянуть вниз, пока держимся за лестницу
            let mut velocity = host.velocity();
            velocity.y = 0.0;
            host.set_velocity(velocity);

            if self.config.rules.snap_to_ladder {
                if let Some(ladder_x) = self.contacts.ladder_x(self.state.placed_ladder) {
                    let mut position = host.position();
                    position.x = ladder_x;
                    host.set_position(position);
                }
            }

            host.set_gravity_scale(GRAVITY_OFF);
            self.state.climbing = true;
        } else {
            self.motion.y = 0.0;
            host.set_gravity_scale(GRAVITY_ON);
            self.state.climbing = false;
        }
    }

    // ------------------------------------------------------------------
    // Held item
    // ------------------------------------------------------------------

    fn track_held_item(&mut self, position: Vec2, host: &mut impl InteractionHost) {
        let Some(held) = self.state.held_item else {
            return;
        };

        let anchor = position + Vec2::new(0.0, self.config.held_offset);
        let attached = host
            .set_item_kinematic(held.handle, true)
            .and_then(|_| host.attach_item(held.handle, anchor, 0.0));

        if let Err(err) = attached {
            self.drop_stale(err);
        }
    }
}
