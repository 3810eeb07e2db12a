//! Intent — snapshot ввода на один кадр

use serde::{Deserialize, Serialize};

/// Per-frame input snapshot
///
/// Оси (`walk`, `climb`) — level-held, клампятся в [-1, 1].
/// Press-флаги — single-frame pulses: controller сбрасывает их в конце кадра
/// через `consume_pulses`, даже если действие не сработало.
///
/// Источник — input mapping хоста (клавиатура, геймпад, скрипт в тестах).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// -1.0 (влево) → +1.0 (вправо)
    pub walk: f32,
    /// -1.0 (вниз) → +1.0 (вверх)
    pub climb: f32,
    pub jump_pressed: bool,
    pub throw_pressed: bool,
    pub place_pressed: bool,
    pub pick_up_pressed: bool,
}

impl Intent {
    pub fn new(walk: f32, climb: f32) -> Self {
        Self {
            walk: clamp_axis(walk),
            climb: clamp_axis(climb),
            ..Default::default()
        }
    }

    pub fn set_walk(&mut self, value: f32) {
        self.walk = clamp_axis(value);
    }

    pub fn set_climb(&mut self, value: f32) {
        self.climb = clamp_axis(value);
    }

    /// Повторный clamp осей: хост мог записать поля напрямую
    pub fn clamp_axes(&mut self) {
        self.walk = clamp_axis(self.walk);
        self.climb = clamp_axis(self.climb);
    }

    pub fn with_jump(mut self) -> Self {
        self.jump_pressed = true;
        self
    }

    pub fn with_throw(mut self) -> Self {
        self.throw_pressed = true;
        self
    }

    pub fn with_place(mut self) -> Self {
        self.place_pressed = true;
        self
    }

    pub fn with_pick_up(mut self) -> Self {
        self.pick_up_pressed = true;
        self
    }

    /// "Вниз" зажат — модификатор для опциональных правил place/throw
    pub fn down_held(&self) -> bool {
        self.climb < 0.0
    }

    pub fn any_pulse(&self) -> bool {
        self.jump_pressed || self.throw_pressed || self.place_pressed || self.pick_up_pressed
    }

    /// Сброс всех edge-triggered флагов (оси не трогаем)
    pub fn consume_pulses(&mut self) {
        self.jump_pressed = false;
        self.throw_pressed = false;
        self.place_pressed = false;
        self.pick_up_pressed = false;
    }
}

/// NaN считаем нулём (сломанный input device не должен двигать игрока)
fn clamp_axis(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}
