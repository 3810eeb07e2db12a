//! Конфигурация PlayerInteractionController
//!
//! Defaults совпадают с тюнингом прототипа (speed 1, jump 5, normal threshold 0.8).
//! Загружается из RON (data-driven тюнинг без перекомпиляции) или собирается кодом.
//! Любая ошибка — `ConfigurationFault` при старте, не посреди кадра.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationFault;
use crate::interaction::PrefabKind;

/// Правила, по которым расходились черновые версии контроллера
///
/// Defaults = каноничный дизайн (отдельная кнопка place, throw без модификатора).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionRules {
    /// Place срабатывает только пока зажат "вниз" (climb < 0)
    pub place_requires_down: bool,
    /// Throw не срабатывает пока зажат "вниз"
    pub throw_blocked_while_down: bool,
    /// Стоя на земле нельзя лезть вниз по лестнице
    pub block_descent_when_grounded: bool,
    /// При лазании центрируем игрока по X лестницы
    pub snap_to_ladder: bool,
    /// Подбор установленной лестницы только при касании climbable
    pub ladder_pickup_requires_touch: bool,
}

impl Default for InteractionRules {
    fn default() -> Self {
        Self {
            place_requires_down: false,
            throw_blocked_while_down: false,
            block_descent_when_grounded: false,
            snap_to_ladder: true,
            ladder_pickup_requires_touch: false,
        }
    }
}

/// Пути префабов лестницы (None = не назначен → ConfigurationFault)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderPrefabs {
    pub held_ladder: Option<String>,
    pub placed_ladder: Option<String>,
}

impl Default for LadderPrefabs {
    fn default() -> Self {
        Self {
            held_ladder: Some("props/ladder_held".to_string()),
            placed_ladder: Some("props/ladder_placed".to_string()),
        }
    }
}

impl LadderPrefabs {
    pub fn path(&self, kind: PrefabKind) -> Option<&str> {
        match kind {
            PrefabKind::HeldLadder => self.held_ladder.as_deref(),
            PrefabKind::PlacedLadder => self.placed_ladder.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Скорость ходьбы и лазания (units/sec)
    pub movement_speed: f32,
    /// Импульс прыжка (вверх)
    pub jump_impulse: f32,
    /// Порог `normal.y` для "ground-like" точки контакта (0.8 ≈ 37° от горизонтали)
    pub grounded_normal_threshold: f32,
    /// Высота держимого предмета над игроком
    pub held_offset: f32,
    /// Offset спавна установленной лестницы
    pub place_offset: f32,
    /// Offset спавна лестницы в руках при подборе
    pub pick_up_offset: f32,
    pub prefabs: LadderPrefabs,
    pub rules: InteractionRules,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            movement_speed: 1.0,
            jump_impulse: 5.0,
            grounded_normal_threshold: 0.8,
            held_offset: 1.03,
            place_offset: 0.5,
            pick_up_offset: 1.0,
            prefabs: LadderPrefabs::default(),
            rules: InteractionRules::default(),
        }
    }
}

impl ControllerConfig {
    /// Парсинг + валидация
    pub fn from_ron(source: &str) -> Result<Self, ConfigurationFault> {
        let config: Self = ron::from_str(source).map_err(|err| ConfigurationFault::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> Result<String, ConfigurationFault> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|err| ConfigurationFault::Parse(err.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigurationFault> {
        for kind in [PrefabKind::HeldLadder, PrefabKind::PlacedLadder] {
            match self.prefabs.path(kind) {
                Some(path) if !path.trim().is_empty() => {}
                _ => return Err(ConfigurationFault::MissingPrefab(kind)),
            }
        }

        check_positive("movement_speed", self.movement_speed)?;
        check_positive("jump_impulse", self.jump_impulse)?;
        check_finite("held_offset", self.held_offset)?;
        check_finite("place_offset", self.place_offset)?;
        check_finite("pick_up_offset", self.pick_up_offset)?;

        // threshold вне [0, 1) делает grounded недостижимым или "всегда"
        let threshold = self.grounded_normal_threshold;
        if !(0.0..1.0).contains(&threshold) {
            return Err(ConfigurationFault::InvalidParameter {
                name: "grounded_normal_threshold",
                value: threshold,
            });
        }

        Ok(())
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), ConfigurationFault> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationFault::InvalidParameter { name, value })
    }
}

fn check_finite(name: &'static str, value: f32) -> Result<(), ConfigurationFault> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationFault::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ControllerConfig::default();
        assert_eq!(config.movement_speed, 1.0);
        assert_eq!(config.jump_impulse, 5.0);
        assert_eq!(config.grounded_normal_threshold, 0.8);
        assert_eq!(config.place_offset, 0.5);
        assert_eq!(config.pick_up_offset, 1.0);
        assert!(config.rules.snap_to_ladder);
        assert!(!config.rules.place_requires_down);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_missing_prefab_is_fault() {
        let mut config = ControllerConfig::default();
        config.prefabs.held_ladder = None;
        assert_eq!(config.validate(), Err(ConfigurationFault::MissingPrefab(PrefabKind::HeldLadder)));

        let mut config = ControllerConfig::default();
        config.prefabs.placed_ladder = Some("   ".to_string());
        assert_eq!(config.validate(), Err(ConfigurationFault::MissingPrefab(PrefabKind::PlacedLadder)));
    }

    #[test]
    fn test_invalid_parameters() {
        let config = ControllerConfig { movement_speed: 0.0, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationFault::InvalidParameter { name: "movement_speed", .. })
        ));

        let config = ControllerConfig { grounded_normal_threshold: 1.0, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationFault::InvalidParameter { name: "grounded_normal_threshold", .. })
        ));

        let config = ControllerConfig { held_offset: f32::NAN, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_ron_partial_uses_defaults() {
        let config = ControllerConfig::from_ron(
            "(movement_speed: 2.5, rules: (place_requires_down: true))",
        )
        .expect("valid ron");

        assert_eq!(config.movement_speed, 2.5);
        assert_eq!(config.jump_impulse, 5.0);
        assert!(config.rules.place_requires_down);
        assert!(config.rules.snap_to_ladder);
    }

    #[test]
    fn test_from_ron_rejects_garbage_and_invalid_values() {
        assert!(matches!(
            ControllerConfig::from_ron("(movement_speed: \"fast\")"),
            Err(ConfigurationFault::Parse(_))
        ));
        assert!(matches!(
            ControllerConfig::from_ron("(jump_impulse: -1.0)"),
            Err(ConfigurationFault::InvalidParameter { name: "jump_impulse", .. })
        ));
        assert!(matches!(
            ControllerConfig::from_ron("(prefabs: (held_ladder: None))"),
            Err(ConfigurationFault::MissingPrefab(PrefabKind::HeldLadder))
        ));
    }

    #[test]
    fn test_ron_roundtrip_preserves_rules() {
        let mut config = ControllerConfig::default();
        config.rules.block_descent_when_grounded = true;

        let text = config.to_ron().expect("serializable");
        let parsed = ControllerConfig::from_ron(&text).expect("parsable");
        assert_eq!(parsed, config);
    }
}
