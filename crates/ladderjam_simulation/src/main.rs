//! Headless симуляция Ladderjam
//!
//! Скриптованный сценарий: подойти к ящику, поднять, поставить лестницу,
//! залезть наверх, спрыгнуть. Печатает snapshot игрока каждые 30 тиков.
//!
//! `LADDERJAM_LOG=info` прячет debug шум controller'а.

use bevy::prelude::*;
use ladderjam_simulation::*;

/// (с какого тика, intent)
fn script() -> Vec<(u32, Intent)> {
    vec![
        (0, Intent::new(1.0, 0.0)),
        (90, Intent::default().with_pick_up()),
        (91, Intent::default()),
        (120, Intent::default().with_place()),
        (121, Intent::default()),
        (130, Intent::new(0.0, 1.0)),
        (260, Intent::new(-1.0, 0.0).with_jump()),
        (261, Intent::new(-1.0, 0.0)),
        (320, Intent::default()),
    ]
}

fn main() {
    init_logger_from_env();
    let seed = 42;
    log_info(&format!("Starting Ladderjam headless simulation (seed: {})", seed));

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    let world = app.world_mut();
    spawn_surface(world, Vec2::new(0.0, -1.0), Vec2::new(100.0, 1.0), SurfaceLayer::Ground);
    spawn_carryable(world, Vec2::new(1.5, -0.25), Vec2::new(0.5, 0.5));

    let player = match spawn_player(world, Vec2::ZERO, ControllerConfig::default()) {
        Ok(player) => player,
        Err(err) => {
            log_error(&format!("cannot spawn player: {}", err));
            std::process::exit(1);
        }
    };

    let script = script();
    for tick in 0..400u32 {
        if let Some((_, intent)) = script.iter().rev().find(|(start, _)| *start <= tick) {
            // Pulse-флаги живут один тик: повторно не выставляем
            let already_applied = script.iter().any(|(start, _)| *start == tick);
            let intent = if already_applied { *intent } else { Intent::new(intent.walk, intent.climb) };
            if let Some(mut current) = app.world_mut().get_mut::<PlayerIntent>(player) {
                current.0 = intent;
            }
        }

        step_fixed(&mut app);

        for cue in app.world_mut().resource_mut::<Events<SoundCue>>().drain() {
            log(&format!("tick {}: sound {:?} (pitch {:.2})", tick, cue.category, cue.pitch));
        }

        if tick % 30 == 0 {
            if let Some(snapshot) = player_snapshot(app.world(), player) {
                match snapshot.to_ron() {
                    Ok(ron) => log_info(&format!("Tick {}: {}", tick, ron)),
                    Err(err) => log_error(&format!("snapshot: {}", err)),
                }
            }
        }
    }

    log_info("Simulation complete!");
}
