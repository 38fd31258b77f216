/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::error::Error;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::content::new_game;
use sim::draw::draw;
use sim::event::GameEvent;
use sim::map;
use sim::step::{step, FrameInput};
use sim::world::SimulationState;
use ui::gamepad::GamepadState;
use ui::input::*;
use ui::renderer::Renderer;
use ui::sound::{Sfx, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() -> ExitCode {
    let config = GameConfig::load();

    // Terminal belongs to the renderer, so logs go to a file only.
    let _log_guard = match setup_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e}");
            None
        }
    };
    for w in &config.warnings {
        warn!("{w}");
    }
    info!(
        tick_ms = config.timing.tick_rate_ms,
        map = %config.map_file.display(),
        seed = ?config.seed,
        "starting"
    );

    let grid = match map::load(&config.map_file) {
        Ok(Some(grid)) => grid,
        Ok(None) => {
            info!("no map file; using the built-in world");
            map::builtin()
        }
        Err(e) => {
            error!(error = %e, "map load failed");
            eprintln!("Map error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut state = match new_game(grid, config.seed) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "map does not fit the world");
            eprintln!("Map error: {e}");
            return ExitCode::FAILURE;
        }
    };
    state.message_ticks = config.timing.message_ticks;
    let hint = state.quest.objective();
    state.set_message(hint);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        error!(error = %e, "terminal init failed");
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut state, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(()) => {
            info!(quest = ?state.quest, ticks = state.tick, "exit");
            println!();
            println!("Thanks for playing Hero Adventure!");
            println!("Quest: {}", state.quest.objective());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "game loop failed");
            eprintln!("Game error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// File-only subscriber under `log_dir/game.log`. RUST_LOG overrides the
/// default `info` filter. The returned guard flushes on drop.
fn setup_logging(log_dir: &Path) -> io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::never(log_dir, "game.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
    Ok(guard)
}

fn game_loop(
    state: &mut SimulationState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);
    let mut last_tick = Instant::now();

    // Presses seen between ticks wait here for the next step.
    let mut pending = FrameInput::default();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            info!("quit requested");
            break;
        }
        latch_actions(&mut pending, &kb, &gp);

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();

            let (dx, dy) = detect_movement(&kb, &gp);
            let input = FrameInput { dx, dy, ..std::mem::take(&mut pending) };
            let events = step(state, input);
            process_sound_events(sound, &events);

            renderer.begin_frame()?;
            draw(state, renderer);
            renderer.present()?;
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn latch_actions(pending: &mut FrameInput, kb: &InputState, gp: &GamepadState) {
    pending.pickup |= kb.any_pressed(KEYS_PICKUP) || gp.pickup_pressed();
    pending.drop |= kb.any_pressed(KEYS_DROP) || gp.drop_pressed();
    pending.use_item |= kb.any_pressed(KEYS_USE) || gp.use_pressed();
    pending.talk |= kb.any_pressed(KEYS_TALK) || gp.talk_pressed();
    if kb.any_pressed(KEYS_SLOT1) || gp.slot1_pressed() {
        pending.slot = Some(0);
    } else if kb.any_pressed(KEYS_SLOT2) || gp.slot2_pressed() {
        pending.slot = Some(1);
    }
}

/// One axis at a time: up, then down, then left, then right.
fn detect_movement(kb: &InputState, gp: &GamepadState) -> (i32, i32) {
    let active = |keys: &[crossterm::event::KeyCode], pad: bool| {
        kb.any_held(keys) || kb.any_pressed(keys) || pad
    };
    if active(KEYS_UP, gp.up_held()) {
        (0, -1)
    } else if active(KEYS_DOWN, gp.down_held()) {
        (0, 1)
    } else if active(KEYS_LEFT, gp.left_held()) {
        (-1, 0)
    } else if active(KEYS_RIGHT, gp.right_held()) {
        (1, 0)
    } else {
        (0, 0)
    }
}

fn sfx_for(event: &GameEvent) -> Option<Sfx> {
    Some(match event {
        GameEvent::PickedUp(_) => Sfx::Pickup,
        GameEvent::BucketFilled | GameEvent::Splash { .. } => Sfx::Splash,
        GameEvent::Chopped { .. } => Sfx::Chop,
        GameEvent::Unlocked { .. } => Sfx::Unlock,
        GameEvent::Swing => Sfx::Swing,
        GameEvent::MonsterHit(_) => Sfx::Hit,
        GameEvent::MonsterKilled(_) => Sfx::MonsterDeath,
        GameEvent::PlayerHurt { .. } | GameEvent::KnockedOut => Sfx::Hurt,
        GameEvent::QuestAdvanced(_) => Sfx::Quest,
        GameEvent::Teleported(_) => Sfx::Teleport,
        GameEvent::Dropped(_)
        | GameEvent::Talked(_)
        | GameEvent::PassageRefused
        | GameEvent::ScrollStarted => return None,
    })
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    for event in events {
        if let Some(effect) = sfx_for(event) {
            sfx.play(effect);
        }
    }
}
