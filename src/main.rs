/// Entry point and frame loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::io;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

use config::GameConfig;
use sim::event::GameEvent;
use sim::level::{advance_level, load_level, LevelSource};
use sim::step::{self, FrameInput};
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{self as keys, InputState};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

/// Upper bound on one frame's delta, so a suspended terminal
/// does not fast-forward every timer on resume.
const MAX_DELTA_MS: u32 = 250;

fn main() -> ExitCode {
    // Stdout belongs to the terminal UI; log to a file before anything can warn.
    let _log_guard = init_logging();

    let config = GameConfig::load();
    let source = LevelSource::from_config(&config);
    let mut world = WorldState::new(config.timing);

    if let Err(e) = load_level(&mut world, 0, &source) {
        error!("cannot load first level: {e}");
        eprintln!("Cannot load first level: {e}");
        return ExitCode::FAILURE;
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let mut kb = InputState::new();
    kb.honor_release = enable_key_release();

    let sound = SoundEngine::new();
    let result = game_loop(&mut world, &source, &mut renderer, &mut kb, sound.as_ref(), &config);

    if kb.honor_release {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(()) => {
            info!(level = world.level_index, phase = ?world.phase, "quit");
            println!("Thanks for playing Crypt Push!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("game halted: {e}");
            eprintln!("Game halted: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(".", "cryptpush.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    guard
}

/// Ask the terminal for Release events. Returns whether it agreed.
fn enable_key_release() -> bool {
    if !terminal::supports_keyboard_enhancement().unwrap_or(false) { return false; }
    execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok()
}

fn game_loop(
    world: &mut WorldState,
    source: &LevelSource,
    renderer: &mut Renderer,
    kb: &mut InputState,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut gp = GamepadState::new(&config.gamepad);
    let frame = Duration::from_millis(config.timing.frame_ms);
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(keys::KEYS_QUIT) || gp.quit_pressed() { break; }

        let delta_ms = frame_delta_ms(frame_start.duration_since(last_frame));
        last_frame = frame_start;

        let input = FrameInput {
            delta_ms,
            movement: kb.pressed_direction().or_else(|| gp.pressed_direction()),
            restart: kb.any_pressed(keys::KEYS_RESTART) || gp.restart_pressed(),
            undo: kb.any_pressed(keys::KEYS_UNDO) || gp.undo_pressed(),
            skip: kb.any_pressed(keys::KEYS_SKIP) || gp.skip_pressed(),
        };

        let events = step::step(world, input);
        log_events(world, &events);
        if let Some(sfx) = sound { sfx.play_events(&events); }

        if world.phase == Phase::LevelComplete {
            advance_level(world, source)?;
        }

        renderer.render(world)?;

        let spent = frame_start.elapsed();
        if spent < frame { std::thread::sleep(frame - spent); }
    }

    Ok(())
}

fn frame_delta_ms(elapsed: Duration) -> u32 {
    let ms = elapsed.as_millis().min(u128::from(MAX_DELTA_MS));
    u32::try_from(ms).unwrap_or(MAX_DELTA_MS)
}

fn log_events(world: &WorldState, events: &[GameEvent]) {
    for event in events {
        debug!(tick = world.tick, level = world.level_index, event = ?event);
    }
}
