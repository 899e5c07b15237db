/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::entity::{pointer_zone, FrameInput, MoveDir};
use sim::event::GameEvent;
use sim::save;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{InputState, TouchState};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(4);

fn main() {
    let config = GameConfig::load();
    init_logging(&config);

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut world = WorldState::new(config.tuning.clone(), rng);
    world.best_score = save::load_best();
    tracing::info!(best = world.best_score, "starting");

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        tracing::error!(error = %e, "game loop failed");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing JUPIKL 🪐");
    println!("Best: {}", world.best_score);
}

/// Route `tracing` output to the configured log file. The terminal is in
/// raw mode for the whole session, so nothing may go to stdout/stderr.
fn init_logging(config: &GameConfig) {
    let Some(path) = &config.log_file else { return };
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {e}", path.display());
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    if let Err(e) = result {
        eprintln!("Warning: logging disabled: {e}");
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.keyboard_enhanced;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut touch = TouchState::default();

    let tick_rate = Duration::from_millis(config.tuning.tick_rate_ms);
    let mut last_tick = Instant::now();
    // Jumps are edge-triggered: a press between ticks is held until the next step.
    let mut pending_jump = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, renderer, &kb, &gp) {
            break;
        }

        if world.phase == Phase::Playing && !world.paused {
            pending_jump |= kb.any_pressed(KEYS_JUMP) || gp.jump_pressed();
            for &(col, row) in kb.pointer_presses() {
                if let Some((fx, fy)) = renderer.screen_to_field(col, row) {
                    pending_jump |= touch.press(pointer_zone(fx, fy));
                }
            }
        }
        if kb.pointer_released() || world.phase != Phase::Playing {
            touch.release();
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            last_tick = Instant::now();
            if world.paused || world.phase == Phase::Home {
                world.anim_tick = world.anim_tick.wrapping_add(1);
            }

            let input = FrameInput {
                movement: detect_movement(&kb, &gp, touch),
                jump: std::mem::take(&mut pending_jump),
            };
            let dt_ms = elapsed.as_millis().min(u32::MAX as u128) as u32;
            let events = step::step(world, input, dt_ms);
            process_events(sound, &events);
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        if let GameEvent::NewBest { score } = event {
            if let Err(e) = save::save_best(*score) {
                tracing::warn!(error = %e, score, "could not store best score");
            }
        }

        let Some(sfx) = sound else { continue };
        match event {
            GameEvent::CoinCollected { .. } => sfx.play_coin(),
            GameEvent::Jumped => sfx.play_jump(),
            GameEvent::LevelAdvanced { .. } => sfx.play_level_up(),
            GameEvent::PlayerHit => sfx.play_hit(),
            GameEvent::RouteCompleted => sfx.play_route_complete(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char(' ')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::F(1), KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

/// Left wins when both directions are active.
fn detect_movement(kb: &InputState, gp: &GamepadState, touch: TouchState) -> Option<MoveDir> {
    let active = |keys: &[KeyCode]| kb.any_held(keys) || kb.any_pressed(keys);
    if active(KEYS_LEFT) || gp.left_held() || touch.left {
        Some(MoveDir::Left)
    } else if active(KEYS_RIGHT) || gp.right_held() || touch.right {
        Some(MoveDir::Right)
    } else {
        None
    }
}

/// Phase-level controls: start, pause, retry, home, quit. Returns true to quit.
fn handle_meta(world: &mut WorldState, renderer: &Renderer, kb: &InputState, gp: &GamepadState) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let esc = kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed();

    match world.phase {
        Phase::Home => {
            let clicked = kb.pointer_presses()
                .iter()
                .any(|&(col, row)| renderer.start_button_hit(col, row));
            if confirm || clicked {
                world.start_run();
            } else if esc || kb.any_pressed(KEYS_QUIT) {
                return true;
            }
        }
        Phase::Playing => {
            if kb.any_pressed(KEYS_PAUSE) {
                world.paused = !world.paused;
                tracing::debug!(paused = world.paused, "pause toggled");
            } else if esc {
                tracing::info!(score = world.score, "run abandoned");
                world.return_home();
            }
        }
        Phase::GameOver | Phase::RouteCompleted => {
            if confirm {
                step::restart_run(world);
            } else if esc {
                world.return_home();
            }
        }
    }
    false
}
