/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use domain::entity::{FrameInput, Steer};
use sim::event::GameEvent;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// If the loop stalls (terminal resize, suspended process), don't replay
/// the whole backlog at once.
const MAX_TICKS_PER_FRAME: u32 = 4;

fn main() {
    let config = config::GameConfig::load();
    let mut world = WorldState::new(&config);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Sky Hop!");
    println!("Best Score: {}", world.high_score);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let tick_rate = Duration::from_millis(world.speed.tick_rate_ms);
    let mut last_frame = Instant::now();
    let mut accumulator = Duration::ZERO;

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb) {
            break;
        }

        // Fixed-timestep: simulation advances in whole ticks regardless of
        // how long rendering took.
        let now = Instant::now();
        accumulator += now.duration_since(last_frame);
        last_frame = now;
        if accumulator > tick_rate * MAX_TICKS_PER_FRAME {
            accumulator = tick_rate * MAX_TICKS_PER_FRAME;
        }

        while accumulator >= tick_rate {
            accumulator -= tick_rate;
            match world.phase {
                Phase::Playing => {
                    let input = FrameInput { steer: detect_steer(&kb) };
                    let events = step::step(world, input);
                    process_sound_events(sound, &events);
                }
                // Menu and game-over only animate (blink timers)
                _ => world.anim_tick = world.anim_tick.wrapping_add(1),
            }
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::Bounced { boosted: false } => sfx.play_bounce(),
            GameEvent::Bounced { boosted: true } => sfx.play_spring(),
            GameEvent::PlatformBroken { .. } => sfx.play_crack(),
            GameEvent::BoostPicked => sfx.play_pickup(),
            GameEvent::NewHighScore { .. } => sfx.play_record(),
            GameEvent::Fell => sfx.play_fall(),
            GameEvent::BoostExpired => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

fn detect_steer(kb: &InputState) -> Option<Steer> {
    if kb.any_held(KEYS_LEFT) || kb.any_pressed(KEYS_LEFT) {
        Some(Steer::Left)
    } else if kb.any_held(KEYS_RIGHT) || kb.any_pressed(KEYS_RIGHT) {
        Some(Steer::Right)
    } else {
        None
    }
}

/// Phase transitions driven by key presses. Returns true to quit.
fn handle_meta(world: &mut WorldState, kb: &InputState) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM);
    let esc = kb.any_pressed(&[KeyCode::Esc]);

    match world.phase {
        Phase::Menu => {
            if confirm {
                step::start_run(world);
            } else if esc || kb.any_pressed(KEYS_QUIT) {
                return true;
            }
        }
        Phase::Playing => {
            // Steering is sampled per tick; nothing meta to do here.
        }
        Phase::GameOver => {
            if kb.any_pressed(KEYS_RESTART) {
                step::start_run(world);
            } else if esc {
                world.phase = Phase::Menu;
                world.anim_tick = 0;
            }
        }
    }

    false
}
