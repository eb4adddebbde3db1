//! Rock Drift headless driver
//!
//! Runs the simulation without a window: a scripted pilot, a manual clock, a
//! surface that only counts strokes and an audio sink that logs.
//!
//! Usage: `rock-drift [settings.json] [ticks]`

use rock_drift::sim::{BodyKind, DrawSurface, SimState, step};
use rock_drift::{Control, ControlState, LogAudio, ManualClock, Point, Settings, SimResult, Vector};

/// Host frame period (ms)
const FRAME_MS: u64 = 16;
const DEFAULT_TICKS: u64 = 600;

/// Surface that tallies what would have been drawn
#[derive(Default)]
struct StrokeCounter {
    frames: u64,
    lines: u64,
}

impl DrawSurface for StrokeCounter {
    fn clear(&mut self, _size: Vector) {
        self.frames += 1;
    }

    fn line(&mut self, _from: Point, _to: Point, _kind: BodyKind) {
        self.lines += 1;
    }
}

/// Spin slowly, pulse the thruster, keep the trigger down
fn pilot(tick: u64, controls: &mut ControlState) {
    controls.release_all();
    controls.press(Control::Fire);
    if tick % 120 < 40 {
        controls.press(Control::TurnLeft);
    }
    if tick % 200 < 10 {
        controls.press(Control::Thrust);
    }
}

fn run() -> SimResult<()> {
    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings {
            asteroid_count: 6,
            ..Default::default()
        },
    };
    let ticks = args
        .next()
        .and_then(|t| t.parse().ok())
        .unwrap_or(DEFAULT_TICKS);

    let mut state = SimState::new(settings)?;
    let clock = ManualClock::new(0);
    let mut controls = ControlState::new();
    let mut surface = StrokeCounter::default();
    let mut audio = LogAudio::new();
    let mut destroyed = 0usize;
    let mut fired = 0usize;

    for tick in 0..ticks {
        pilot(tick, &mut controls);
        let output = step(&mut state, &controls, &clock, FRAME_MS as f32);
        output.present(&mut surface, &mut audio);
        destroyed += output.destroyed.len();
        fired += output.spawned.len();
        clock.advance(FRAME_MS);

        if state.roster.ship().is_none() {
            log::info!("Ship destroyed at tick {}", state.time_ticks);
            break;
        }
    }

    log::info!(
        "Ran {} ticks: {} bullets fired, {} bodies removed, {} asteroids left",
        state.time_ticks,
        fired,
        destroyed,
        state.roster.count(BodyKind::Asteroid)
    );
    log::info!(
        "Presented {} frames, {} strokes, {} sounds",
        surface.frames,
        surface.lines,
        audio.played()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Rock Drift (headless) starting...");

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
