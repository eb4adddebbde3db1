//! Rock Drift - a polygon asteroids simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, bodies, roster, collisions, tick)
//! - `input`: Controls and clock capabilities handed in by the host
//! - `audio`: Fire-and-forget sound signals
//! - `settings`: Runtime configuration
//! - `error`: Crate error type

pub mod audio;
pub mod error;
pub mod input;
pub mod settings;
pub mod sim;

pub use audio::{AudioSink, LogAudio, SoundEffect};
pub use error::{SimError, SimResult};
pub use input::{Clock, Control, ControlState, Controls, ManualClock, SystemClock};
pub use settings::{CollisionPolicy, MotionMode, Settings, SpawnTiming};

/// A position in arena space (screen convention: +y points down)
pub type Point = glam::Vec2;

/// A displacement or velocity. Same shape as [`Point`]; the distinction is semantic.
pub type Vector = glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default arena dimensions
    pub const ARENA_WIDTH: f32 = 400.0;
    pub const ARENA_HEIGHT: f32 = 400.0;
    pub const ASTEROID_COUNT: usize = 1;

    /// Ship defaults
    pub const SHIP_TURN_STEP: f32 = 0.1; // radians per tick
    pub const SHIP_THRUST: f32 = 0.005; // units per ms, per tick held
    pub const SHIP_HALF_WIDTH: f32 = 8.0;
    pub const SHIP_NOSE: f32 = 10.0;
    pub const SHIP_TAIL: f32 = 9.0;
    /// Keep asteroids from spawning on top of the ship
    pub const SHIP_CLEARANCE: f32 = 60.0;

    /// Bullet defaults
    pub const BULLET_SPEED: f32 = 0.2; // units per ms
    pub const BULLET_MUZZLE_OFFSET: f32 = 9.0;
    /// Bullet outline length in multiples of its velocity
    pub const BULLET_LENGTH_FACTOR: f32 = 50.0;
    pub const FIRE_COOLDOWN_MS: u64 = 500;

    /// Asteroid defaults
    pub const ASTEROID_RADIUS: f32 = 30.0;
    pub const ASTEROID_POINTS: usize = 10;
    pub const ASTEROID_TURN_STEP: f32 = 0.01; // radians per tick
    /// Max absolute velocity component (units per ms)
    pub const ASTEROID_MAX_SPEED: f32 = 0.05;
    /// Attempts to find a spawn point outside the ship clearance
    pub const ASTEROID_PLACEMENT_ATTEMPTS: u32 = 32;
}
