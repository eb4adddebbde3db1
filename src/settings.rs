//! Simulation settings
//!
//! Arena size and asteroid count are the only values a host normally supplies;
//! everything else defaults to the classic tuning. Loaded from JSON when a
//! host wants to override it.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};

/// How host time feeds body translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MotionMode {
    /// Translation scales by the host-supplied Δt (milliseconds)
    #[default]
    DeltaScaled,
    /// Translation advances one tick-unit per tick, host Δt is ignored
    FixedStep,
}

impl MotionMode {
    /// Effective Δt for a tick given the host value
    pub fn effective_dt(&self, host_dt: f32) -> f32 {
        match self {
            MotionMode::DeltaScaled => host_dt,
            MotionMode::FixedStep => 1.0,
        }
    }
}

/// When bullets requested during a tick join the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpawnTiming {
    /// Append at once: the bullet moves and collides this same tick
    #[default]
    Immediate,
    /// Queue until the removal batch has been applied
    Deferred,
}

/// Which colliding pairs actually destroy each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CollisionPolicy {
    /// Every intersecting pair is destroyed
    AllPairs,
    /// Only bullet/asteroid and ship/asteroid contacts are destructive
    #[default]
    Arcade,
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,
    pub asteroid_count: usize,
    /// Seed for asteroid placement, velocity and outline jitter
    pub seed: u64,

    // === Rules ===
    pub motion: MotionMode,
    pub spawn_timing: SpawnTiming,
    pub collision_policy: CollisionPolicy,
    /// Destroy bullets whose center leaves the arena
    pub cull_bullets: bool,

    // === Ship ===
    pub ship_turn_step: f32,
    pub ship_thrust: f32,
    pub ship_clearance: f32,
    pub fire_cooldown_ms: u64,

    // === Bullet ===
    pub bullet_speed: f32,
    pub bullet_length_factor: f32,
    pub bullet_muzzle_offset: f32,

    // === Asteroid ===
    pub asteroid_radius: f32,
    pub asteroid_points: usize,
    pub asteroid_turn_step: f32,
    pub asteroid_max_speed: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            asteroid_count: ASTEROID_COUNT,
            seed: 0,

            motion: MotionMode::default(),
            spawn_timing: SpawnTiming::default(),
            collision_policy: CollisionPolicy::default(),
            cull_bullets: true,

            ship_turn_step: SHIP_TURN_STEP,
            ship_thrust: SHIP_THRUST,
            ship_clearance: SHIP_CLEARANCE,
            fire_cooldown_ms: FIRE_COOLDOWN_MS,

            bullet_speed: BULLET_SPEED,
            bullet_length_factor: BULLET_LENGTH_FACTOR,
            bullet_muzzle_offset: BULLET_MUZZLE_OFFSET,

            asteroid_radius: ASTEROID_RADIUS,
            asteroid_points: ASTEROID_POINTS,
            asteroid_turn_step: ASTEROID_TURN_STEP,
            asteroid_max_speed: ASTEROID_MAX_SPEED,
        }
    }
}

impl Settings {
    /// Default tuning with a custom arena
    pub fn with_arena(arena_size: Vec2, asteroid_count: usize) -> Self {
        Self {
            arena_width: arena_size.x,
            arena_height: arena_size.y,
            asteroid_count,
            ..Self::default()
        }
    }

    pub fn arena_size(&self) -> Vec2 {
        Vec2::new(self.arena_width, self.arena_height)
    }

    /// Parse settings from a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> SimResult<()> {
        let floats = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("ship_turn_step", self.ship_turn_step),
            ("ship_thrust", self.ship_thrust),
            ("ship_clearance", self.ship_clearance),
            ("bullet_speed", self.bullet_speed),
            ("bullet_length_factor", self.bullet_length_factor),
            ("bullet_muzzle_offset", self.bullet_muzzle_offset),
            ("asteroid_radius", self.asteroid_radius),
            ("asteroid_turn_step", self.asteroid_turn_step),
            ("asteroid_max_speed", self.asteroid_max_speed),
        ];
        if let Some((name, value)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SimError::InvalidSettings(format!(
                "{name} must be finite, got {value}"
            )));
        }
        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return Err(SimError::InvalidSettings(format!(
                "arena must be positive, got {}x{}",
                self.arena_width, self.arena_height
            )));
        }
        if self.asteroid_points < 3 {
            return Err(SimError::InvalidSettings(format!(
                "asteroid needs at least 3 points, got {}",
                self.asteroid_points
            )));
        }
        if !(self.asteroid_radius > 0.0) {
            return Err(SimError::InvalidSettings(format!(
                "asteroid radius must be positive, got {}",
                self.asteroid_radius
            )));
        }
        if self.asteroid_max_speed < 0.0 || self.ship_clearance < 0.0 {
            return Err(SimError::InvalidSettings(
                "speeds and clearances cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}
