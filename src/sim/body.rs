//! Bodies: moving polygons and their per-variant behavior
//!
//! A body's outline has a fixed point count for its whole life. `move_by` and
//! `turn` are the only geometry mutators, and both keep the center and every
//! outline point under the same transform.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Segment, closed_edges, rotate, translate};
use crate::error::{SimError, SimResult};
use crate::input::{Control, Controls};
use crate::settings::Settings;
use crate::{Point, Vector};

/// Stable identifier, unique for the lifetime of a roster
pub type BodyId = u32;

/// Behavioral category of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BodyKind {
    Ship,
    Asteroid,
    Bullet,
}

/// Variant-specific state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// Player ship; remembers its last shot for fire-rate limiting
    Ship { last_fire_ms: Option<u64> },
    Asteroid,
    Bullet,
}

impl Behavior {
    pub fn kind(&self) -> BodyKind {
        match self {
            Behavior::Ship { .. } => BodyKind::Ship,
            Behavior::Asteroid => BodyKind::Asteroid,
            Behavior::Bullet => BodyKind::Bullet,
        }
    }
}

/// Request raised by a ship to add a bullet to the roster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub origin: Point,
    pub angle: f32,
}

/// Everything a body may consult while updating
pub struct UpdateContext<'a> {
    pub controls: &'a dyn Controls,
    pub now_ms: u64,
    /// Effective Δt for translation (already resolved from the motion mode)
    pub dt: f32,
    pub settings: &'a Settings,
}

/// A live entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BodyRecord")]
pub struct Body {
    pub id: BodyId,
    center: Point,
    outline: Vec<Point>,
    pub velocity: Vector,
    angle: f32,
    pub behavior: Behavior,
}

/// Serialized form of a [`Body`], checked on the way in
#[derive(Deserialize)]
struct BodyRecord {
    id: BodyId,
    center: Point,
    outline: Vec<Point>,
    velocity: Vector,
    #[serde(default)]
    angle: f32,
    behavior: Behavior,
}

impl TryFrom<BodyRecord> for Body {
    type Error = SimError;

    fn try_from(record: BodyRecord) -> SimResult<Self> {
        let mut body = Body::new(
            record.id,
            record.center,
            record.outline,
            record.velocity,
            record.behavior,
        )?;
        body.angle = record.angle;
        Ok(body)
    }
}

impl Body {
    /// Build a body. An empty outline is a programming error and is rejected.
    pub fn new(
        id: BodyId,
        center: Point,
        outline: Vec<Point>,
        velocity: Vector,
        behavior: Behavior,
    ) -> SimResult<Self> {
        if outline.is_empty() {
            return Err(SimError::EmptyOutline);
        }
        Ok(Self {
            id,
            center,
            outline,
            velocity,
            angle: 0.0,
            behavior,
        })
    }

    /// Player ship: a triangle around `center`, at rest, nose up (screen -y)
    pub fn ship(id: BodyId, center: Point) -> Self {
        use crate::consts::{SHIP_HALF_WIDTH, SHIP_NOSE, SHIP_TAIL};
        Self {
            id,
            center,
            outline: vec![
                center + Vector::new(-SHIP_HALF_WIDTH, SHIP_TAIL),
                center + Vector::new(0.0, -SHIP_NOSE),
                center + Vector::new(SHIP_HALF_WIDTH, SHIP_TAIL),
            ],
            velocity: Vector::ZERO,
            angle: 0.0,
            behavior: Behavior::Ship { last_fire_ms: None },
        }
    }

    /// Asteroid with a jagged outline and a random drift
    pub fn asteroid<R: Rng>(
        id: BodyId,
        center: Point,
        settings: &Settings,
        rng: &mut R,
    ) -> SimResult<Self> {
        let max = settings.asteroid_max_speed;
        // Each component uniform in [-max, max)
        let velocity = Vector::new(
            max * (2.0 * rng.random::<f32>() - 1.0),
            max * (2.0 * rng.random::<f32>() - 1.0),
        );
        let outline = asteroid_outline(
            center,
            settings.asteroid_radius,
            settings.asteroid_points,
            rng,
        );
        Self::new(id, center, outline, velocity, Behavior::Asteroid)
    }

    /// Bullet: a short segment starting at `origin`, flying along `angle`
    pub fn bullet(id: BodyId, origin: Point, angle: f32, settings: &Settings) -> Self {
        let velocity = rotate(Vector::new(0.0, -settings.bullet_speed), Point::ZERO, angle);
        let tail = translate(origin, velocity * settings.bullet_length_factor);
        Self {
            id,
            center: origin,
            outline: vec![origin, tail],
            velocity,
            angle,
            behavior: Behavior::Bullet,
        }
    }

    #[inline]
    pub fn kind(&self) -> BodyKind {
        self.behavior.kind()
    }

    #[inline]
    pub fn center(&self) -> Point {
        self.center
    }

    #[inline]
    pub fn outline(&self) -> &[Point] {
        &self.outline
    }

    /// Accumulated rotation (radians)
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Closed edge list of the outline
    pub fn edges(&self) -> Vec<Segment> {
        // Every constructor rejects an empty outline
        closed_edges(&self.outline)
    }

    /// Translate center and outline by `velocity * dt`
    pub fn move_by(&mut self, dt: f32) {
        let delta = self.velocity * dt;
        self.center = translate(self.center, delta);
        for point in &mut self.outline {
            *point = translate(*point, delta);
        }
    }

    /// Rotate the outline about the current center; the center stays put
    pub fn turn(&mut self, delta_angle: f32) {
        let pivot = self.center;
        for point in &mut self.outline {
            *point = rotate(*point, pivot, delta_angle);
        }
        self.angle += delta_angle;
    }

    /// Whether the center lies inside the `[0, size]` arena rectangle
    pub fn is_inside(&self, arena_size: Vector) -> bool {
        (0.0..=arena_size.x).contains(&self.center.x)
            && (0.0..=arena_size.y).contains(&self.center.y)
    }

    /// Run this body's per-tick rule. Ships may ask for a bullet.
    pub fn update(&mut self, ctx: &UpdateContext<'_>) -> Option<SpawnRequest> {
        match self.behavior {
            Behavior::Asteroid => {
                self.turn(ctx.settings.asteroid_turn_step);
                self.move_by(ctx.dt);
                None
            }
            Behavior::Bullet => {
                self.move_by(ctx.dt);
                None
            }
            Behavior::Ship { .. } => self.update_ship(ctx),
        }
    }

    fn update_ship(&mut self, ctx: &UpdateContext<'_>) -> Option<SpawnRequest> {
        let settings = ctx.settings;

        // Left wins if both are held
        if ctx.controls.is_held(Control::TurnLeft) {
            self.turn(-settings.ship_turn_step);
        } else if ctx.controls.is_held(Control::TurnRight) {
            self.turn(settings.ship_turn_step);
        }

        // Thrust is additive and unclamped
        if ctx.controls.is_held(Control::Thrust) {
            let push = rotate(Vector::new(0.0, -settings.ship_thrust), Point::ZERO, self.angle);
            self.velocity = translate(self.velocity, push);
        }

        let mut spawn = None;
        if ctx.controls.is_held(Control::Fire) {
            if let Behavior::Ship { last_fire_ms } = &mut self.behavior {
                let ready = match *last_fire_ms {
                    None => true,
                    Some(last) => ctx.now_ms.saturating_sub(last) >= settings.fire_cooldown_ms,
                };
                if ready {
                    *last_fire_ms = Some(ctx.now_ms);
                    let offset = Vector::new(0.0, -settings.bullet_muzzle_offset);
                    let muzzle = translate(self.center, offset);
                    spawn = Some(SpawnRequest {
                        origin: rotate(muzzle, self.center, self.angle),
                        angle: self.angle,
                    });
                }
            }
        }

        self.move_by(ctx.dt);
        spawn
    }
}

/// Jagged outline: `count` vertices evenly spaced in angle, each pushed out to
/// a random fraction of `radius` along the (+r, -r) diagonal before rotation
pub fn asteroid_outline<R: Rng>(
    center: Point,
    radius: f32,
    count: usize,
    rng: &mut R,
) -> Vec<Point> {
    let step = std::f32::consts::TAU / count as f32;
    (0..count)
        .map(|i| {
            let scale = radius * (0.1 + rng.random::<f32>());
            let spoke = Point::new(center.x + scale, center.y - scale);
            rotate(spoke, center, step * i as f32)
        })
        .collect()
}
