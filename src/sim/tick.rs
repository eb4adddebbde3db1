//! One simulation tick
//!
//! Order within a tick is fixed:
//! 1. every live body runs its update rule (ships may request bullets)
//! 2. the collision pass scans the roster, read-only
//! 3. destruction decisions are collected into a set
//! 4. the roster drops that set in one batch
//!
//! Bullets requested in step 1 are appended immediately (they move and collide
//! this tick) or after step 4, depending on [`SpawnTiming`].

use std::collections::BTreeSet;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::body::{BodyId, BodyKind, SpawnRequest, UpdateContext};
use super::collision::find_colliding_pairs;
use super::draw::{DrawCommand, DrawSurface, frame_commands};
use super::roster::Roster;
use crate::audio::{AudioSink, SoundEffect};
use crate::error::SimResult;
use crate::input::{Clock, Controls};
use crate::settings::{Settings, SpawnTiming};

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    pub settings: Settings,
    pub roster: Roster,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl SimState {
    /// Validate settings and build the starting roster from the seed
    pub fn new(settings: Settings) -> SimResult<Self> {
        settings.validate()?;
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let roster = Roster::populate(&settings, &mut rng)?;
        Ok(Self::from_roster(settings, roster))
    }

    /// Wrap a hand-built roster (scenarios, replays, tests)
    pub fn from_roster(settings: Settings, roster: Roster) -> Self {
        Self {
            settings,
            roster,
            time_ticks: 0,
        }
    }
}

/// Default tuning for an arena of `arena_size` holding `asteroid_count` asteroids
pub fn init(arena_size: Vec2, asteroid_count: usize) -> SimResult<SimState> {
    SimState::new(Settings::with_arena(arena_size, asteroid_count))
}

/// What a tick produced for the host to render and play
#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    pub draw: Vec<DrawCommand>,
    pub sounds: Vec<SoundEffect>,
    /// Bodies removed this tick (collisions and culling)
    pub destroyed: Vec<BodyId>,
    /// Bullets added this tick
    pub spawned: Vec<BodyId>,
}

impl TickOutput {
    /// Replay this tick onto the host's surface and audio sink
    pub fn present(&self, surface: &mut dyn DrawSurface, audio: &mut dyn AudioSink) {
        for command in &self.draw {
            command.apply(surface);
        }
        for &effect in &self.sounds {
            audio.play(effect);
        }
    }
}

/// Advance the simulation by one tick.
///
/// `dt` is the host's elapsed time in milliseconds; it is ignored under
/// [`crate::MotionMode::FixedStep`]. A negative or non-finite `dt` is logged
/// and treated as zero.
pub fn step(
    state: &mut SimState,
    controls: &dyn Controls,
    clock: &dyn Clock,
    dt: f32,
) -> TickOutput {
    let settings = &state.settings;
    let roster = &mut state.roster;
    let mut output = TickOutput::default();

    let dt = if dt.is_finite() && dt >= 0.0 {
        dt
    } else {
        log::warn!("Tick {}: ignoring bad dt {dt}", state.time_ticks);
        0.0
    };
    let ctx = UpdateContext {
        controls,
        now_ms: clock.now_ms(),
        dt: settings.motion.effective_dt(dt),
        settings,
    };

    // 1. Update. Immediate spawns grow the roster under the loop, so the new
    //    bullet is reached and advanced later in this same pass.
    let mut queued: Vec<SpawnRequest> = Vec::new();
    let mut index = 0;
    while let Some(body) = roster.body_at_mut(index) {
        if let Some(request) = body.update(&ctx) {
            match settings.spawn_timing {
                SpawnTiming::Immediate => {
                    output.spawned.push(roster.spawn_bullet(request, settings));
                }
                SpawnTiming::Deferred => queued.push(request),
            }
        }
        index += 1;
    }

    // 2-3. Scan and decide, without touching the roster
    let mut doomed: BTreeSet<BodyId> = BTreeSet::new();
    for pair in find_colliding_pairs(roster) {
        let (Some(a), Some(b)) = (roster.get(pair.first), roster.get(pair.second)) else {
            continue;
        };
        if settings.collision_policy.destroys(a.kind(), b.kind()) {
            doomed.insert(pair.first);
            doomed.insert(pair.second);
        }
    }
    let exploded = doomed.len();

    if settings.cull_bullets {
        let arena = settings.arena_size();
        for body in roster.iter() {
            if body.kind() == BodyKind::Bullet && !body.is_inside(arena) && doomed.insert(body.id) {
                log::debug!("Culled bullet {} outside the arena", body.id);
            }
        }
    }

    // 4. Single batch removal
    let removed = roster.remove_all(&doomed);
    if exploded > 0 {
        log::debug!(
            "Tick {}: {} bodies destroyed by collision, {} removed total",
            state.time_ticks,
            exploded,
            removed
        );
    }
    output.destroyed.extend(doomed);

    for request in queued {
        output.spawned.push(roster.spawn_bullet(request, settings));
    }

    output
        .sounds
        .extend(std::iter::repeat_n(SoundEffect::Shoot, output.spawned.len()));
    output
        .sounds
        .extend(std::iter::repeat_n(SoundEffect::Explosion, exploded));
    output.draw = frame_commands(roster, settings.arena_size());

    state.time_ticks += 1;
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Control, ControlState, ManualClock};
    use crate::settings::{CollisionPolicy, MotionMode};
    use crate::sim::body::{Behavior, Body};
    use crate::{Point, Vector};
    use std::f32::consts::PI;

    const FRAME_MS: f32 = 16.0;

    fn still_settings() -> Settings {
        Settings {
            asteroid_count: 0,
            asteroid_turn_step: 0.0,
            ..Default::default()
        }
    }

    fn polygon(roster: &mut Roster, points: &[(f32, f32)], behavior: Behavior) -> BodyId {
        let outline: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        let center = outline.iter().copied().sum::<Point>() / outline.len() as f32;
        let id = roster.next_body_id();
        roster.push(Body::new(id, center, outline, Vector::ZERO, behavior).unwrap());
        id
    }

    fn rock(roster: &mut Roster, x: f32, y: f32, size: f32) -> BodyId {
        polygon(
            roster,
            &[(x, y), (x + size, y), (x + size, y + size), (x, y + size)],
            Behavior::Asteroid,
        )
    }

    /// Bullet sitting on the bottom edge of a rock at (x, y), pointing down
    fn bullet_on_rock(
        roster: &mut Roster,
        settings: &Settings,
        x: f32,
        y: f32,
        size: f32,
    ) -> BodyId {
        let id = roster.next_body_id();
        roster.push(Body::bullet(id, Point::new(x + size / 2.0, y + size), PI, settings));
        id
    }

    fn idle() -> ControlState {
        ControlState::new()
    }

    #[test]
    fn test_init_builds_roster() {
        let state = init(Vec2::new(800.0, 600.0), 4).unwrap();
        assert_eq!(state.roster.len(), 5);
        assert_eq!(state.roster.ship().unwrap().center(), Point::new(400.0, 300.0));
        assert!(init(Vec2::new(0.0, 600.0), 4).is_err());
    }

    #[test]
    fn test_separated_shapes_never_collide() {
        let settings = still_settings();
        let mut roster = Roster::new();
        polygon(&mut roster, &[(10.0, 10.0), (30.0, 10.0), (20.0, 25.0)], Behavior::Asteroid);
        rock(&mut roster, 200.0, 200.0, 40.0);
        let mut state = SimState::from_roster(settings, roster);
        let clock = ManualClock::new(0);

        for _ in 0..200 {
            let out = step(&mut state, &idle(), &clock, FRAME_MS);
            assert!(out.destroyed.is_empty());
        }
        assert_eq!(state.roster.len(), 2);
        assert_eq!(state.time_ticks, 200);
    }

    #[test]
    fn test_bullet_on_outline_destroys_both() {
        let settings = still_settings();
        let mut roster = Roster::new();
        let target = rock(&mut roster, 50.0, 50.0, 20.0);
        let bullet = bullet_on_rock(&mut roster, &settings, 50.0, 50.0, 20.0);
        let mut state = SimState::from_roster(settings, roster);

        // dt = 0 keeps the bullet exactly on the edge for the collision pass
        let out = step(&mut state, &idle(), &ManualClock::new(0), 0.0);
        assert!(state.roster.is_empty());
        assert_eq!(out.destroyed, vec![target, bullet]);
        assert_eq!(out.sounds, vec![SoundEffect::Explosion, SoundEffect::Explosion]);
    }

    #[test]
    fn test_each_independent_pair_removes_two() {
        let settings = still_settings();
        let mut roster = Roster::new();
        let ship = roster.next_body_id();
        roster.push(Body::ship(ship, Point::new(300.0, 300.0)));
        rock(&mut roster, 20.0, 20.0, 20.0);
        bullet_on_rock(&mut roster, &settings, 20.0, 20.0, 20.0);
        rock(&mut roster, 120.0, 20.0, 20.0);
        bullet_on_rock(&mut roster, &settings, 120.0, 20.0, 20.0);
        let mut state = SimState::from_roster(settings, roster);
        assert_eq!(state.roster.len(), 5);

        let out = step(&mut state, &idle(), &ManualClock::new(0), 0.0);
        assert_eq!(state.roster.len(), 1);
        assert_eq!(out.destroyed.len(), 4);
        assert!(state.roster.get(ship).is_some());
    }

    #[test]
    fn test_shared_body_is_removed_once() {
        let settings = still_settings();
        let mut roster = Roster::new();
        let target = rock(&mut roster, 50.0, 50.0, 20.0);
        // Two bullets on the same rock: two pairs, three distinct bodies
        bullet_on_rock(&mut roster, &settings, 50.0, 50.0, 20.0);
        let id = roster.next_body_id();
        roster.push(Body::bullet(id, Point::new(55.0, 70.0), PI, &settings));
        let mut state = SimState::from_roster(settings, roster);

        let out = step(&mut state, &idle(), &ManualClock::new(0), 0.0);
        assert!(state.roster.is_empty());
        assert_eq!(out.destroyed.len(), 3);
        assert_eq!(out.destroyed.iter().filter(|&&d| d == target).count(), 1);
    }

    #[test]
    fn test_fire_cooldown() {
        let settings = still_settings();
        let mut state = SimState::new(settings).unwrap();
        let fire = ControlState::holding(&[Control::Fire]);
        let clock = ManualClock::new(1_000);

        // Two presses inside the cooldown window: one bullet
        let first = step(&mut state, &fire, &clock, FRAME_MS);
        clock.advance(100);
        let second = step(&mut state, &fire, &clock, FRAME_MS);
        assert_eq!(first.spawned.len() + second.spawned.len(), 1);
        assert_eq!(first.sounds, vec![SoundEffect::Shoot]);
        assert_eq!(state.roster.count(BodyKind::Bullet), 1);

        // Past the cooldown: a second bullet
        clock.advance(500);
        let third = step(&mut state, &fire, &clock, FRAME_MS);
        assert_eq!(third.spawned.len(), 1);
        assert_eq!(state.roster.count(BodyKind::Bullet), 2);
    }

    #[test]
    fn test_holding_fire_repeats_at_cooldown() {
        let settings = still_settings();
        let mut state = SimState::new(settings).unwrap();
        let fire = ControlState::holding(&[Control::Fire]);
        let clock = ManualClock::new(0);

        // 1000 ms of held fire at 100 ms per tick: shots at 0, 500, 1000
        for _ in 0..=10 {
            step(&mut state, &fire, &clock, 1.0);
            clock.advance(100);
        }
        assert_eq!(state.roster.count(BodyKind::Bullet), 3);
    }

    #[test]
    fn test_immediate_spawn_moves_this_tick() {
        let settings = still_settings();
        let mut state = SimState::new(settings).unwrap();
        let fire = ControlState::holding(&[Control::Fire]);

        let out = step(&mut state, &fire, &ManualClock::new(0), 10.0);
        let bullet = state.roster.get(out.spawned[0]).unwrap();
        // Muzzle at (200, 191), then 0.2 units/ms * 10 ms upward
        assert!((bullet.center() - Point::new(200.0, 189.0)).length() < 1e-3);
    }

    #[test]
    fn test_deferred_spawn_waits_for_next_tick() {
        let settings = Settings {
            spawn_timing: SpawnTiming::Deferred,
            ..still_settings()
        };
        let mut state = SimState::new(settings).unwrap();
        let fire = ControlState::holding(&[Control::Fire]);
        let clock = ManualClock::new(0);

        let out = step(&mut state, &fire, &clock, 10.0);
        let id = out.spawned[0];
        let bullet = state.roster.get(id).unwrap();
        assert_eq!(bullet.center(), Point::new(200.0, 191.0));
        // Already part of this frame's drawing
        assert_eq!(out.draw.len(), 1 + 3 + 2);

        step(&mut state, &idle(), &clock, 10.0);
        let bullet = state.roster.get(id).unwrap();
        assert!((bullet.center() - Point::new(200.0, 189.0)).length() < 1e-3);
    }

    #[test]
    fn test_deferred_spawn_skips_this_collision_pass() {
        let mut settings = Settings {
            spawn_timing: SpawnTiming::Deferred,
            ..still_settings()
        };
        let mut roster = Roster::new();
        let ship = roster.next_body_id();
        roster.push(Body::ship(ship, Point::new(200.0, 200.0)));
        // Rock crossing the bullet's path, clear of the ship's nose at y = 190
        let target = rock(&mut roster, 190.0, 165.0, 20.0);
        let mut state = SimState::from_roster(settings.clone(), roster.clone());
        let fire = ControlState::holding(&[Control::Fire]);
        let clock = ManualClock::new(0);

        let out = step(&mut state, &fire, &clock, 0.0);
        assert!(out.destroyed.is_empty());
        assert_eq!(state.roster.len(), 3);

        let out = step(&mut state, &idle(), &clock, 0.0);
        assert!(out.destroyed.contains(&target));
        assert_eq!(state.roster.len(), 1);

        // Same scene, immediate spawning: the rock goes on the firing tick
        settings.spawn_timing = SpawnTiming::Immediate;
        let mut state = SimState::from_roster(settings, roster);
        let out = step(&mut state, &fire, &clock, 0.0);
        assert!(out.destroyed.contains(&target));
        assert_eq!(state.roster.len(), 1);
    }

    #[test]
    fn test_ship_dies_on_asteroid() {
        let settings = still_settings();
        let mut roster = Roster::new();
        let ship = roster.next_body_id();
        roster.push(Body::ship(ship, Point::new(100.0, 100.0)));
        rock(&mut roster, 95.0, 80.0, 20.0);
        let mut state = SimState::from_roster(settings, roster);

        let out = step(&mut state, &idle(), &ManualClock::new(0), FRAME_MS);
        assert!(out.destroyed.contains(&ship));
        assert!(state.roster.is_empty());
    }

    #[test]
    fn test_policy_decides_asteroid_overlap() {
        let mut roster = Roster::new();
        rock(&mut roster, 0.0, 0.0, 20.0);
        rock(&mut roster, 10.0, 10.0, 20.0);

        let mut state = SimState::from_roster(still_settings(), roster.clone());
        step(&mut state, &idle(), &ManualClock::new(0), 0.0);
        assert_eq!(state.roster.len(), 2);

        let settings = Settings {
            collision_policy: CollisionPolicy::AllPairs,
            ..still_settings()
        };
        let mut state = SimState::from_roster(settings, roster);
        step(&mut state, &idle(), &ManualClock::new(0), 0.0);
        assert!(state.roster.is_empty());
    }

    #[test]
    fn test_bullets_culled_outside_arena() {
        let settings = still_settings();
        let mut roster = Roster::new();
        let id = roster.next_body_id();
        roster.push(Body::bullet(id, Point::new(200.0, 2.0), 0.0, &settings));
        let mut state = SimState::from_roster(settings.clone(), roster.clone());

        // 0.2 units/ms * 16 ms carries it past y = 0
        let out = step(&mut state, &idle(), &ManualClock::new(0), FRAME_MS);
        assert_eq!(out.destroyed, vec![id]);
        assert!(out.sounds.is_empty());
        assert!(state.roster.is_empty());

        let settings = Settings {
            cull_bullets: false,
            ..settings
        };
        let mut state = SimState::from_roster(settings, roster);
        step(&mut state, &idle(), &ManualClock::new(0), FRAME_MS);
        assert_eq!(state.roster.len(), 1);
    }

    #[test]
    fn test_fixed_step_ignores_host_dt() {
        let settings = Settings {
            motion: MotionMode::FixedStep,
            ..still_settings()
        };
        let mut roster = Roster::new();
        let id = roster.next_body_id();
        roster.push(
            Body::new(
                id,
                Point::new(100.0, 100.0),
                vec![Point::new(100.0, 100.0), Point::new(101.0, 100.0)],
                Vector::new(2.0, 0.0),
                Behavior::Asteroid,
            )
            .unwrap(),
        );
        let mut state = SimState::from_roster(settings, roster);

        step(&mut state, &idle(), &ManualClock::new(0), 1000.0);
        assert_eq!(state.roster.get(id).unwrap().center(), Point::new(102.0, 100.0));
    }

    #[test]
    fn test_present_replays_output() {
        use crate::audio::LogAudio;

        struct Count(usize);
        impl DrawSurface for Count {
            fn clear(&mut self, _size: Vector) {}
            fn line(&mut self, _from: Point, _to: Point, _kind: BodyKind) {
                self.0 += 1;
            }
        }

        let mut state = SimState::new(still_settings()).unwrap();
        let fire = ControlState::holding(&[Control::Fire]);
        let out = step(&mut state, &fire, &ManualClock::new(0), FRAME_MS);

        let mut surface = Count(0);
        let mut audio = LogAudio::new();
        out.present(&mut surface, &mut audio);
        // Ship triangle plus the two-edge bullet
        assert_eq!(surface.0, 5);
        assert_eq!(audio.played(), 1);
    }

    #[test]
    fn test_determinism() {
        let settings = Settings {
            asteroid_count: 6,
            seed: 4242,
            ..Default::default()
        };
        let mut state1 = SimState::new(settings.clone()).unwrap();
        let mut state2 = SimState::new(settings).unwrap();
        let clock = ManualClock::new(0);

        let inputs = [
            ControlState::holding(&[Control::Thrust]),
            ControlState::holding(&[Control::TurnLeft, Control::Fire]),
            ControlState::holding(&[Control::Fire]),
            ControlState::new(),
        ];

        for input in inputs.iter().cycle().take(120) {
            step(&mut state1, input, &clock, FRAME_MS);
            step(&mut state2, input, &clock, FRAME_MS);
            clock.advance(FRAME_MS as u64);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.roster.bodies(), state2.roster.bodies());
    }

    #[test]
    fn test_bad_dt_is_treated_as_zero() {
        let settings = still_settings();
        let mut roster = Roster::new();
        let ship_id = roster.next_body_id();
        roster.push(Body::ship(ship_id, Point::new(300.0, 300.0)));
        let rock_id = rock(&mut roster, 100.0, 100.0, 20.0);
        let mut state = SimState::from_roster(settings, roster);
        if let Some(ship) = state.roster.body_at_mut(0) {
            ship.velocity = Vector::new(0.1, 0.0);
        }
        let clock = ManualClock::new(0);

        for dt in [f32::NAN, f32::INFINITY, -16.0] {
            let output = step(&mut state, &idle(), &clock, dt);
            assert!(output.destroyed.is_empty());
        }
        assert_eq!(
            state.roster.get(ship_id).unwrap().center(),
            Point::new(300.0, 300.0)
        );

        // Collisions still register after the bad ticks
        let bullet_id = bullet_on_rock(&mut state.roster, &state.settings, 100.0, 100.0, 20.0);
        let output = step(&mut state, &idle(), &clock, f32::NAN);
        assert!(output.destroyed.contains(&rock_id));
        assert!(output.destroyed.contains(&bullet_id));
    }
}
