//! The roster: every live body, in spawn order
//!
//! The roster exclusively owns its bodies. Removal is always a single batch
//! applied after a scan has finished, never from inside one.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, BodyKind, SpawnRequest};
use crate::Point;
use crate::consts::ASTEROID_PLACEMENT_ATTEMPTS;
use crate::error::SimResult;
use crate::settings::Settings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    bodies: Vec<Body>,
    /// Next body ID
    next_id: BodyId,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            next_id: 1,
        }
    }

    /// Starting roster: the ship at the arena center, then the asteroids
    pub fn populate<R: Rng>(settings: &Settings, rng: &mut R) -> SimResult<Self> {
        let mut roster = Self::new();
        let ship_center = settings.arena_size() / 2.0;
        let id = roster.next_body_id();
        roster.bodies.push(Body::ship(id, ship_center));

        for _ in 0..settings.asteroid_count {
            let center = place_asteroid(settings, ship_center, rng);
            let id = roster.next_body_id();
            roster.bodies.push(Body::asteroid(id, center, settings, rng)?);
        }

        log::info!(
            "Roster populated: 1 ship, {} asteroids in {}x{} arena",
            settings.asteroid_count,
            settings.arena_width,
            settings.arena_height
        );
        Ok(roster)
    }

    /// Allocate a new body ID
    pub fn next_body_id(&mut self) -> BodyId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an already-built body. Its ID must come from `next_body_id`.
    pub fn push(&mut self, body: Body) {
        debug_assert!(
            self.get(body.id).is_none(),
            "body {} is already in the roster",
            body.id
        );
        self.bodies.push(body);
    }

    /// Append a bullet for a ship's spawn request
    pub fn spawn_bullet(&mut self, request: SpawnRequest, settings: &Settings) -> BodyId {
        let id = self.next_body_id();
        self.bodies
            .push(Body::bullet(id, request.origin, request.angle, settings));
        log::debug!("Spawned bullet {id} at ({:.1}, {:.1})", request.origin.x, request.origin.y);
        id
    }

    /// Drop every body whose ID is in `doomed`, in one pass.
    /// Returns how many bodies were removed.
    pub fn remove_all(&mut self, doomed: &BTreeSet<BodyId>) -> usize {
        if doomed.is_empty() {
            return 0;
        }
        let before = self.bodies.len();
        self.bodies.retain(|b| !doomed.contains(&b.id));
        before - self.bodies.len()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Mutable access by position, for the update pass
    pub(crate) fn body_at_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn ship(&self) -> Option<&Body> {
        self.bodies.iter().find(|b| b.kind() == BodyKind::Ship)
    }

    pub fn count(&self, kind: BodyKind) -> usize {
        self.bodies.iter().filter(|b| b.kind() == kind).count()
    }
}

/// Random point in the arena, away from the ship when possible
fn place_asteroid<R: Rng>(settings: &Settings, ship_center: Point, rng: &mut R) -> Point {
    let size = settings.arena_size();
    let mut center = Point::new(size.x * rng.random::<f32>(), size.y * rng.random::<f32>());
    for _ in 0..ASTEROID_PLACEMENT_ATTEMPTS {
        if center.distance(ship_center) >= settings.ship_clearance {
            return center;
        }
        center = Point::new(size.x * rng.random::<f32>(), size.y * rng.random::<f32>());
    }
    log::warn!("No asteroid spawn point clear of the ship, placing anyway");
    center
}
