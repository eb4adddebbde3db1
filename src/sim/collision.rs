//! Outline-vs-outline collision detection
//!
//! Two bodies collide when any edge of one crosses or touches any edge of the
//! other. The scan is variant-agnostic and quadratic in total edge count,
//! which is fine for a roster of a few dozen bodies. Which contacts actually
//! destroy anything is decided by [`CollisionPolicy`].
//!
//! A polygon sitting entirely inside another, with no edges crossing, does not
//! register as a collision.

use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, BodyKind};
use super::geometry::{Segment, segments_intersect};
use super::roster::Roster;
use crate::settings::CollisionPolicy;

/// An unordered colliding pair, stored with `first < second`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollisionPair {
    pub first: BodyId,
    pub second: BodyId,
}

impl CollisionPair {
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.first == id || self.second == id
    }
}

impl CollisionPolicy {
    /// Whether a contact between these two kinds destroys both bodies
    pub fn destroys(&self, a: BodyKind, b: BodyKind) -> bool {
        match self {
            CollisionPolicy::AllPairs => true,
            CollisionPolicy::Arcade => matches!(
                (a, b),
                (BodyKind::Bullet, BodyKind::Asteroid)
                    | (BodyKind::Asteroid, BodyKind::Bullet)
                    | (BodyKind::Ship, BodyKind::Asteroid)
                    | (BodyKind::Asteroid, BodyKind::Ship)
            ),
        }
    }
}

/// Whether any edge of `a` intersects any edge of `b`
pub fn edges_collide(a: &[Segment], b: &[Segment]) -> bool {
    a.iter()
        .any(|edge_a| b.iter().any(|edge_b| segments_intersect(edge_a, edge_b)))
}

/// Whether two bodies' outlines intersect
pub fn bodies_collide(a: &Body, b: &Body) -> bool {
    edges_collide(&a.edges(), &b.edges())
}

/// Every distinct pair of bodies whose outlines intersect, in roster order.
///
/// Reads the roster only; nothing is removed here.
pub fn find_colliding_pairs(roster: &Roster) -> Vec<CollisionPair> {
    let bodies = roster.bodies();
    // Decompose each outline once per pass
    let edges: Vec<Vec<Segment>> = bodies.iter().map(Body::edges).collect();

    let mut pairs = Vec::new();
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            if edges_collide(&edges[i], &edges[j]) {
                pairs.push(CollisionPair::new(bodies[i].id, bodies[j].id));
            }
        }
    }
    pairs
}
