//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, used when building the roster
//! - Stable iteration order (roster order)
//! - Time, input and audio arrive as capabilities, never globals
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod draw;
pub mod geometry;
pub mod roster;
pub mod tick;

pub use body::{Behavior, Body, BodyId, BodyKind, SpawnRequest, UpdateContext, asteroid_outline};
pub use collision::{CollisionPair, bodies_collide, edges_collide, find_colliding_pairs};
pub use draw::{DrawCommand, DrawSurface, frame_commands};
pub use geometry::{Segment, outline_to_edges, rotate, segments_intersect, translate};
pub use roster::Roster;
pub use tick::{SimState, TickOutput, init, step};
