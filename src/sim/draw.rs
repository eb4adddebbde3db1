//! Draw commands emitted each tick
//!
//! The simulation never touches pixels. It describes a frame as a clear plus
//! one stroked line per outline edge, and the host replays that onto whatever
//! surface it owns.

use serde::{Deserialize, Serialize};

use super::body::BodyKind;
use super::roster::Roster;
use crate::{Point, Vector};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// Fill the whole arena with the background
    Clear { size: Vector },
    /// Stroke one outline edge
    Line {
        from: Point,
        to: Point,
        kind: BodyKind,
    },
}

/// Abstract 2D drawing surface owned by the host
pub trait DrawSurface {
    fn clear(&mut self, size: Vector);
    fn line(&mut self, from: Point, to: Point, kind: BodyKind);
}

impl DrawCommand {
    pub fn apply(&self, surface: &mut dyn DrawSurface) {
        match *self {
            DrawCommand::Clear { size } => surface.clear(size),
            DrawCommand::Line { from, to, kind } => surface.line(from, to, kind),
        }
    }
}

/// Describe the current roster as a frame
pub fn frame_commands(roster: &Roster, arena_size: Vector) -> Vec<DrawCommand> {
    let edge_count: usize = roster.iter().map(|b| b.outline().len()).sum();
    let mut commands = Vec::with_capacity(1 + edge_count);
    commands.push(DrawCommand::Clear { size: arena_size });
    for body in roster.iter() {
        let kind = body.kind();
        commands.extend(body.edges().into_iter().map(|edge| DrawCommand::Line {
            from: edge.start,
            to: edge.end,
            kind,
        }));
    }
    commands
}
