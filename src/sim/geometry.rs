//! Planar geometry for polygon outlines
//!
//! Pure functions only: moving and rotating points, closing an outline into
//! edges, and the segment intersection test the collision pass is built on.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::{Point, Vector};

/// A line segment, one edge of an outline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Zero-length edge. Never intersects anything.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

/// Offset a point by a vector
#[inline]
pub fn translate(point: Point, by: Vector) -> Point {
    Point::new(point.x + by.x, point.y + by.y)
}

/// Rotate `point` about `pivot` by `angle` radians (counter-clockwise in math
/// convention; screen flipping is the renderer's business)
#[inline]
pub fn rotate(point: Point, pivot: Point, angle: f32) -> Point {
    let (sin, cos) = angle.sin_cos();
    // Both coordinates come from the unrotated offsets
    let dx = point.x - pivot.x;
    let dy = point.y - pivot.y;
    Point::new(dx * cos - dy * sin + pivot.x, dx * sin + dy * cos + pivot.y)
}

/// Close an outline into its edges: `(p0,p1), (p1,p2), ..., (pn-1,p0)`.
///
/// N points always give N edges. A single point gives one degenerate edge.
pub fn outline_to_edges(points: &[Point]) -> SimResult<Vec<Segment>> {
    if points.is_empty() {
        return Err(SimError::EmptyOutline);
    }
    Ok(closed_edges(points))
}

/// Edge builder for outlines already known to be non-empty
pub(crate) fn closed_edges(points: &[Point]) -> Vec<Segment> {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&start, &end)| Segment::new(start, end))
        .collect()
}

/// Whether two segments cross or touch.
///
/// Solves for the parametric fractions along both segments. Parallel and
/// collinear segments (zero determinant) never count, overlapping or not.
/// Endpoints are inclusive, so segments touching at a tip intersect.
pub fn segments_intersect(a: &Segment, b: &Segment) -> bool {
    let (a0, a1) = (a.start, a.end);
    let (b0, b1) = (b.start, b.end);

    let d = (b1.y - b0.y) * (a1.x - a0.x) - (b1.x - b0.x) * (a1.y - a0.y);
    if d == 0.0 {
        return false;
    }

    let n1 = (b1.x - b0.x) * (a0.y - b0.y) - (b1.y - b0.y) * (a0.x - b0.x);
    let n2 = (a1.x - a0.x) * (a0.y - b0.y) - (a1.y - a0.y) * (a0.x - b0.x);

    let t1 = n1 / d;
    let t2 = n2 / d;
    (0.0..=1.0).contains(&t1) && (0.0..=1.0).contains(&t2)
}
