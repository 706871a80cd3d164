//! Coordinate primitives and stitch-length segmentation.
//!
//! All coordinates are device units (0.1 mm).

use crate::pattern::StitchRun;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<[f64; 2]> for Point {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

pub fn distance(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Axis-aligned bounds of a polygon.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// `None` for an empty point list.
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        (self.width() * self.height()).abs()
    }
}

/// Stitch from `from` to `to` without any single stitch exceeding `max_len`.
///
/// Long segments are split into the fewest equal parts that fit; one stitch
/// lands on each part's end point. The start point itself is never stitched.
pub fn segmented_stitch(run: &mut StitchRun, from: Point, to: Point, max_len: f64) {
    let max_len = if max_len > 0.0 { max_len } else { 1.0 };
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dist = distance(from, to);
    if dist <= max_len {
        run.stitch_to(to);
        return;
    }

    let segments = ((dist / max_len).ceil() as usize).max(1);
    for i in 1..=segments {
        let t = i as f64 / segments as f64;
        run.stitch_to(Point::new(from.x + dx * t, from.y + dy * t));
    }
}
