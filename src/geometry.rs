use serde::{Deserialize, Serialize};

/// A device-relative coordinate on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two points.
pub fn euclidean_distance(a: Point, b: Point) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// An axis-aligned rectangle with non-negative extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Builds a normalized rectangle from two corners.
    ///
    /// Selections dragged backwards describe a negative width/height; the
    /// corners are ordered here so extents math stays sane.
    pub fn from_corners(start: Point, end: Point) -> Self {
        Self {
            x: start.x.min(end.x),
            y: start.y.min(end.y),
            width: (end.x - start.x).abs(),
            height: (end.y - start.y).abs(),
        }
    }

    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }
}

/// Containment test against the box spanned by `start` and `end`, widened
/// on every side by `margin`.
pub fn in_bounding_box(point: Point, start: Point, end: Point, margin: f32) -> bool {
    point.x > start.x - margin
        && point.x < end.x + margin
        && point.y > start.y - margin
        && point.y < end.y + margin
}
