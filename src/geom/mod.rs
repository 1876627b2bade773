//! Geometric primitives for collision checking
//!
//! Coordinates are integer board units (nanometers in the usual convention);
//! distances come out as `f64`.
//!
//! # Submodules
//! - `distance` - signed shape-to-shape distance kernels

mod distance;

pub use distance::{point_segment_distance, segment_segment_distance, shape_distance};

use serde::{Deserialize, Serialize};

/// A 2D point in integer board units
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn as_f64(&self) -> [f64; 2] {
        [self.x as f64, self.y as f64]
    }
}

/// Collision shape of an item on a layer
///
/// `Stroke` is a thick line segment with round caps (a track); a zero-radius
/// circle or zero-length stroke degenerates to a point and is still testable.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Circle {
        center: Point,
        radius: i64,
    },
    Stroke {
        a: Point,
        b: Point,
        width: i64,
    },
    Rect {
        min: Point,
        max: Point,
    },
    Polygon {
        points: Vec<Point>,
    },
}

impl Shape {
    /// Axis-aligned bounding box as `([min_x, min_y], [max_x, max_y])`
    pub fn bbox(&self) -> ([f64; 2], [f64; 2]) {
        match self {
            Shape::Circle { center, radius } => (
                [(center.x - radius) as f64, (center.y - radius) as f64],
                [(center.x + radius) as f64, (center.y + radius) as f64],
            ),
            Shape::Stroke { a, b, width } => {
                let half = width / 2;
                (
                    [
                        (a.x.min(b.x) - half) as f64,
                        (a.y.min(b.y) - half) as f64,
                    ],
                    [
                        (a.x.max(b.x) + half) as f64,
                        (a.y.max(b.y) + half) as f64,
                    ],
                )
            }
            Shape::Rect { min, max } => (
                [min.x.min(max.x) as f64, min.y.min(max.y) as f64],
                [min.x.max(max.x) as f64, min.y.max(max.y) as f64],
            ),
            Shape::Polygon { points } => {
                let mut min = [f64::MAX, f64::MAX];
                let mut max = [f64::MIN, f64::MIN];
                for p in points {
                    min[0] = min[0].min(p.x as f64);
                    min[1] = min[1].min(p.y as f64);
                    max[0] = max[0].max(p.x as f64);
                    max[1] = max[1].max(p.y as f64);
                }
                if points.is_empty() {
                    ([0.0, 0.0], [0.0, 0.0])
                } else {
                    (min, max)
                }
            }
        }
    }
}
