//! Track segments

use super::NetId;
use crate::geom::{Point, Shape};
use crate::layers::LayerRange;

/// A straight track segment with round caps
#[derive(Clone, Debug)]
pub struct Segment {
    pub source: Option<u64>,
    pub net: Option<NetId>,
    pub layers: LayerRange,
    pub a: Point,
    pub b: Point,
    pub width: i64,
    /// Protected against being moved by the shove algorithm
    pub locked: bool,
}

impl Segment {
    pub fn shape(&self) -> Shape {
        Shape::Stroke {
            a: self.a,
            b: self.b,
            width: self.width,
        }
    }

    pub fn length(&self) -> f64 {
        self.a.distance_to(&self.b)
    }

    /// Split at an interior point into two segments.
    ///
    /// Both halves are clones of the original with only the endpoints
    /// adjusted, so `locked`, `width`, `layers` and `net` all carry over.
    /// Building the halves from scratch instead would silently drop the
    /// lock flag.
    pub fn split_at(&self, p: Point) -> (Segment, Segment) {
        let mut left = self.clone();
        let mut right = self.clone();
        left.b = p;
        right.a = p;
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked_segment() -> Segment {
        Segment {
            source: Some(42),
            net: Some(NetId(3)),
            layers: LayerRange::new(0, 0),
            a: Point::new(0, 0),
            b: Point::new(1_000_000, 0),
            width: 250_000,
            locked: true,
        }
    }

    #[test]
    fn test_split_preserves_lock_and_width() {
        let seg = locked_segment();
        let (left, right) = seg.split_at(Point::new(400_000, 0));

        assert!(left.locked);
        assert!(right.locked);
        assert_eq!(left.width, seg.width);
        assert_eq!(right.width, seg.width);
        assert_eq!(left.net, seg.net);
        assert_eq!(right.layers, seg.layers);
    }

    #[test]
    fn test_split_adjusts_only_endpoints() {
        let seg = locked_segment();
        let mid = Point::new(600_000, 0);
        let (left, right) = seg.split_at(mid);

        assert_eq!(left.a, seg.a);
        assert_eq!(left.b, mid);
        assert_eq!(right.a, mid);
        assert_eq!(right.b, seg.b);
    }
}
