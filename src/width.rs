//! Track-width inheritance
//!
//! When a new trace starts from a pad that already has differently-sized
//! tracks attached, the router needs a sensible starting width. Without a
//! cursor the narrowest attached width is the conservative pick; with one,
//! the attached segment pointing most nearly at the cursor wins.

use crate::geom::{shape_distance, Point, Shape};
use crate::item::Item;
use crate::node::Node;
use crate::rules::RuleResolver;

// Cosine tolerance under which two directions count as an exact tie.
// Deliberately tight: a nominally closer segment must win.
const TIE_EPSILON: f64 = 1e-6;

struct Attached {
    width: i64,
    // Unit direction away from the anchor; None for zero-length segments
    dir: Option<[f64; 2]>,
}

fn unit(from: Point, to: Point) -> Option<[f64; 2]> {
    let dx = (to.x - from.x) as f64;
    let dy = (to.y - from.y) as f64;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-9 {
        None
    } else {
        Some([dx / len, dy / len])
    }
}

impl<R: RuleResolver> Node<R> {
    /// Pick a track width for a new trace starting at `anchor`.
    ///
    /// Considers segments directly touching the anchor on its starting
    /// layer. Without a cursor the minimum attached width is returned; with
    /// one, the width of the segment whose outgoing direction best aligns
    /// with the anchor-to-cursor direction, ties broken toward the narrower
    /// width. `None` exactly when nothing is attached.
    pub fn inherit_track_width(&self, anchor: &Item, cursor: Option<Point>) -> Option<i64> {
        let layer = anchor.layers().start();
        let anchor_pos = anchor.anchor();
        let anchor_shape = anchor.shape();

        let mut attached: Vec<Attached> = Vec::new();
        for (_, item) in self.items() {
            let Item::Segment(seg) = item else { continue };
            if !seg.layers.overlaps(layer) {
                continue;
            }
            // Touching = an endpoint on or inside the anchor's shape
            let end_on_anchor = |p: Point| {
                let probe = Shape::Circle {
                    center: p,
                    radius: 0,
                };
                shape_distance(&probe, &anchor_shape) <= 0.0
            };
            let (touch, other) = if end_on_anchor(seg.a) {
                (seg.a, seg.b)
            } else if end_on_anchor(seg.b) {
                (seg.b, seg.a)
            } else {
                continue;
            };
            attached.push(Attached {
                width: seg.width,
                dir: unit(touch, other),
            });
        }

        if attached.is_empty() {
            return None;
        }

        let min_width = attached.iter().map(|a| a.width).min();

        let Some(cursor) = cursor else {
            return min_width;
        };
        let Some(cursor_dir) = unit(anchor_pos, cursor) else {
            // Cursor sitting on the anchor gives no direction to follow
            return min_width;
        };

        let score = |a: &Attached| match a.dir {
            Some(d) => d[0] * cursor_dir[0] + d[1] * cursor_dir[1],
            None => -2.0,
        };
        let best = attached
            .iter()
            .map(score)
            .fold(f64::NEG_INFINITY, f64::max);
        attached
            .iter()
            .filter(|a| best - score(a) <= TIE_EPSILON)
            .map(|a| a.width)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Shape;
    use crate::item::{NetId, Segment, Solid};
    use crate::layers::LayerRange;
    use crate::rules::DesignRules;

    fn pad_at_origin() -> Item {
        Item::Solid(Solid {
            source: None,
            net: Some(NetId(1)),
            layers: LayerRange::new(0, 0),
            pos: Point::new(0, 0),
            shape: Shape::Circle {
                center: Point::new(0, 0),
                radius: 300_000,
            },
            aperture: false,
            copperless: false,
            edge: false,
            drill: None,
        })
    }

    fn seg_from_origin(to: Point, width: i64) -> Item {
        Item::Segment(Segment {
            source: None,
            net: Some(NetId(1)),
            layers: LayerRange::new(0, 0),
            a: Point::new(0, 0),
            b: to,
            width,
            locked: false,
        })
    }

    fn two_track_node() -> Node<DesignRules> {
        let mut node = Node::new(DesignRules::default(), LayerRange::new(0, 3));
        node.add(seg_from_origin(Point::new(2_000_000, 0), 250_000));
        node.add(seg_from_origin(Point::new(0, 2_000_000), 500_000));
        node
    }

    #[test]
    fn test_no_cursor_picks_minimum() {
        let node = two_track_node();
        assert_eq!(
            node.inherit_track_width(&pad_at_origin(), None),
            Some(250_000)
        );
    }

    #[test]
    fn test_cursor_follows_direction() {
        let node = two_track_node();
        let pad = pad_at_origin();
        assert_eq!(
            node.inherit_track_width(&pad, Some(Point::new(1_500_000, 100_000))),
            Some(250_000)
        );
        assert_eq!(
            node.inherit_track_width(&pad, Some(Point::new(100_000, 1_500_000))),
            Some(500_000)
        );
    }

    #[test]
    fn test_near_diagonal_cursor_prefers_nominally_closer() {
        let node = two_track_node();
        let pad = pad_at_origin();
        // Barely closer to the vertical (wide) track
        assert_eq!(
            node.inherit_track_width(&pad, Some(Point::new(1_000_000, 1_001_000))),
            Some(500_000)
        );
    }

    #[test]
    fn test_exact_tie_breaks_toward_narrower() {
        let node = two_track_node();
        let pad = pad_at_origin();
        assert_eq!(
            node.inherit_track_width(&pad, Some(Point::new(1_000_000, 1_000_000))),
            Some(250_000)
        );
    }

    #[test]
    fn test_no_attached_segments_is_none() {
        let node = Node::new(DesignRules::default(), LayerRange::new(0, 3));
        assert_eq!(node.inherit_track_width(&pad_at_origin(), None), None);
    }

    #[test]
    fn test_detached_segment_is_ignored() {
        let mut node = two_track_node();
        node.add(Item::Segment(Segment {
            source: None,
            net: Some(NetId(1)),
            layers: LayerRange::new(0, 0),
            a: Point::new(5_000_000, 5_000_000),
            b: Point::new(6_000_000, 5_000_000),
            width: 100_000,
            locked: false,
        }));
        assert_eq!(
            node.inherit_track_width(&pad_at_origin(), None),
            Some(250_000)
        );
    }
}
