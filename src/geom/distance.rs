//! Signed distance kernels
//!
//! All shape pairs reduce to point/segment primitives. Results are signed:
//! a positive value is the gap between outlines, a negative value means the
//! outlines overlap. Degenerate inputs (zero radius, zero length) collapse
//! to points and are still measured.

use super::{Point, Shape};

/// Minimum distance from point `p` to segment `ab`
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = [(b.x - a.x) as f64, (b.y - a.y) as f64];
    let ap = [(p.x - a.x) as f64, (p.y - a.y) as f64];
    let ab_len2 = ab[0] * ab[0] + ab[1] * ab[1];

    if ab_len2 < 1e-10 {
        // Degenerate segment
        return p.distance_to(&a);
    }

    let t = ((ap[0] * ab[0] + ap[1] * ab[1]) / ab_len2).clamp(0.0, 1.0);
    let cx = a.x as f64 + t * ab[0];
    let cy = a.y as f64 + t * ab[1];
    ((p.x as f64 - cx).powi(2) + (p.y as f64 - cy).powi(2)).sqrt()
}

/// Minimum distance between segments `a1a2` and `b1b2`; zero when they cross
pub fn segment_segment_distance(a1: Point, a2: Point, b1: Point, b2: Point) -> f64 {
    if segments_intersect(a1, a2, b1, b2) {
        return 0.0;
    }
    point_segment_distance(a1, b1, b2)
        .min(point_segment_distance(a2, b1, b2))
        .min(point_segment_distance(b1, a1, a2))
        .min(point_segment_distance(b2, a1, a2))
}

// Exact orientation predicate in i128 so large board coordinates never lose
// the sign to rounding.
fn orient(a: Point, b: Point, c: Point) -> i128 {
    let abx = (b.x - a.x) as i128;
    let aby = (b.y - a.y) as i128;
    let acx = (c.x - a.x) as i128;
    let acy = (c.y - a.y) as i128;
    abx * acy - aby * acx
}

fn in_bbox(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);

    if ((d1 > 0 && d2 < 0) || (d1 < 0 && d2 > 0)) && ((d3 > 0 && d4 < 0) || (d3 < 0 && d4 > 0)) {
        return true;
    }
    (d1 == 0 && in_bbox(b1, b2, a1))
        || (d2 == 0 && in_bbox(b1, b2, a2))
        || (d3 == 0 && in_bbox(a1, a2, b1))
        || (d4 == 0 && in_bbox(a1, a2, b2))
}

fn point_in_polygon(p: Point, points: &[Point]) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let pi = points[i];
        let pj = points[j];
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pj.x as f64
                + (p.y - pj.y) as f64 / (pi.y - pj.y) as f64 * (pi.x - pj.x) as f64;
            if (p.x as f64) < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn polygon_edges(points: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    (0..points.len()).map(move |i| (points[i], points[(i + 1) % points.len()]))
}

fn rect_corners(min: Point, max: Point) -> [Point; 4] {
    [
        Point::new(min.x, min.y),
        Point::new(max.x, min.y),
        Point::new(max.x, max.y),
        Point::new(min.x, max.y),
    ]
}

fn rect_contains(min: Point, max: Point, p: Point) -> bool {
    p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
}

// Signed distance from a point to a rect outline: negative inside.
fn point_rect_distance(p: Point, min: Point, max: Point) -> f64 {
    if rect_contains(min, max, p) {
        let to_edge = (p.x - min.x)
            .min(max.x - p.x)
            .min(p.y - min.y)
            .min(max.y - p.y);
        return -(to_edge as f64);
    }
    let dx = ((min.x - p.x).max(p.x - max.x)).max(0) as f64;
    let dy = ((min.y - p.y).max(p.y - max.y)).max(0) as f64;
    (dx * dx + dy * dy).sqrt()
}

// Signed point-to-polygon distance: min distance to the outline, negated
// when the point lies inside.
fn point_polygon_distance(p: Point, points: &[Point]) -> f64 {
    if points.is_empty() {
        return f64::INFINITY;
    }
    let d = polygon_edges(points)
        .map(|(a, b)| point_segment_distance(p, a, b))
        .fold(f64::INFINITY, f64::min);
    if point_in_polygon(p, points) {
        -d
    } else {
        d
    }
}

// Minimum outline distance between a segment and a polygon; negative when
// an endpoint is swallowed by the polygon.
fn segment_polygon_distance(a: Point, b: Point, points: &[Point]) -> f64 {
    if points.is_empty() {
        return f64::INFINITY;
    }
    let d = polygon_edges(points)
        .map(|(p, q)| segment_segment_distance(a, b, p, q))
        .fold(f64::INFINITY, f64::min);
    if point_in_polygon(a, points) || point_in_polygon(b, points) {
        -d
    } else {
        d
    }
}

// Minimum outline distance between two polygons, negative on containment.
fn polygon_polygon_distance(pa: &[Point], pb: &[Point]) -> f64 {
    if pa.is_empty() || pb.is_empty() {
        return f64::INFINITY;
    }
    let mut d = f64::INFINITY;
    for (a1, a2) in polygon_edges(pa) {
        for (b1, b2) in polygon_edges(pb) {
            d = d.min(segment_segment_distance(a1, a2, b1, b2));
        }
    }
    let contained = pa.iter().any(|p| point_in_polygon(*p, pb))
        || pb.iter().any(|p| point_in_polygon(*p, pa));
    if contained {
        -d
    } else {
        d
    }
}

/// Signed gap between two shapes: positive separation, negative overlap
pub fn shape_distance(a: &Shape, b: &Shape) -> f64 {
    use Shape::*;
    match (a, b) {
        (
            Circle {
                center: ca,
                radius: ra,
            },
            Circle {
                center: cb,
                radius: rb,
            },
        ) => ca.distance_to(cb) - (*ra + *rb) as f64,

        (
            Circle { center, radius },
            Stroke { a, b, width },
        ) => point_segment_distance(*center, *a, *b) - *radius as f64 - *width as f64 / 2.0,

        (Circle { center, radius }, Rect { min, max }) => {
            point_rect_distance(*center, *min, *max) - *radius as f64
        }

        (Circle { center, radius }, Polygon { points }) => {
            point_polygon_distance(*center, points) - *radius as f64
        }

        (
            Stroke {
                a: a1,
                b: a2,
                width: w1,
            },
            Stroke {
                a: b1,
                b: b2,
                width: w2,
            },
        ) => segment_segment_distance(*a1, *a2, *b1, *b2) - (*w1 as f64 + *w2 as f64) / 2.0,

        (
            Stroke { a: s1, b: s2, width },
            Rect { min, max },
        ) => {
            let corners = rect_corners(*min, *max);
            segment_polygon_distance(*s1, *s2, &corners) - *width as f64 / 2.0
        }

        (
            Stroke { a: s1, b: s2, width },
            Polygon { points },
        ) => segment_polygon_distance(*s1, *s2, points) - *width as f64 / 2.0,

        (
            Rect {
                min: amin,
                max: amax,
            },
            Rect {
                min: bmin,
                max: bmax,
            },
        ) => {
            let sep_x = (amin.x.max(bmin.x) - amax.x.min(bmax.x)) as f64;
            let sep_y = (amin.y.max(bmin.y) - amax.y.min(bmax.y)) as f64;
            if sep_x <= 0.0 && sep_y <= 0.0 {
                sep_x.max(sep_y)
            } else {
                let dx = sep_x.max(0.0);
                let dy = sep_y.max(0.0);
                (dx * dx + dy * dy).sqrt()
            }
        }

        (Rect { min, max }, Polygon { points }) => {
            polygon_polygon_distance(&rect_corners(*min, *max), points)
        }

        (Polygon { points: pa }, Polygon { points: pb }) => polygon_polygon_distance(pa, pb),

        _ => shape_distance(b, a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(x: i64, y: i64, r: i64) -> Shape {
        Shape::Circle {
            center: Point::new(x, y),
            radius: r,
        }
    }

    #[test]
    fn test_point_segment_distance() {
        let d = point_segment_distance(Point::new(0, 1), Point::new(0, 0), Point::new(2, 0));
        assert!((d - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_circle_signed() {
        let d = shape_distance(&circle(0, 0, 10), &circle(100, 0, 20));
        assert!((d - 70.0).abs() < 1e-9);

        let d = shape_distance(&circle(0, 0, 60), &circle(100, 0, 60));
        assert!(d < 0.0);
    }

    #[test]
    fn test_crossing_strokes_overlap() {
        let a = Shape::Stroke {
            a: Point::new(-100, 0),
            b: Point::new(100, 0),
            width: 10,
        };
        let b = Shape::Stroke {
            a: Point::new(0, -100),
            b: Point::new(0, 100),
            width: 10,
        };
        assert!(shape_distance(&a, &b) < 0.0);
    }

    #[test]
    fn test_zero_length_stroke_is_a_point() {
        let p = Shape::Stroke {
            a: Point::new(50, 0),
            b: Point::new(50, 0),
            width: 0,
        };
        let d = shape_distance(&p, &circle(0, 0, 10));
        assert!((d - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_inside_rect_is_negative() {
        let r = Shape::Rect {
            min: Point::new(-100, -100),
            max: Point::new(100, 100),
        };
        assert!(shape_distance(&circle(0, 0, 10), &r) < 0.0);

        let d = shape_distance(&circle(200, 0, 10), &r);
        assert!((d - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric_dispatch() {
        let c = circle(0, 0, 10);
        let s = Shape::Stroke {
            a: Point::new(100, -50),
            b: Point::new(100, 50),
            width: 20,
        };
        let d1 = shape_distance(&c, &s);
        let d2 = shape_distance(&s, &c);
        assert!((d1 - d2).abs() < 1e-9);
        assert!((d1 - 80.0).abs() < 1e-9);
    }
}
