use super::tolerance::{clamp01, EPS_LEN, PERP_COS};
use crate::model::Point;

#[inline]
pub fn dot(a: Point, b: Point) -> f64 { a.x*b.x + a.y*b.y }

#[inline]
pub fn cross(a: Point, b: Point) -> f64 { a.x*b.y - a.y*b.x }

#[inline]
pub fn length(v: Point) -> f64 { (v.x*v.x + v.y*v.y).sqrt() }

#[inline]
pub fn dist(a: Point, b: Point) -> f64 { length(b - a) }

#[inline]
pub fn dist_sq(a: Point, b: Point) -> f64 { let d = b - a; d.x*d.x + d.y*d.y }

#[inline]
pub fn lerp(a: Point, b: Point, t: f64) -> Point { a + (b - a) * t }

/// Unit vector, or None for (near) zero length.
#[inline]
pub fn normalize(v: Point) -> Option<Point> {
    let len = length(v);
    if len > EPS_LEN && len.is_finite() { Some(v * (1.0 / len)) } else { None }
}

/// Left-hand normal of a direction.
#[inline]
pub fn perp(v: Point) -> Point { Point::new(-v.y, v.x) }

/// Squared distance from `p` to segment `a`-`b` and the clamped parameter of the foot point.
pub fn seg_distance_sq(p: Point, a: Point, b: Point) -> (f64, f64) {
    let v = b - a;
    let w = p - a;
    let vv = dot(v, v);
    let t = if vv > 0.0 { clamp01(dot(w, v) / vv) } else { 0.0 };
    (dist_sq(p, lerp(a, b, t)), t)
}

/// Directions within 5 degrees of a right angle. Degenerate directions are never perpendicular.
pub fn is_perpendicular(dir_a: Point, dir_b: Point) -> bool {
    match (normalize(dir_a), normalize(dir_b)) {
        (Some(a), Some(b)) => dot(a, b).abs() < PERP_COS,
        _ => false,
    }
}

pub fn bbox<I: IntoIterator<Item = Point>>(points: I) -> Option<(Point, Point)> {
    let mut it = points.into_iter();
    let first = it.next()?;
    let (mut min, mut max) = (first, first);
    for p in it {
        min.x = min.x.min(p.x); min.y = min.y.min(p.y);
        max.x = max.x.max(p.x); max.y = max.y.max(p.y);
    }
    Some((min, max))
}

pub fn bbox_center<I: IntoIterator<Item = Point>>(points: I) -> Option<Point> {
    bbox(points).map(|(min, max)| Point::new(0.5*(min.x + max.x), 0.5*(min.y + max.y)))
}

/// Even-odd containment test against a closed ring.
pub fn point_in_polygon(p: Point, ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 3 { return false; }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x { inside = !inside; }
        }
        j = i;
    }
    inside
}

/// Rotate `p` about `center` by `degrees` (counter-clockwise).
pub fn rotate_about(p: Point, center: Point, degrees: f64) -> Point {
    if degrees == 0.0 { return p; }
    let (s, c) = degrees.to_radians().sin_cos();
    let d = p - center;
    Point::new(center.x + d.x*c - d.y*s, center.y + d.x*s + d.y*c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perpendicular_within_five_degrees() {
        let x = Point::new(1.0, 0.0);
        assert!(is_perpendicular(x, Point::new(0.0, 5.0)));
        let near = Point::new(4f64.to_radians().sin(), 4f64.to_radians().cos());
        assert!(is_perpendicular(x, near));
        let off = Point::new(6f64.to_radians().sin(), 6f64.to_radians().cos());
        assert!(!is_perpendicular(x, off));
        assert!(!is_perpendicular(x, Point::ORIGIN));
    }

    #[test]
    fn seg_distance_clamps() {
        let (d2, t) = seg_distance_sq(Point::new(-3.0, 4.0), Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!((d2 - 25.0).abs() < 1e-12);
        assert_eq!(t, 0.0);
    }

    #[test]
    fn containment_square() {
        let sq = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
        assert!(point_in_polygon(Point::new(5.0, 5.0), &sq));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &sq));
    }
}
