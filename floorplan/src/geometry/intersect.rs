// Segment-segment intersection for wall and polygon edges.
// Only strictly interior crossings count; endpoint touches never split anything.

use super::tolerance::EPS_DENOM;
use crate::model::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegIntersection {
    None,
    // Parallel or degenerate: determinant below EPS_DENOM
    Parallel,
    // Interior crossing: 0 < t < 1 and 0 < u < 1
    Proper { t: f64, u: f64, point: Point },
    // Lines meet within both closed ranges but at an endpoint of at least one segment
    Touch { t: f64, u: f64, point: Point },
}

pub fn classify_segments(p1: Point, p2: Point, p3: Point, p4: Point) -> SegIntersection {
    if !(p1.is_finite() && p2.is_finite() && p3.is_finite() && p4.is_finite()) {
        return SegIntersection::None;
    }
    let r_x = p2.x - p1.x; let r_y = p2.y - p1.y;
    let s_x = p4.x - p3.x; let s_y = p4.y - p3.y;
    let rxs = r_x * s_y - r_y * s_x;
    if rxs.abs() < EPS_DENOM {
        return SegIntersection::Parallel;
    }
    let q_x = p3.x - p1.x; let q_y = p3.y - p1.y;
    let t = (q_x * s_y - q_y * s_x) / rxs;
    let u = (q_x * r_y - q_y * r_x) / rxs;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return SegIntersection::None;
    }
    let point = Point::new(p1.x + t * r_x, p1.y + t * r_y);
    if t > 0.0 && t < 1.0 && u > 0.0 && u < 1.0 {
        SegIntersection::Proper { t, u, point }
    } else {
        SegIntersection::Touch { t, u, point }
    }
}

/// Interior crossing point of `p1`-`p2` and `p3`-`p4`, if any.
pub fn segment_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    match classify_segments(p1, p2, p3, p4) {
        SegIntersection::Proper { point, .. } => Some(point),
        _ => None,
    }
}

/// Parameters `(t, u)` of an interior crossing along each segment.
pub fn segment_intersect_params(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<(f64, f64, Point)> {
    match classify_segments(p1, p2, p3, p4) {
        SegIntersection::Proper { t, u, point } => Some((t, u, point)),
        _ => None,
    }
}

pub fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    matches!(classify_segments(p1, p2, p3, p4), SegIntersection::Proper { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point { Point::new(x, y) }

    #[test]
    fn proper_cross() {
        let r = classify_segments(p(0.0,0.0), p(2.0,2.0), p(0.0,2.0), p(2.0,0.0));
        match r { SegIntersection::Proper{t,u,point} => { assert!((t-0.5).abs()<1e-12 && (u-0.5).abs()<1e-12); assert_eq!(point, p(1.0,1.0)); }, _ => panic!("expected proper") }
    }

    #[test]
    fn endpoint_touch_is_not_a_crossing() {
        let r = classify_segments(p(0.0,0.0), p(1.0,0.0), p(1.0,0.0), p(1.0,1.0));
        assert!(matches!(r, SegIntersection::Touch{..}));
        assert_eq!(segment_intersect(p(0.0,0.0), p(1.0,0.0), p(1.0,0.0), p(1.0,1.0)), None);
    }

    #[test]
    fn t_junction_is_touch() {
        let r = classify_segments(p(0.0,0.0), p(10.0,0.0), p(5.0,0.0), p(5.0,5.0));
        assert!(matches!(r, SegIntersection::Touch{..}));
    }

    #[test]
    fn parallel_and_collinear() {
        assert_eq!(classify_segments(p(0.0,0.0), p(3.0,0.0), p(0.0,1.0), p(3.0,1.0)), SegIntersection::Parallel);
        assert_eq!(classify_segments(p(0.0,0.0), p(3.0,0.0), p(1.0,0.0), p(2.0,0.0)), SegIntersection::Parallel);
    }

    #[test]
    fn disjoint() {
        assert_eq!(classify_segments(p(0.0,0.0), p(1.0,1.0), p(5.0,0.0), p(4.0,1.0)), SegIntersection::None);
        assert!(!segments_intersect(p(0.0,0.0), p(1.0,1.0), p(5.0,0.0), p(4.0,1.0)));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        assert_eq!(segment_intersect(p(f64::NAN,0.0), p(2.0,2.0), p(0.0,2.0), p(2.0,0.0)), None);
    }
}
