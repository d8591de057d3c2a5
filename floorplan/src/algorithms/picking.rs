use crate::geometry::math::{point_in_polygon, rotate_about, seg_distance_sq};
use crate::model::{Point, Shape, ShapeKind};
use crate::{Pick, Scene, Wall};

// Nearest edge of a wall as (edge, t, dist to the centerline).
fn nearest_edge(w: &Wall, p: Point) -> Option<(u32, f64, f64)> {
    let mut best: Option<(u32, f64, f64)> = None;
    for (i, (a, b)) in w.segments().into_iter().enumerate() {
        let (d2, t) = seg_distance_sq(p, a, b);
        if best.map_or(true, |(_, _, bd)| d2 < bd) { best = Some((i as u32, t, d2)); }
    }
    best.map(|(e, t, d2)| (e, t, d2.sqrt()))
}

fn polyline_distance(points: &[Point], p: Point, closed: bool) -> Option<f64> {
    let n = points.len();
    if n < 2 { return None; }
    let segs = if closed { n } else { n - 1 };
    (0..segs)
        .map(|i| seg_distance_sq(p, points[i], points[(i + 1) % n]).0)
        .min_by(|a, b| a.total_cmp(b))
        .map(f64::sqrt)
}

fn shape_distance(s: &Shape, p: Point) -> Option<f64> {
    if let ShapeKind::Freehand { points } = &s.kind {
        let world: Vec<Point> = points.iter().map(|&q| rotate_about(s.anchor + q, s.anchor, s.rotation)).collect();
        return polyline_distance(&world, p, false);
    }
    let ring = s.boundary_polygon()?;
    if s.is_closed() && point_in_polygon(p, &ring) { return Some(0.0); }
    polyline_distance(&ring, p, s.is_closed())
}

/// Top-most wall or shape under `p`. Walls count their half gap as part of the hit area.
pub fn pick_impl(scene: &Scene, p: Point, tol: f64) -> Option<Pick> {
    if !p.is_finite() || !tol.is_finite() { return None; }
    // (z, dist, pick)
    let mut best: Option<(u32, f64, Pick)> = None;
    let mut offer = |z: u32, d: f64, pick: Pick| {
        let better = match &best { None => true, Some((bz, bd, _)) => z > *bz || (z == *bz && d < *bd) };
        if better { best = Some((z, d, pick)); }
    };
    for w in scene.list_walls() {
        if let Some((edge, t, d)) = nearest_edge(w, p) {
            if d <= tol + 0.5 * w.gap { offer(w.z, d, Pick::Wall { id: w.id, edge, t, dist: d }); }
        }
    }
    for s in scene.list_shapes() {
        if let Some(d) = shape_distance(s, p) {
            if d <= tol { offer(s.z, d, Pick::Shape { id: s.id, dist: d }); }
        }
    }
    best.map(|(_, _, pick)| pick)
}
