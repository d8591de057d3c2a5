//! Trim/slice along a cutting line.
//!
//! Closed shapes are partitioned into two polygons along the chord between the
//! first two crossings. Walls are cut at the first crossed edge; a
//! reachability walk then decides whether the wall stays one piece or splits.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geometry::intersect::segment_intersect;
use crate::geometry::math::dist_sq;
use crate::geometry::tolerance::EPS_POS;
use crate::model::{CuttingLine, Point, Shape, ShapeId, WallId};
use crate::Scene;

/// What one slice gesture changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SliceReport {
    pub removed_walls: Vec<WallId>,
    pub removed_shapes: Vec<ShapeId>,
    pub created_walls: Vec<WallId>,
    pub created_shapes: Vec<ShapeId>,
    /// Walls cut in place (connected case, or the reachable part of a split).
    pub updated_walls: Vec<WallId>,
    /// Shapes the line crossed only once; left untouched.
    pub rejected_shapes: Vec<ShapeId>,
}

impl SliceReport {
    pub fn is_mutation(&self) -> bool {
        !(self.removed_walls.is_empty()
            && self.removed_shapes.is_empty()
            && self.created_walls.is_empty()
            && self.created_shapes.is_empty()
            && self.updated_walls.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PolygonCut {
    Miss,
    /// Exactly one crossing; the ring cannot be partitioned.
    Single(Point),
    Split(Vec<Point>, Vec<Point>),
}

/// Partition a closed ring along `line`.
///
/// Crossings are ordered by edge index, then by distance from the edge start;
/// the first two become the chord. Both pieces contain both cut points.
pub fn slice_polygon(ring: &[Point], line: &CuttingLine) -> PolygonCut {
    let n = ring.len();
    if n < 3 {
        return PolygonCut::Miss;
    }
    let mut hits: Vec<(usize, f64, Point)> = Vec::new();
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        if let Some(p) = segment_intersect(a, b, line.start, line.end) {
            hits.push((i, dist_sq(a, p), p));
        }
    }
    hits.sort_by(|x, y| x.0.cmp(&y.0).then(x.1.total_cmp(&y.1)));
    match hits.len() {
        0 => PolygonCut::Miss,
        1 => PolygonCut::Single(hits[0].2),
        _ => {
            let (i, _, i1) = hits[0];
            let (j, _, i2) = hits[1];
            let mut a = Vec::with_capacity(j - i + 2);
            a.push(i1);
            a.extend_from_slice(&ring[i + 1..=j]);
            a.push(i2);
            let mut b = Vec::with_capacity(n - (j - i) + 2);
            b.push(i2);
            b.extend_from_slice(&ring[j + 1..]);
            b.extend_from_slice(&ring[..=i]);
            b.push(i1);
            PolygonCut::Split(a, b)
        }
    }
}

pub fn slice_scene(scene: &mut Scene, line: &CuttingLine) -> SliceReport {
    let mut report = SliceReport::default();
    if !line.start.is_finite() || !line.end.is_finite() || dist_sq(line.start, line.end) <= EPS_POS * EPS_POS {
        tracing::debug!("degenerate cutting line ignored");
        return report;
    }
    slice_shapes(scene, line, &mut report);
    slice_walls(scene, line, &mut report);
    if report.is_mutation() {
        scene.bump();
    }
    tracing::debug!(
        removed_shapes = report.removed_shapes.len(),
        created_shapes = report.created_shapes.len(),
        updated_walls = report.updated_walls.len(),
        created_walls = report.created_walls.len(),
        rejected = report.rejected_shapes.len(),
        "slice"
    );
    report
}

fn slice_shapes(scene: &mut Scene, line: &CuttingLine, report: &mut SliceReport) {
    for id in scene.shape_ids() {
        let Some(shape) = scene.shape(id) else { continue };
        if !shape.is_closed() {
            continue;
        }
        let Some(ring) = shape.boundary_polygon() else { continue };
        match slice_polygon(&ring, line) {
            PolygonCut::Miss => {}
            PolygonCut::Single(p) => {
                tracing::debug!(shape = id, x = p.x, y = p.y, "cut must cross the shape twice");
                report.rejected_shapes.push(id);
            }
            PolygonCut::Split(a, b) => {
                let style = shape.style;
                scene.take_shape(id);
                report.removed_shapes.push(id);
                for piece in [a, b] {
                    let mut s = Shape::polygon(&piece).with_style(style);
                    s.z = scene.next_z();
                    report.created_shapes.push(scene.insert_shape(s));
                }
            }
        }
    }
}

fn slice_walls(scene: &mut Scene, line: &CuttingLine, report: &mut SliceReport) {
    let min_len = scene.config.min_edge_length;
    for id in scene.wall_ids() {
        let Some(wall) = scene.wall_mut(id) else { continue };
        let hit = wall.segments().into_iter().enumerate().find_map(|(e, (a, b))| {
            segment_intersect(a, b, line.start, line.end).map(|p| (e, p))
        });
        let Some((e, p)) = hit else { continue };
        let origin = wall.edges()[e].a;
        if wall.cut_edge(e, p).is_none() {
            continue;
        }
        let reachable = wall.nodes_reachable_from(origin);
        tracing::trace!(wall = id, edge = e, reachable = reachable.len(), nodes = wall.node_count(), "wall cut");

        if reachable.len() == wall.node_count() {
            wall.finalize(min_len);
            report.updated_walls.push(id);
            continue;
        }

        let rest: HashSet<u32> = (0..wall.node_count() as u32).filter(|n| !reachable.contains(n)).collect();
        let mut kept = wall.subset(&reachable);
        let mut split = wall.subset(&rest);
        kept.finalize(min_len);
        split.finalize(min_len);

        if kept.edge_count() > 0 {
            scene.put_wall(kept);
            report.updated_walls.push(id);
        } else {
            scene.take_wall(id);
            report.removed_walls.push(id);
        }
        if split.edge_count() > 0 {
            let new_id = scene.insert_wall(split);
            tracing::debug!(wall = id, split_off = new_id, "wall separated");
            report.created_walls.push(new_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tolerance::MERGE_TOL;
    use crate::Wall;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn cut(ax: f64, ay: f64, bx: f64, by: f64) -> CuttingLine {
        CuttingLine::new(p(ax, ay), p(bx, by))
    }

    #[test]
    fn square_splits_into_two_rectangles() {
        let sq = [p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0), p(0.0, 100.0)];
        let PolygonCut::Split(a, b) = slice_polygon(&sq, &cut(50.0, -10.0, 50.0, 110.0)) else {
            panic!("expected split");
        };
        assert_eq!(a.len() + b.len(), sq.len() + 4);
        assert_eq!(a, vec![p(50.0, 0.0), p(100.0, 0.0), p(100.0, 100.0), p(50.0, 100.0)]);
        assert_eq!(b, vec![p(50.0, 100.0), p(0.0, 100.0), p(0.0, 0.0), p(50.0, 0.0)]);
    }

    #[test]
    fn grazing_line_is_single() {
        let sq = [p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0), p(0.0, 100.0)];
        assert!(matches!(slice_polygon(&sq, &cut(50.0, -10.0, 50.0, 50.0)), PolygonCut::Single(_)));
        assert_eq!(slice_polygon(&sq, &cut(200.0, 0.0, 300.0, 0.0)), PolygonCut::Miss);
    }

    #[test]
    fn shape_slice_replaces_original() {
        let mut s = Scene::new();
        let id = s.add_shape(Shape::rectangle(p(50.0, 50.0), 100.0, 100.0)).unwrap();
        let r = s.slice_at(cut(-10.0, 30.0, 110.0, 30.0));
        assert_eq!(r.removed_shapes, vec![id]);
        assert_eq!(r.created_shapes.len(), 2);
        assert!(s.shape(id).is_none());
        let zs: Vec<u32> = r.created_shapes.iter().map(|&c| s.shape(c).unwrap().z).collect();
        assert!(zs[0] > 0 && zs[1] > zs[0]);
    }

    #[test]
    fn open_wall_cut_separates() {
        let mut s = Scene::new();
        let pts = [p(0.0, 0.0), p(1000.0, 0.0), p(2000.0, 0.0)];
        let id = s.add_wall(Wall::from_polyline(0, &pts, false, 100.0, 100.0, MERGE_TOL)).unwrap();
        let r = s.slice_at(cut(1500.0, -100.0, 1500.0, 100.0));
        assert_eq!(r.updated_walls, vec![id]);
        assert_eq!(r.created_walls.len(), 1);
        let a = s.wall(id).unwrap();
        let b = s.wall(r.created_walls[0]).unwrap();
        assert_eq!(a.node_count() + b.node_count(), pts.len() + 2);
        assert_eq!(a.edge_count() + b.edge_count(), 2 + 1);
        assert!(!a.closed && !b.closed);
        assert_eq!(a.z, b.z);
    }

    #[test]
    fn loop_cut_stays_connected() {
        let mut s = Scene::new();
        let pts = [p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0), p(0.0, 100.0), p(0.0, 0.0)];
        let id = s.add_wall(Wall::from_polyline(0, &pts, true, 10.0, 10.0, MERGE_TOL)).unwrap();
        let r = s.slice_at(cut(50.0, -10.0, 50.0, 10.0));
        assert_eq!(r.updated_walls, vec![id]);
        assert!(r.created_walls.is_empty());
        let w = s.wall(id).unwrap();
        assert!(!w.closed);
        assert_eq!(w.edge_count(), 4 - 1 + 2);
        assert_eq!(w.node_count(), 6);
    }

    #[test]
    fn miss_leaves_version() {
        let mut s = Scene::new();
        s.add_shape(Shape::rectangle(p(0.0, 0.0), 10.0, 10.0)).unwrap();
        let v = s.version();
        let r = s.slice_at(cut(100.0, 100.0, 200.0, 200.0));
        assert!(!r.is_mutation());
        assert_eq!(s.version(), v);
    }
}
