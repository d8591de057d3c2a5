use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::intersect::segment_intersect_params;
use crate::geometry::math::bbox;
use crate::geometry::tolerance::{CROSSING_CELL, EPS_POS};
use crate::model::{Point, WallId};
use crate::Scene;

/// Result of the crossing pass: nodes inserted per wall and the number of crossings split.
#[derive(Debug, Clone, Default)]
pub struct CrossingSplit {
    pub inserted: BTreeMap<WallId, Vec<u32>>,
    pub crossings: usize,
}

#[derive(Clone, Copy)]
struct Seg { a: Point, b: Point, wall: WallId, edge: usize }

/// Split every pair of edges from different walls that cross in their interiors.
///
/// Each wall gets its own node at the crossing point; nodes are never shared
/// between walls. Edges are split in place so the rest of the edge order holds.
pub fn split_wall_crossings(scene: &mut Scene) -> CrossingSplit {
    // 1) Collect world segments
    let mut segs: Vec<Seg> = Vec::new();
    for w in scene.list_walls() {
        for (e, (a, b)) in w.segments().into_iter().enumerate() {
            segs.push(Seg { a, b, wall: w.id, edge: e });
        }
    }
    let mut out = CrossingSplit::default();
    if segs.len() < 2 {
        return out;
    }

    // 2) Uniform grid; cell grows with the scene so one axis never exceeds ~256 cells
    let Some((min, max)) = bbox(segs.iter().flat_map(|s| [s.a, s.b])) else { return out };
    let extent = (max.x - min.x).max(max.y - min.y);
    let cell = CROSSING_CELL.max(extent / 256.0);
    let cell_ix = |v: f64, o: f64| -> i64 { ((v - o) / cell).floor() as i64 };
    let mut buckets: BTreeMap<(i64, i64), Vec<usize>> = BTreeMap::new();
    for (i, s) in segs.iter().enumerate() {
        let ix0 = cell_ix(s.a.x.min(s.b.x), min.x); let ix1 = cell_ix(s.a.x.max(s.b.x), min.x);
        let iy0 = cell_ix(s.a.y.min(s.b.y), min.y); let iy1 = cell_ix(s.a.y.max(s.b.y), min.y);
        for ix in ix0..=ix1 { for iy in iy0..=iy1 { buckets.entry((ix, iy)).or_default().push(i); } }
    }

    // 3) Pairwise tests within buckets
    let mut splits: Vec<Vec<(f64, Point)>> = vec![Vec::new(); segs.len()];
    let mut tested: BTreeSet<(usize, usize)> = BTreeSet::new();
    for list in buckets.values() {
        for x in 0..list.len() {
            let i = list[x];
            for &j in &list[(x + 1)..] {
                if segs[i].wall == segs[j].wall { continue; }
                let (lo, hi) = if i < j { (i, j) } else { (j, i) };
                if !tested.insert((lo, hi)) { continue; }
                let (s1, s2) = (segs[lo], segs[hi]);
                if s1.a.x.max(s1.b.x) < s2.a.x.min(s2.b.x) || s2.a.x.max(s2.b.x) < s1.a.x.min(s1.b.x)
                    || s1.a.y.max(s1.b.y) < s2.a.y.min(s2.b.y) || s2.a.y.max(s2.b.y) < s1.a.y.min(s1.b.y) {
                    continue;
                }
                if let Some((t, u, p)) = segment_intersect_params(s1.a, s1.b, s2.a, s2.b) {
                    splits[lo].push((t, p));
                    splits[hi].push((u, p));
                    out.crossings += 1;
                }
            }
        }
    }
    if out.crossings == 0 {
        return out;
    }

    // 4) Apply per wall, highest edge index first so lower indices stay valid
    let mut per_wall: BTreeMap<WallId, Vec<(usize, Vec<Point>)>> = BTreeMap::new();
    for (idx, s) in segs.iter().enumerate() {
        let mut ts = std::mem::take(&mut splits[idx]);
        if ts.is_empty() { continue; }
        ts.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut pts: Vec<Point> = Vec::with_capacity(ts.len());
        for (_, p) in ts {
            if pts.last().map_or(true, |q: &Point| (q.x - p.x).abs() > EPS_POS || (q.y - p.y).abs() > EPS_POS) {
                pts.push(p);
            }
        }
        per_wall.entry(s.wall).or_default().push((s.edge, pts));
    }
    for (wid, mut edges) in per_wall {
        edges.sort_by(|a, b| b.0.cmp(&a.0));
        let Some(wall) = scene.wall_mut(wid) else { continue };
        let mut inserted = Vec::new();
        for (e, pts) in edges {
            inserted.extend(wall.split_edge(e, &pts));
        }
        tracing::trace!(wall = wid, nodes = inserted.len(), "split wall at crossings");
        out.inserted.insert(wid, inserted);
    }
    tracing::debug!(crossings = out.crossings, walls = out.inserted.len(), "crossing pass");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tolerance::MERGE_TOL;
    use crate::Wall;

    fn line_wall(a: Point, b: Point) -> Wall {
        Wall::from_polyline(0, &[a, b], false, 10.0, 10.0, MERGE_TOL)
    }

    #[test]
    fn crossing_walls_both_split() {
        let mut s = Scene::new();
        s.insert_wall(line_wall(Point::new(0.0, 500.0), Point::new(1000.0, 500.0)));
        s.insert_wall(line_wall(Point::new(500.0, 0.0), Point::new(500.0, 1000.0)));
        let r = split_wall_crossings(&mut s);
        assert_eq!(r.crossings, 1);
        for w in s.list_walls() {
            assert_eq!(w.edge_count(), 2);
            assert_eq!(w.world(2), Some(Point::new(500.0, 500.0)));
        }
    }

    #[test]
    fn touching_walls_are_not_split() {
        let mut s = Scene::new();
        s.insert_wall(line_wall(Point::new(0.0, 0.0), Point::new(1000.0, 0.0)));
        s.insert_wall(line_wall(Point::new(500.0, 0.0), Point::new(500.0, 1000.0)));
        let r = split_wall_crossings(&mut s);
        assert_eq!(r.crossings, 0);
        assert!(s.list_walls().iter().all(|w| w.edge_count() == 1));
    }

    #[test]
    fn grid_counts_match() {
        let mut s = Scene::new();
        let (v, h) = (6usize, 5usize);
        for i in 0..v {
            let x = 100.0 + 300.0 * i as f64;
            s.insert_wall(line_wall(Point::new(x, -50.0), Point::new(x, 2000.0)));
        }
        for j in 0..h {
            let y = 150.0 * (j as f64 + 1.0);
            s.insert_wall(line_wall(Point::new(0.0, y), Point::new(2000.0, y)));
        }
        let r = split_wall_crossings(&mut s);
        assert_eq!(r.crossings, v * h);
        let total_edges: usize = s.list_walls().iter().map(|w| w.edge_count()).sum();
        assert_eq!(total_edges, v * (h + 1) + h * (v + 1));
    }
}
