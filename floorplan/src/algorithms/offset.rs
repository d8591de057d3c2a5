//! Paintable double-line boundaries of a wall centerline.
//!
//! The edge graph is decomposed into runs: maximal chains through degree-2
//! nodes, started from the lowest-numbered end or junction node, then the
//! remaining pure cycles from their lowest node. A node where a joint stretch
//! meets a regular edge also ends a run, so trimmed joints paint separately. Each segment of a run is
//! offset by half the gap on either side and the offset endpoints are joined
//! in order. Traversal only depends on node and edge order, so the same wall
//! always produces the same points.

use serde::{Deserialize, Serialize};

use crate::geometry::math::{dist, normalize, perp};
use crate::geometry::tolerance::EPS_POS;
use crate::model::Point;
use crate::Wall;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetGeometry {
    /// Left side of the walking direction, all runs concatenated.
    pub outer: Vec<Point>,
    pub inner: Vec<Point>,
    /// Start index of each run; a run spans the same index range in `outer` and `inner`.
    pub runs: Vec<u32>,
    /// The source wall is a single closed cycle painted as one run; both lists end on their first point.
    pub closed: bool,
}

impl OffsetGeometry {
    /// Index ranges of the runs.
    pub fn run_ranges(&self) -> Vec<std::ops::Range<usize>> {
        let mut out = Vec::with_capacity(self.runs.len());
        for (k, &s) in self.runs.iter().enumerate() {
            let e = self.runs.get(k + 1).map_or(self.outer.len(), |&n| n as usize);
            out.push(s as usize..e);
        }
        out
    }
}

/// Deterministic chain decomposition of the wall's edges, as node sequences.
/// A run whose first and last node agree is a cycle.
pub fn centerline_runs(wall: &Wall) -> Vec<Vec<u32>> {
    let adj = wall.adjacency();
    let mut used = vec![false; wall.edge_count()];
    let mut runs = Vec::new();
    let edges = wall.edges();
    let ends_run = |n: usize| match adj[n].as_slice() {
        [(_, e1), (_, e2)] => edges[*e1].joint != edges[*e2].joint,
        _ => true,
    };

    let walk = |start: u32, first: (u32, usize), used: &mut Vec<bool>| -> Vec<u32> {
        let mut chain = vec![start];
        let (mut cur, mut edge) = first;
        loop {
            used[edge] = true;
            chain.push(cur);
            if ends_run(cur as usize) {
                break;
            }
            match adj[cur as usize].iter().find(|&&(_, e)| !used[e]) {
                Some(&next) => {
                    edge = next.1;
                    cur = next.0;
                }
                None => break,
            }
        }
        chain
    };

    // Open chains from ends and junctions
    for n in 0..adj.len() {
        if !ends_run(n) {
            continue;
        }
        for &(m, e) in &adj[n] {
            if !used[e] {
                runs.push(walk(n as u32, (m, e), &mut used));
            }
        }
    }
    // Whatever is left lies on cycles of degree-2 nodes
    for n in 0..adj.len() {
        if let Some(&(m, e)) = adj[n].iter().find(|&&(_, e)| !used[e]) {
            runs.push(walk(n as u32, (m, e), &mut used));
        }
    }
    runs
}

fn push_dedup(out: &mut Vec<Point>, p: Point) {
    if out.last().map_or(true, |&q| dist(q, p) > EPS_POS) {
        out.push(p);
    }
}

pub fn build_offset_geometry(wall: &Wall) -> OffsetGeometry {
    let half = 0.5 * wall.gap;
    let runs = centerline_runs(wall);
    let mut geo = OffsetGeometry { closed: wall.closed && runs.len() == 1, ..OffsetGeometry::default() };
    for run in runs {
        let start = geo.outer.len();
        let mut outer = Vec::new();
        let mut inner = Vec::new();
        for pair in run.windows(2) {
            let (Some(a), Some(b)) = (wall.world(pair[0]), wall.world(pair[1])) else { continue };
            let Some(dir) = normalize(b - a) else { continue };
            let n = perp(dir) * half;
            push_dedup(&mut outer, a + n);
            push_dedup(&mut outer, b + n);
            push_dedup(&mut inner, a - n);
            push_dedup(&mut inner, b - n);
        }
        // Rounding can make the two sides disagree on a dedup; keep them aligned.
        let k = outer.len().min(inner.len());
        outer.truncate(k);
        inner.truncate(k);
        if k < 2 {
            continue;
        }
        if run.first() == run.last() {
            outer.push(outer[0]);
            inner.push(inner[0]);
        }
        geo.runs.push(start as u32);
        geo.outer.extend(outer);
        geo.inner.extend(inner);
    }
    geo
}
