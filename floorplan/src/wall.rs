//! Wall centerline graph.
//!
//! Nodes live in a flat list and edges refer to them by index, so a wall never
//! holds references into itself. Node coordinates are stored relative to the
//! wall's anchor (the bounding-box center of its nodes); moving the wall only
//! moves the anchor.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::geometry::limits;
use crate::geometry::math::{bbox_center, dist, dist_sq};
use crate::model::{Point, Style, WallEdge, WallId, WallNode};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: WallId,
    pub(crate) anchor: Point,
    pub(crate) nodes: Vec<WallNode>,
    pub(crate) edges: Vec<WallEdge>,
    /// Edges form one cycle through every node.
    pub closed: bool,
    /// Spacing of the rendered double line; also the joint clearance used when trimming.
    pub gap: f64,
    pub style: Style,
    pub z: u32,
}

impl Wall {
    pub fn new(id: WallId, gap: f64) -> Self {
        Wall {
            id,
            anchor: Point::ORIGIN,
            nodes: Vec::new(),
            edges: Vec::new(),
            closed: false,
            gap,
            style: Style::default(),
            z: 0,
        }
    }

    /// Build a wall from a world-space polyline, deduplicating nodes within `merge_tol`.
    pub fn from_polyline(
        id: WallId,
        points: &[Point],
        closed: bool,
        gap: f64,
        thickness: f64,
        merge_tol: f64,
    ) -> Self {
        let mut w = Wall::new(id, gap);
        let mut prev: Option<u32> = None;
        for &p in points {
            let n = w.add_node(p, merge_tol);
            if let Some(pn) = prev {
                w.add_edge(pn, n, thickness);
            }
            prev = Some(n);
        }
        w.closed = closed;
        w.recenter();
        w
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }
    pub fn nodes(&self) -> &[WallNode] {
        &self.nodes
    }
    pub fn edges(&self) -> &[WallEdge] {
        &self.edges
    }
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn world(&self, n: u32) -> Option<Point> {
        self.nodes.get(n as usize).map(|nd| self.anchor + nd.pos())
    }

    pub fn world_nodes(&self) -> Vec<Point> {
        self.nodes.iter().map(|nd| self.anchor + nd.pos()).collect()
    }

    pub fn edge_segment(&self, e: usize) -> Option<(Point, Point)> {
        let edge = self.edges.get(e)?;
        Some((self.world(edge.a)?, self.world(edge.b)?))
    }

    /// World-space segments in edge order.
    pub fn segments(&self) -> Vec<(Point, Point)> {
        (0..self.edges.len()).filter_map(|e| self.edge_segment(e)).collect()
    }

    // Nodes

    /// Add a node at world position `p`, reusing an existing node within `tol`.
    pub fn add_node(&mut self, p: Point, tol: f64) -> u32 {
        let tol2 = tol * tol;
        let mut best: Option<(u32, f64)> = None;
        for (i, nd) in self.nodes.iter().enumerate() {
            let d2 = dist_sq(self.anchor + nd.pos(), p);
            if d2 <= tol2 && best.map_or(true, |(_, bd)| d2 < bd) {
                best = Some((i as u32, d2));
            }
        }
        match best {
            Some((i, _)) => i,
            None => self.add_node_exact(p),
        }
    }

    /// Add a node without deduplication.
    pub fn add_node_exact(&mut self, p: Point) -> u32 {
        let rel = p - self.anchor;
        self.nodes.push(WallNode { x: rel.x, y: rel.y });
        (self.nodes.len() - 1) as u32
    }

    pub fn degree(&self, n: u32) -> usize {
        self.edges.iter().filter(|e| e.a == n || e.b == n).count()
    }

    // Edges

    /// No-op (returns false) for self-loops, unknown nodes and existing edges.
    pub fn add_edge(&mut self, a: u32, b: u32, thickness: f64) -> bool {
        if a == b || a as usize >= self.nodes.len() || b as usize >= self.nodes.len() {
            return false;
        }
        if self.find_edge(a, b).is_some() {
            return false;
        }
        self.edges.push(WallEdge { a, b, thickness, joint: false });
        true
    }

    /// Flag the edge `a`-`b` as a joint stretch. False when there is no such edge.
    pub fn mark_joint(&mut self, a: u32, b: u32) -> bool {
        match self.find_edge(a, b) {
            Some(e) => {
                self.edges[e].joint = true;
                true
            }
            None => false,
        }
    }

    pub fn find_edge(&self, a: u32, b: u32) -> Option<usize> {
        self.edges.iter().position(|e| e.joins(a, b))
    }

    pub fn remove_edge(&mut self, e: usize) -> Option<WallEdge> {
        if e < self.edges.len() {
            Some(self.edges.remove(e))
        } else {
            None
        }
    }

    /// Replace edge `e` by a chain through `points` (world space, ordered from `a` to `b`).
    /// The chain keeps the edge's position in the edge list. Returns the inserted node ids.
    pub fn split_edge(&mut self, e: usize, points: &[Point]) -> Vec<u32> {
        let Some(edge) = self.edges.get(e).copied() else { return Vec::new() };
        if points.is_empty() {
            return Vec::new();
        }
        let ids: Vec<u32> = points.iter().map(|&p| self.add_node_exact(p)).collect();
        let mut chain = Vec::with_capacity(ids.len() + 1);
        let mut prev = edge.a;
        for &n in ids.iter().chain(std::iter::once(&edge.b)) {
            chain.push(WallEdge { a: prev, b: n, ..edge });
            prev = n;
        }
        self.edges.splice(e..=e, chain);
        ids
    }

    /// Cut edge `e` at world point `p`: two distinct nodes are placed at `p`, one
    /// ending each half, so the halves no longer touch. Returns `(a-side, b-side)` nodes.
    pub fn cut_edge(&mut self, e: usize, p: Point) -> Option<(u32, u32)> {
        let edge = self.edges.get(e).copied()?;
        let n1 = self.add_node_exact(p);
        let n2 = self.add_node_exact(p);
        let halves = [
            WallEdge { b: n1, ..edge },
            WallEdge { a: n2, ..edge },
        ];
        self.edges.splice(e..=e, halves);
        self.closed = false;
        Some((n1, n2))
    }

    /// Neighbor lists `(node, edge index)`, sorted for deterministic traversal.
    pub fn adjacency(&self) -> Vec<Vec<(u32, usize)>> {
        let mut adj = vec![Vec::new(); self.nodes.len()];
        for (i, e) in self.edges.iter().enumerate() {
            adj[e.a as usize].push((e.b, i));
            adj[e.b as usize].push((e.a, i));
        }
        for list in &mut adj {
            list.sort_unstable();
        }
        adj
    }

    // Connectivity

    /// Breadth-first reachability over edges.
    pub fn nodes_reachable_from(&self, start: u32) -> HashSet<u32> {
        let mut seen = HashSet::new();
        if start as usize >= self.nodes.len() {
            return seen;
        }
        let adj = self.adjacency();
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(n) = queue.pop_front() {
            for &(m, _) in &adj[n as usize] {
                if seen.insert(m) {
                    queue.push_back(m);
                }
            }
        }
        seen
    }

    pub fn is_connected(&self) -> bool {
        self.nodes.is_empty() || self.nodes_reachable_from(0).len() == self.nodes.len()
    }

    pub fn is_single_cycle(&self) -> bool {
        let n = self.nodes.len();
        n >= 3
            && self.edges.len() == n
            && (0..n as u32).all(|i| self.degree(i) == 2)
            && self.is_connected()
    }

    // Cleanup

    /// Fold each of `candidates` into another node lying within `tol`.
    /// Only the candidates move; coincident pairs elsewhere are left alone.
    pub fn merge_coincident_nodes(&mut self, candidates: &[u32], tol: f64) -> usize {
        let tol2 = tol * tol;
        let mut remap: Vec<u32> = (0..self.nodes.len() as u32).collect();
        let mut merged = 0;
        for &c in candidates {
            if c as usize >= self.nodes.len() || remap[c as usize] != c {
                continue;
            }
            let pc = self.nodes[c as usize].pos();
            let target = (0..self.nodes.len() as u32).find(|&o| {
                o != c && remap[o as usize] == o && dist_sq(self.nodes[o as usize].pos(), pc) <= tol2
            });
            if let Some(t) = target {
                remap[c as usize] = t;
                merged += 1;
            }
        }
        if merged > 0 {
            self.remap_edges(&remap);
            self.compact();
        }
        merged
    }

    /// Collapse edges shorter than `min_len` onto their first endpoint.
    pub fn prune_short_edges(&mut self, min_len: f64) -> usize {
        let mut pruned = 0;
        while let Some(i) = self.edges.iter().position(|e| {
            let a = self.nodes[e.a as usize].pos();
            let b = self.nodes[e.b as usize].pos();
            dist(a, b) < min_len
        }) {
            let e = self.edges[i];
            let mut remap: Vec<u32> = (0..self.nodes.len() as u32).collect();
            remap[e.b as usize] = e.a;
            self.remap_edges(&remap);
            pruned += 1;
        }
        if pruned > 0 {
            self.compact();
        }
        pruned
    }

    fn remap_edges(&mut self, remap: &[u32]) {
        let old = std::mem::take(&mut self.edges);
        for mut e in old {
            e.a = remap[e.a as usize];
            e.b = remap[e.b as usize];
            if e.a != e.b && self.find_edge(e.a, e.b).is_none() {
                self.edges.push(e);
            }
        }
    }

    /// Drop nodes no edge refers to, renumbering the rest in order.
    pub fn compact(&mut self) {
        let mut used = vec![false; self.nodes.len()];
        for e in &self.edges {
            used[e.a as usize] = true;
            used[e.b as usize] = true;
        }
        if used.iter().all(|u| *u) {
            return;
        }
        let mut remap = vec![u32::MAX; self.nodes.len()];
        let mut kept = Vec::with_capacity(self.nodes.len());
        for (i, nd) in self.nodes.iter().enumerate() {
            if used[i] {
                remap[i] = kept.len() as u32;
                kept.push(*nd);
            }
        }
        self.nodes = kept;
        for e in &mut self.edges {
            e.a = remap[e.a as usize];
            e.b = remap[e.b as usize];
        }
    }

    /// Move the anchor to the bounding-box center and re-express nodes relative to it.
    pub fn recenter(&mut self) {
        let world = self.world_nodes();
        let Some(center) = bbox_center(world.iter().copied()) else { return };
        for (nd, w) in self.nodes.iter_mut().zip(world) {
            let rel = w - center;
            nd.x = rel.x;
            nd.y = rel.y;
        }
        self.anchor = center;
    }

    /// Prune degenerate edges and refresh the anchor; run after every structural edit.
    pub fn finalize(&mut self, min_len: f64) {
        self.prune_short_edges(min_len);
        self.compact();
        self.recenter();
        if self.closed && !self.is_single_cycle() {
            self.closed = false;
        }
    }

    // Transforms

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.anchor = self.anchor + Point::new(dx, dy);
    }

    pub fn scale_about(&mut self, origin: Point, sx: f64, sy: f64) {
        let a = self.anchor - origin;
        self.anchor = Point::new(origin.x + a.x * sx, origin.y + a.y * sy);
        for nd in &mut self.nodes {
            nd.x *= sx;
            nd.y *= sy;
        }
    }

    // Structure

    /// Fold another wall's graph into this one, deduplicating nodes within `tol`.
    pub fn absorb(&mut self, other: &Wall, tol: f64) {
        let ids: Vec<u32> = other
            .world_nodes()
            .into_iter()
            .map(|p| self.add_node(p, tol))
            .collect();
        for e in &other.edges {
            let (a, b) = (ids[e.a as usize], ids[e.b as usize]);
            if self.add_edge(a, b, e.thickness) && e.joint {
                self.mark_joint(a, b);
            }
        }
    }

    /// Copy of this wall restricted to `keep`, with edges between kept nodes only.
    pub fn subset(&self, keep: &HashSet<u32>) -> Wall {
        let mut out = Wall { nodes: Vec::new(), edges: Vec::new(), closed: false, ..self.clone() };
        let mut remap = vec![u32::MAX; self.nodes.len()];
        for (i, nd) in self.nodes.iter().enumerate() {
            if keep.contains(&(i as u32)) {
                remap[i] = out.nodes.len() as u32;
                out.nodes.push(*nd);
            }
        }
        for e in &self.edges {
            let (a, b) = (remap[e.a as usize], remap[e.b as usize]);
            if a != u32::MAX && b != u32::MAX {
                out.edges.push(WallEdge { a, b, ..*e });
            }
        }
        out.recenter();
        out
    }

    /// Check the structural invariants: finite coordinates, valid distinct endpoints, no duplicates.
    pub fn validate(&self) -> Result<(), SceneError> {
        if !limits::in_coord_bounds(self.anchor.x) || !limits::in_coord_bounds(self.anchor.y) {
            return Err(SceneError::OutOfBounds("wall anchor".into()));
        }
        if !limits::in_gap_bounds(self.gap) {
            return Err(SceneError::OutOfBounds("wall gap".into()));
        }
        if self.nodes.len() > limits::MAX_NODES_PER_WALL {
            return Err(SceneError::CapsExceeded(format!("nodes>{}", limits::MAX_NODES_PER_WALL)));
        }
        if self.edges.len() > limits::MAX_EDGES_PER_WALL {
            return Err(SceneError::CapsExceeded(format!("edges>{}", limits::MAX_EDGES_PER_WALL)));
        }
        for nd in &self.nodes {
            if !limits::in_coord_bounds(nd.x) || !limits::in_coord_bounds(nd.y) {
                return Err(SceneError::OutOfBounds("wall node".into()));
            }
        }
        let n = self.nodes.len() as u32;
        for (i, e) in self.edges.iter().enumerate() {
            if e.a >= n || e.b >= n {
                return Err(SceneError::InvalidStructure(format!("edge {} endpoint out of range", i)));
            }
            if e.a == e.b {
                return Err(SceneError::InvalidStructure(format!("edge {} endpoints equal", i)));
            }
            if !e.thickness.is_finite() || e.thickness < 0.0 {
                return Err(SceneError::OutOfBounds("edge thickness".into()));
            }
            if self.edges[..i].iter().any(|o| o.joins(e.a, e.b)) {
                return Err(SceneError::InvalidStructure(format!("edge {} duplicated", i)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tolerance::{MERGE_TOL, MIN_EDGE_LEN};

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square() -> Wall {
        let pts = [p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0), p(0.0, 100.0), p(0.0, 0.0)];
        Wall::from_polyline(1, &pts, true, 10.0, 10.0, MERGE_TOL)
    }

    #[test]
    fn add_node_dedups_within_tolerance() {
        let mut w = Wall::new(0, 10.0);
        let a = w.add_node(p(0.0, 0.0), MERGE_TOL);
        let b = w.add_node(p(0.4, 0.2), MERGE_TOL);
        let c = w.add_node(p(0.6, 0.0), MERGE_TOL);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(w.node_count(), 2);
    }

    #[test]
    fn add_edge_rejects_loops_and_duplicates() {
        let mut w = Wall::new(0, 10.0);
        let a = w.add_node_exact(p(0.0, 0.0));
        let b = w.add_node_exact(p(10.0, 0.0));
        assert!(!w.add_edge(a, a, 1.0));
        assert!(w.add_edge(a, b, 1.0));
        assert!(!w.add_edge(b, a, 1.0));
        assert!(!w.add_edge(a, 7, 1.0));
        assert_eq!(w.edge_count(), 1);
    }

    #[test]
    fn closed_polyline_forms_single_cycle() {
        let w = square();
        assert_eq!(w.node_count(), 4);
        assert_eq!(w.edge_count(), 4);
        assert!(w.is_single_cycle());
        assert_eq!(w.anchor(), p(50.0, 50.0));
        assert_eq!(w.world(0), Some(p(0.0, 0.0)));
    }

    #[test]
    fn reachability_after_edge_removal() {
        let pts = [p(0.0, 0.0), p(10.0, 0.0), p(20.0, 0.0), p(30.0, 0.0)];
        let mut w = Wall::from_polyline(0, &pts, false, 10.0, 10.0, MERGE_TOL);
        assert_eq!(w.nodes_reachable_from(0).len(), 4);
        w.remove_edge(1);
        let r = w.nodes_reachable_from(0);
        assert_eq!(r.len(), 2);
        assert!(r.contains(&1) && !r.contains(&2));
    }

    #[test]
    fn split_edge_keeps_position_and_thickness() {
        let mut w = square();
        let ids = w.split_edge(0, &[p(25.0, 0.0), p(75.0, 0.0)]);
        assert_eq!(ids.len(), 2);
        assert_eq!(w.edge_count(), 6);
        assert_eq!(w.edges()[0].b, ids[0]);
        assert_eq!(w.edges()[2].a, ids[1]);
        assert!(w.edges().iter().all(|e| e.thickness == 10.0));
        assert!(w.is_single_cycle());
    }

    #[test]
    fn prune_collapses_short_edges() {
        let pts = [p(0.0, 0.0), p(50.0, 0.0), p(50.3, 0.0), p(100.0, 0.0)];
        let mut w = Wall::from_polyline(0, &pts, false, 10.0, 10.0, 0.1);
        assert_eq!(w.edge_count(), 3);
        assert_eq!(w.prune_short_edges(MIN_EDGE_LEN), 1);
        assert_eq!(w.edge_count(), 2);
        assert_eq!(w.node_count(), 3);
        assert!(w.is_connected());
        assert!(w.validate().is_ok());
    }

    #[test]
    fn merge_only_touches_candidates() {
        let mut w = Wall::new(0, 10.0);
        let a = w.add_node_exact(p(0.0, 0.0));
        let b = w.add_node_exact(p(10.0, 0.0));
        let gap1 = w.add_node_exact(p(10.0, 0.0));
        let c = w.add_node_exact(p(20.0, 0.0));
        w.add_edge(a, b, 1.0);
        w.add_edge(gap1, c, 1.0);
        assert_eq!(w.merge_coincident_nodes(&[], 1e-6), 0);
        assert_eq!(w.node_count(), 4);
        assert_eq!(w.merge_coincident_nodes(&[gap1], 1e-6), 1);
        assert_eq!(w.node_count(), 3);
        assert!(w.is_connected());
    }

    #[test]
    fn translate_and_scale_move_world_positions() {
        let mut w = square();
        w.translate(10.0, -5.0);
        assert_eq!(w.world(0), Some(p(10.0, -5.0)));
        w.scale_about(p(10.0, -5.0), 2.0, 2.0);
        assert_eq!(w.world(2), Some(p(210.0, 195.0)));
    }

    #[test]
    fn subset_recenters_and_opens() {
        let w = square();
        let keep: HashSet<u32> = [0, 1].into_iter().collect();
        let s = w.subset(&keep);
        assert_eq!(s.node_count(), 2);
        assert_eq!(s.edge_count(), 1);
        assert!(!s.closed);
        assert_eq!(s.anchor(), p(50.0, 0.0));
    }

    #[test]
    fn validate_catches_bad_indices() {
        let mut w = square();
        w.edges.push(WallEdge { a: 0, b: 9, thickness: 1.0, joint: false });
        assert!(matches!(w.validate(), Err(SceneError::InvalidStructure(_))));
    }
}
