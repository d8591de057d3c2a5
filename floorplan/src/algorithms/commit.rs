//! Segment commit: turns a finished draft polyline into scene walls.
//!
//! Steps: closure snap, connection detection at both draft ends, create or
//! merge (with joint trimming), the global crossing pass, then cleanup of
//! split duplicates and degenerate edges.

use serde::{Deserialize, Serialize};

use super::planarize::split_wall_crossings;
use crate::geometry::math::{dist, is_perpendicular, normalize};
use crate::geometry::tolerance::EPS_POS;
use crate::model::{Point, WallId};
use crate::{Scene, Wall};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointKind {
    /// Draft meets the existing edge within 5 degrees of square.
    Butt,
    Oblique,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub wall: WallId,
    pub at: Point,
    pub kind: JointKind,
    /// Both connecting segments were long enough to be trimmed by the gap.
    pub trimmed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommitReport {
    /// Wall that now holds the draft.
    pub wall: WallId,
    pub created: bool,
    /// Walls folded into `wall` because the draft bridged them.
    pub absorbed: Vec<WallId>,
    pub joints: Vec<Joint>,
    /// The draft closed onto its own start point.
    pub closed: bool,
    pub crossings: usize,
    /// Walls dropped because cleanup left them without edges.
    pub removed: Vec<WallId>,
}

#[derive(Clone, Copy, Debug)]
struct Connection {
    wall: WallId,
    node: u32,
    far: u32,
    point: Point,
    kind: JointKind,
}

/// Drop non-finite points and zero-length steps.
pub fn sanitize_polyline(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if !p.is_finite() {
            tracing::warn!(x = p.x, y = p.y, "dropping non-finite draft point");
            continue;
        }
        if out.last().map_or(false, |&q| dist(q, p) <= EPS_POS) {
            continue;
        }
        out.push(p);
    }
    out
}

/// Nearest edge endpoint of any wall within `snap` of `p`.
/// `toward` is the next draft point, giving the draft direction at this end.
fn find_connection(scene: &Scene, p: Point, toward: Point, snap: f64) -> Option<Connection> {
    let mut best: Option<(Connection, f64)> = None;
    for w in scene.list_walls() {
        for e in w.edges() {
            for (node, far) in [(e.a, e.b), (e.b, e.a)] {
                let (Some(at), Some(other)) = (w.world(node), w.world(far)) else { continue };
                let d = dist(at, p);
                if d > snap || best.as_ref().map_or(false, |(_, bd)| d >= *bd) {
                    continue;
                }
                let kind = if is_perpendicular(other - at, toward - p) {
                    JointKind::Butt
                } else {
                    JointKind::Oblique
                };
                best = Some((Connection { wall: w.id, node, far, point: at, kind }, d));
            }
        }
    }
    best.map(|(c, _)| c)
}

/// Split the existing edge `node`-`far` at `gap` from the joint end. The freed
/// stretch stays as a joint edge so the joint node itself is kept.
fn trim_existing(wall: &mut Wall, c: &Connection, min_len: f64) -> bool {
    let Some(e) = wall.find_edge(c.node, c.far) else { return false };
    let (Some(at), Some(far)) = (wall.world(c.node), wall.world(c.far)) else { return false };
    let len = dist(at, far);
    let gap = wall.gap;
    if gap <= 0.0 || len <= gap + min_len {
        return false;
    }
    let Some(dir) = normalize(far - at) else { return false };
    let ids = wall.split_edge(e, &[at + dir * gap]);
    ids.first().map_or(false, |&m| wall.mark_joint(c.node, m))
}

/// Same trim on the draft side: insert a point `gap` along the draft from its end.
fn trim_draft(pts: &mut Vec<Point>, at_start: bool, gap: f64, min_len: f64) -> bool {
    let n = pts.len();
    let (end, next) = if at_start { (0, 1) } else { (n - 1, n - 2) };
    let len = dist(pts[end], pts[next]);
    if gap <= 0.0 || len <= gap + min_len {
        return false;
    }
    let Some(dir) = normalize(pts[next] - pts[end]) else { return false };
    let t = pts[end] + dir * gap;
    if at_start { pts.insert(1, t) } else { pts.insert(n - 1, t) }
    true
}

pub fn commit_segments(scene: &mut Scene, raw: &[Point]) -> Option<CommitReport> {
    let cfg = scene.config.clone();
    let mut pts = sanitize_polyline(raw);
    if pts.len() < 2 {
        tracing::debug!(points = raw.len(), "draft too short to commit");
        return None;
    }

    // 1) Closure snap
    let n = pts.len();
    let mut closed = false;
    if n >= 4 && dist(pts[n - 1], pts[0]) <= cfg.closure_tolerance {
        pts[n - 1] = pts[0];
        closed = true;
    }

    // 2) Connection detection at each end
    let start = find_connection(scene, pts[0], pts[1], cfg.snap_threshold);
    let end = if closed {
        None
    } else {
        find_connection(scene, pts[n - 1], pts[n - 2], cfg.snap_threshold)
    };

    let mut joints = Vec::new();
    let mut absorbed = Vec::new();
    let mut created = false;

    let target = match (start, end) {
        // 3) Free-standing wall
        (None, None) => {
            let mut wall = Wall::from_polyline(
                0,
                &pts,
                closed,
                cfg.default_gap,
                cfg.default_thickness,
                cfg.merge_tolerance,
            );
            wall.z = scene.next_z();
            created = true;
            let id = scene.insert_wall(wall);
            tracing::debug!(wall = id, nodes = pts.len(), closed, "created wall");
            id
        }
        // 4) Merge into the connected wall(s)
        (s, e) => {
            let mut thickness = cfg.default_thickness;
            let (mut joint_start, mut joint_end) = (false, false);
            for (conn, at_start) in [(s, true), (e, false)] {
                let Some(c) = conn else { continue };
                let Some(wall) = scene.wall_mut(c.wall) else { continue };
                if let Some(edge) = wall.find_edge(c.node, c.far).and_then(|i| wall.edges().get(i)) {
                    thickness = edge.thickness;
                }
                let gap = wall.gap;
                let trimmed_existing = trim_existing(wall, &c, cfg.min_edge_length);
                let trimmed_draft = if at_start {
                    pts[0] = c.point;
                    joint_start = trim_draft(&mut pts, true, gap, cfg.min_edge_length);
                    if closed {
                        // the loop leaves and re-enters through the same joint
                        let last = pts.len() - 1;
                        pts[last] = c.point;
                        joint_end = trim_draft(&mut pts, false, gap, cfg.min_edge_length);
                    }
                    joint_start && (!closed || joint_end)
                } else {
                    let last = pts.len() - 1;
                    pts[last] = c.point;
                    joint_end = trim_draft(&mut pts, false, gap, cfg.min_edge_length);
                    joint_end
                };
                tracing::debug!(wall = c.wall, kind = ?c.kind, trimmed_existing, trimmed_draft, "draft joint");
                joints.push(Joint {
                    wall: c.wall,
                    at: c.point,
                    kind: c.kind,
                    trimmed: trimmed_existing && trimmed_draft,
                });
            }
            let target_id = s.or(e).map(|c| c.wall)?;
            if let (Some(sc), Some(ec)) = (s, e) {
                if sc.wall != ec.wall {
                    if let Some(other) = scene.take_wall(ec.wall) {
                        if let Some(target) = scene.wall_mut(target_id) {
                            target.absorb(&other, cfg.merge_tolerance);
                        }
                        absorbed.push(other.id);
                        tracing::debug!(into = target_id, absorbed = other.id, "draft bridged two walls");
                    }
                }
            }
            let target = scene.wall_mut(target_id)?;
            let mut ids = Vec::with_capacity(pts.len());
            for &p in &pts {
                let node = target.add_node(p, cfg.merge_tolerance);
                if let Some(&pn) = ids.last() {
                    target.add_edge(pn, node, thickness);
                }
                ids.push(node);
            }
            let k = ids.len();
            if joint_start {
                target.mark_joint(ids[0], ids[1]);
            }
            if joint_end {
                target.mark_joint(ids[k - 2], ids[k - 1]);
            }
            target.recenter();
            target.closed = target.is_single_cycle();
            target_id
        }
    };

    // 5) Global crossing pass
    let split = split_wall_crossings(scene);

    // 6) Cleanup of touched walls
    let mut touched: Vec<WallId> = split.inserted.keys().copied().collect();
    if !touched.contains(&target) {
        touched.push(target);
    }
    let mut removed = Vec::new();
    for wid in touched {
        let Some(wall) = scene.wall_mut(wid) else { continue };
        if let Some(new_nodes) = split.inserted.get(&wid) {
            wall.merge_coincident_nodes(new_nodes, EPS_POS);
        }
        wall.finalize(cfg.min_edge_length);
        if wall.edge_count() == 0 {
            scene.take_wall(wid);
            removed.push(wid);
        }
    }
    scene.bump();

    Some(CommitReport {
        wall: target,
        created,
        absorbed,
        joints,
        closed,
        crossings: split.crossings,
        removed,
    })
}
