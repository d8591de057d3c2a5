use crate::geometry::limits;
use crate::model::{Point, Shape, Style, WallEdge, WallNode};
use crate::{validate_shape, Scene, SceneError, Wall};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DOC_VERSION: u32 = 1;

pub fn to_json_impl(s: &Scene) -> Value {
    #[derive(Serialize)]
    struct Doc<'a> {
        version: u32,
        next_z: u32,
        walls: Vec<&'a Wall>,
        shapes: Vec<&'a Shape>,
    }
    let doc = Doc {
        version: DOC_VERSION,
        next_z: s.next_z,
        walls: s.list_walls(),
        shapes: s.list_shapes(),
    };
    serde_json::to_value(doc).unwrap_or(Value::Null)
}

#[derive(Deserialize)]
struct WallDe {
    id: u32,
    #[serde(default)]
    anchor: Point,
    nodes: Vec<WallNode>,
    edges: Vec<WallEdge>,
    #[serde(default)]
    closed: bool,
    gap: Option<f64>,
    style: Option<Style>,
    #[serde(default)]
    z: u32,
}

#[derive(Deserialize)]
struct DocDe {
    version: Option<u32>,
    #[serde(default)]
    next_z: u32,
    #[serde(default)]
    walls: Vec<WallDe>,
    #[serde(default)]
    shapes: Vec<Shape>,
}

fn parse(v: Value) -> Result<DocDe, SceneError> {
    let doc: DocDe = serde_json::from_value(v)?;
    if let Some(ver) = doc.version {
        if ver > DOC_VERSION {
            return Err(SceneError::InvalidStructure(format!("unsupported document version {}", ver)));
        }
    }
    if doc.walls.len() > limits::MAX_WALLS {
        return Err(SceneError::CapsExceeded(format!("walls>{}", limits::MAX_WALLS)));
    }
    if doc.shapes.len() > limits::MAX_SHAPES {
        return Err(SceneError::CapsExceeded(format!("shapes>{}", limits::MAX_SHAPES)));
    }
    Ok(doc)
}

fn build_wall(w: WallDe, default_gap: f64) -> Wall {
    Wall {
        id: w.id,
        anchor: w.anchor,
        nodes: w.nodes,
        edges: w.edges,
        closed: w.closed,
        gap: w.gap.unwrap_or(default_gap),
        style: w.style.unwrap_or_default(),
        z: w.z,
    }
}

// Shared tail: place entities at their id slots and finalize.
fn install(s: &mut Scene, next_z: u32, walls: Vec<Wall>, shapes: Vec<Shape>) {
    let min_len = s.config.min_edge_length;
    let mut z = next_z;
    s.walls.clear();
    s.shapes.clear();
    for mut w in walls {
        w.finalize(min_len);
        z = z.max(w.z.saturating_add(1));
        let id = w.id as usize;
        if s.walls.len() <= id {
            s.walls.resize(id + 1, None);
        }
        s.walls[id] = Some(w);
    }
    for sh in shapes {
        z = z.max(sh.z.saturating_add(1));
        let id = sh.id as usize;
        if s.shapes.len() <= id {
            s.shapes.resize(id + 1, None);
        }
        s.shapes[id] = Some(sh);
    }
    s.next_z = z;
    s.bump();
}

/// Lenient import: invalid edges, walls and shapes are dropped; only an
/// unparseable document or exceeded caps fail the whole import.
pub fn from_json_impl(s: &mut Scene, v: Value) -> bool {
    let doc = match parse(v) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(error = %e, "scene import rejected");
            return false;
        }
    };
    let default_gap = s.config.default_gap;
    let mut seen_walls = std::collections::HashSet::new();
    let mut walls = Vec::new();
    for wd in doc.walls {
        if wd.id as usize >= limits::MAX_WALLS || !seen_walls.insert(wd.id) {
            continue;
        }
        let mut w = build_wall(wd, default_gap);
        let n = w.nodes.len() as u32;
        let mut kept: Vec<WallEdge> = Vec::with_capacity(w.edges.len());
        for e in w.edges.drain(..) {
            let valid = e.a < n && e.b < n && e.a != e.b && e.thickness.is_finite() && e.thickness >= 0.0;
            if valid && !kept.iter().any(|k| k.joins(e.a, e.b)) {
                kept.push(e);
            }
        }
        w.edges = kept;
        match w.validate() {
            Ok(()) => walls.push(w),
            Err(err) => tracing::warn!(wall = w.id, error = %err, "dropping invalid wall"),
        }
    }
    let mut seen_shapes = std::collections::HashSet::new();
    let mut shapes = Vec::new();
    for sh in doc.shapes {
        if sh.id as usize >= limits::MAX_SHAPES || !seen_shapes.insert(sh.id) {
            continue;
        }
        match validate_shape(&sh) {
            Ok(()) => shapes.push(sh),
            Err(err) => tracing::warn!(shape = sh.id, error = %err, "dropping invalid shape"),
        }
    }
    install(s, doc.next_z, walls, shapes);
    true
}

/// Strict import: the first invalid entity rejects the document and the scene is left untouched.
pub fn from_json_impl_strict(s: &mut Scene, v: Value) -> Result<(), SceneError> {
    let doc = parse(v)?;
    let default_gap = s.config.default_gap;
    let mut seen_walls = std::collections::HashSet::new();
    let mut walls = Vec::with_capacity(doc.walls.len());
    for wd in doc.walls {
        if wd.id as usize >= limits::MAX_WALLS {
            return Err(SceneError::CapsExceeded(format!("wall id>{}", limits::MAX_WALLS)));
        }
        if !seen_walls.insert(wd.id) {
            return Err(SceneError::InvalidStructure(format!("duplicate wall id {}", wd.id)));
        }
        let w = build_wall(wd, default_gap);
        w.validate()?;
        walls.push(w);
    }
    let mut seen_shapes = std::collections::HashSet::new();
    let mut shapes = Vec::with_capacity(doc.shapes.len());
    for sh in doc.shapes {
        if sh.id as usize >= limits::MAX_SHAPES {
            return Err(SceneError::CapsExceeded(format!("shape id>{}", limits::MAX_SHAPES)));
        }
        if !seen_shapes.insert(sh.id) {
            return Err(SceneError::InvalidStructure(format!("duplicate shape id {}", sh.id)));
        }
        validate_shape(&sh)?;
        shapes.push(sh);
    }
    install(s, doc.next_z, walls, shapes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tolerance::MERGE_TOL;
    use serde_json::json;

    fn sample() -> Scene {
        let mut s = Scene::new();
        let pts = [Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 50.0)];
        s.add_wall(Wall::from_polyline(0, &pts, false, 20.0, 20.0, MERGE_TOL)).unwrap();
        s.add_shape(Shape::rectangle(Point::new(5.0, 5.0), 10.0, 4.0)).unwrap();
        let removed = s.add_shape(Shape::ellipse(Point::ORIGIN, 3.0, 3.0)).unwrap();
        s.remove_shape(removed).unwrap();
        s
    }

    #[test]
    fn snapshot_restores_ids_and_z() {
        let s = sample();
        let v = to_json_impl(&s);
        let mut t = Scene::new();
        assert!(from_json_impl(&mut t, v.clone()));
        assert_eq!(t.shape_ids(), s.shape_ids());
        assert_eq!(t.wall(0), s.wall(0));
        assert_eq!(t.shape(0), s.shape(0));
        assert!(t.shape(1).is_none());
        assert_eq!(t.next_z, s.next_z);
        assert!(from_json_impl_strict(&mut Scene::new(), v).is_ok());
    }

    #[test]
    fn lenient_drops_bad_edges_strict_rejects() {
        let doc = json!({
            "walls": [{
                "id": 3,
                "nodes": [{ "x": 0.0, "y": 0.0 }, { "x": 10.0, "y": 0.0 }],
                "edges": [{ "a": 0, "b": 1, "thickness": 5.0 }, { "a": 0, "b": 9, "thickness": 5.0 }]
            }]
        });
        let mut s = Scene::new();
        assert!(from_json_impl(&mut s, doc.clone()));
        assert_eq!(s.wall(3).map(|w| w.edge_count()), Some(1));
        assert_eq!(s.wall(3).map(|w| w.gap), Some(s.config.default_gap));

        let mut t = Scene::new();
        let err = from_json_impl_strict(&mut t, doc).unwrap_err();
        assert_eq!(err.code(), "invalid_structure");
        assert_eq!(t.wall_count(), 0);
    }

    #[test]
    fn garbage_is_rejected() {
        let mut s = sample();
        let before = s.wall_count();
        assert!(!from_json_impl(&mut s, json!({ "walls": 7 })));
        assert_eq!(s.wall_count(), before);
        assert_eq!(
            from_json_impl_strict(&mut s, json!({ "version": 99 })).unwrap_err().code(),
            "invalid_structure"
        );
    }
}
