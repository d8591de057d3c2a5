pub mod config;
pub mod draft;
pub mod editor;
pub mod error;
pub mod history;
pub mod model;
pub mod wall;
pub mod geometry {
    pub mod intersect;
    pub mod limits;
    pub mod math;
    pub mod shape;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod commit;
    pub mod offset;
    pub mod picking;
    pub mod planarize;
    pub mod slice;
}
mod json;

pub use algorithms::commit::{CommitReport, Joint, JointKind};
pub use algorithms::offset::{build_offset_geometry, OffsetGeometry};
pub use algorithms::slice::SliceReport;
pub use config::EditorConfig;
pub use draft::WallDraft;
pub use editor::{Command, Editor, Outcome};
pub use error::SceneError;
pub use history::History;
pub use model::{Color, CuttingLine, Point, Shape, ShapeId, ShapeKind, Style, WallEdge, WallId, WallNode};
pub use wall::Wall;

use geometry::limits;
use serde::{Deserialize, Serialize};

/// The authoritative collection of walls and shapes.
///
/// Walls and shapes live in arenas whose slot index is the entity id; a removed
/// entity leaves an empty slot so its id is never reused. Every mutating entry
/// point leaves the scene fully finalized (anchors, pruned edges) before it returns.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub(crate) walls: Vec<Option<Wall>>,   // id is index
    pub(crate) shapes: Vec<Option<Shape>>, // id is index
    pub(crate) next_z: u32,
    pub(crate) version: u64,
    pub(crate) config: EditorConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Pick {
    Wall { id: WallId, edge: u32, t: f64, dist: f64 },
    Shape { id: ShapeId, dist: f64 },
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Scene { config, ..Scene::default() }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
    }

    /// Monotonic counter; increments on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn bump(&mut self) {
        self.version += 1;
    }

    /// Mint the next paint/selection priority.
    pub fn next_z(&mut self) -> u32 {
        let z = self.next_z;
        self.next_z += 1;
        z
    }

    // Read accessors

    pub fn list_walls(&self) -> Vec<&Wall> {
        self.walls.iter().flatten().collect()
    }

    pub fn list_shapes(&self) -> Vec<&Shape> {
        self.shapes.iter().flatten().collect()
    }

    pub fn wall(&self, id: WallId) -> Option<&Wall> {
        self.walls.get(id as usize).and_then(|w| w.as_ref())
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id as usize).and_then(|s| s.as_ref())
    }

    pub fn wall_ids(&self) -> Vec<WallId> {
        self.list_walls().iter().map(|w| w.id).collect()
    }

    pub fn shape_ids(&self) -> Vec<ShapeId> {
        self.list_shapes().iter().map(|s| s.id).collect()
    }

    pub fn wall_count(&self) -> usize {
        self.walls.iter().filter(|w| w.is_some()).count()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.iter().filter(|s| s.is_some()).count()
    }

    // Walls

    pub fn add_wall(&mut self, mut wall: Wall) -> Result<WallId, SceneError> {
        wall.validate()?;
        if self.walls.len() >= limits::MAX_WALLS {
            return Err(SceneError::CapsExceeded(format!("walls>{}", limits::MAX_WALLS)));
        }
        wall.finalize(self.config.min_edge_length);
        wall.z = self.next_z();
        let id = self.insert_wall(wall);
        self.bump();
        Ok(id)
    }

    pub fn update_wall(&mut self, mut wall: Wall) -> Result<(), SceneError> {
        if self.wall(wall.id).is_none() {
            return Err(SceneError::wall(wall.id));
        }
        wall.validate()?;
        wall.finalize(self.config.min_edge_length);
        self.next_z = self.next_z.max(wall.z.saturating_add(1));
        self.put_wall(wall);
        self.bump();
        Ok(())
    }

    pub fn remove_wall(&mut self, id: WallId) -> Result<Wall, SceneError> {
        let wall = self.take_wall(id).ok_or(SceneError::wall(id))?;
        self.bump();
        Ok(wall)
    }

    pub fn move_wall(&mut self, id: WallId, dx: f64, dy: f64) -> Result<(), SceneError> {
        if !dx.is_finite() { return Err(SceneError::NonFinite("dx")); }
        if !dy.is_finite() { return Err(SceneError::NonFinite("dy")); }
        let wall = self.wall_mut(id).ok_or(SceneError::wall(id))?;
        wall.translate(dx, dy);
        self.bump();
        Ok(())
    }

    pub fn scale_wall(&mut self, id: WallId, origin: Point, sx: f64, sy: f64) -> Result<(), SceneError> {
        if !origin.is_finite() { return Err(SceneError::NonFinite("origin")); }
        if !sx.is_finite() { return Err(SceneError::NonFinite("sx")); }
        if !sy.is_finite() { return Err(SceneError::NonFinite("sy")); }
        let min_len = self.config.min_edge_length;
        let wall = self.wall_mut(id).ok_or(SceneError::wall(id))?;
        wall.scale_about(origin, sx, sy);
        wall.finalize(min_len);
        self.bump();
        Ok(())
    }

    // Shapes

    pub fn add_shape(&mut self, mut shape: Shape) -> Result<ShapeId, SceneError> {
        validate_shape(&shape)?;
        if self.shapes.len() >= limits::MAX_SHAPES {
            return Err(SceneError::CapsExceeded(format!("shapes>{}", limits::MAX_SHAPES)));
        }
        shape.z = self.next_z();
        let id = self.insert_shape(shape);
        self.bump();
        Ok(id)
    }

    pub fn update_shape(&mut self, shape: Shape) -> Result<(), SceneError> {
        if self.shape(shape.id).is_none() {
            return Err(SceneError::shape(shape.id));
        }
        validate_shape(&shape)?;
        self.next_z = self.next_z.max(shape.z.saturating_add(1));
        let id = shape.id as usize;
        self.shapes[id] = Some(shape);
        self.bump();
        Ok(())
    }

    pub fn remove_shape(&mut self, id: ShapeId) -> Result<Shape, SceneError> {
        let shape = self.take_shape(id).ok_or(SceneError::shape(id))?;
        self.bump();
        Ok(shape)
    }

    pub fn move_shape(&mut self, id: ShapeId, dx: f64, dy: f64) -> Result<(), SceneError> {
        if !dx.is_finite() { return Err(SceneError::NonFinite("dx")); }
        if !dy.is_finite() { return Err(SceneError::NonFinite("dy")); }
        let shape = self
            .shapes
            .get_mut(id as usize)
            .and_then(|s| s.as_mut())
            .ok_or(SceneError::shape(id))?;
        shape.anchor = shape.anchor + Point::new(dx, dy);
        self.bump();
        Ok(())
    }

    // Operations

    /// Finalize a world-space polyline into the scene (merge-or-create plus crossing splits).
    pub fn commit_polyline(&mut self, points: &[Point]) -> Option<CommitReport> {
        algorithms::commit::commit_segments(self, points)
    }

    pub fn slice_at(&mut self, line: CuttingLine) -> SliceReport {
        algorithms::slice::slice_scene(self, &line)
    }

    pub fn build_offset_geometry(&self, id: WallId) -> Option<OffsetGeometry> {
        self.wall(id).map(build_offset_geometry)
    }

    pub fn pick(&self, p: Point, tol: f64) -> Option<Pick> {
        algorithms::picking::pick_impl(self, p, tol)
    }

    // JSON
    pub fn to_json_value(&self) -> serde_json::Value {
        json::to_json_impl(self)
    }
    pub fn from_json_value(&mut self, v: serde_json::Value) -> bool {
        json::from_json_impl(self, v)
    }
    pub fn from_json_value_strict(&mut self, v: serde_json::Value) -> Result<(), SceneError> {
        json::from_json_impl_strict(self, v)
    }

    pub fn clear(&mut self) {
        self.walls.clear();
        self.shapes.clear();
        self.next_z = 0;
        self.bump();
    }

    /// Same walls and shapes, ignoring the version counter.
    pub fn content_eq(&self, other: &Scene) -> bool {
        self.walls == other.walls && self.shapes == other.shapes && self.next_z == other.next_z
    }

    /// Replace the content with a snapshot while keeping the version monotonic.
    /// The live config stays; snapshots only carry content.
    pub fn restore(&mut self, snapshot: Scene) {
        let version = self.version.max(snapshot.version) + 1;
        let config = std::mem::take(&mut self.config);
        *self = Scene { version, config, ..snapshot };
    }

    // Arena plumbing for the algorithms

    pub(crate) fn wall_mut(&mut self, id: WallId) -> Option<&mut Wall> {
        self.walls.get_mut(id as usize).and_then(|w| w.as_mut())
    }

    pub(crate) fn insert_wall(&mut self, mut wall: Wall) -> WallId {
        let id = self.walls.len() as WallId;
        wall.id = id;
        self.walls.push(Some(wall));
        id
    }

    pub(crate) fn put_wall(&mut self, wall: Wall) {
        let id = wall.id as usize;
        if id < self.walls.len() {
            self.walls[id] = Some(wall);
        }
    }

    pub(crate) fn take_wall(&mut self, id: WallId) -> Option<Wall> {
        self.walls.get_mut(id as usize).and_then(|w| w.take())
    }

    pub(crate) fn insert_shape(&mut self, mut shape: Shape) -> ShapeId {
        let id = self.shapes.len() as ShapeId;
        shape.id = id;
        self.shapes.push(Some(shape));
        id
    }

    pub(crate) fn take_shape(&mut self, id: ShapeId) -> Option<Shape> {
        self.shapes.get_mut(id as usize).and_then(|s| s.take())
    }
}

pub(crate) fn validate_shape(s: &Shape) -> Result<(), SceneError> {
    if !limits::in_coord_bounds(s.anchor.x) || !limits::in_coord_bounds(s.anchor.y) {
        return Err(SceneError::OutOfBounds("shape anchor".into()));
    }
    if !s.rotation.is_finite() {
        return Err(SceneError::NonFinite("rotation"));
    }
    for (name, v) in [("width", s.width), ("height", s.height)] {
        if !v.is_finite() {
            return Err(SceneError::NonFinite(name));
        }
        if v < 0.0 {
            return Err(SceneError::OutOfBounds(name.to_string()));
        }
    }
    if let Some(points) = s.kind.points() {
        if points.len() < 2 {
            return Err(SceneError::InvalidStructure(format!("{} needs at least two points", s.kind.tag())));
        }
        if points.len() > limits::MAX_POINTS_PER_SHAPE {
            return Err(SceneError::CapsExceeded(format!("points>{}", limits::MAX_POINTS_PER_SHAPE)));
        }
        if points.iter().any(|p| !limits::in_coord_bounds(p.x) || !limits::in_coord_bounds(p.y)) {
            return Err(SceneError::OutOfBounds("shape point".into()));
        }
    }
    Ok(())
}
