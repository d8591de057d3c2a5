use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

pub type WallId = u32;
pub type ShapeId = u32;

/// World-space or anchor-relative position, in millimeters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, o: Point) -> Point {
        Point { x: self.x + o.x, y: self.y + o.y }
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, o: Point) -> Point {
        Point { x: self.x - o.x, y: self.y - o.y }
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, k: f64) -> Point {
        Point { x: self.x * k, y: self.y * k }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            fill: None,
            stroke: Some(Color { r: 0, g: 0, b: 0, a: 255 }),
            stroke_width: 2.0,
        }
    }
}

/// Node of a wall centerline; coordinates are relative to the owning wall's anchor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallNode {
    pub x: f64,
    pub y: f64,
}

impl WallNode {
    pub fn pos(&self) -> Point {
        Point { x: self.x, y: self.y }
    }
}

/// Undirected edge between two node indices of the same wall.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallEdge {
    pub a: u32,
    pub b: u32,
    pub thickness: f64,
    /// Short stretch split off next to a joint node; painted as its own run.
    #[serde(default)]
    pub joint: bool,
}

impl WallEdge {
    pub fn joins(&self, i: u32, j: u32) -> bool {
        (self.a == i && self.b == j) || (self.a == j && self.b == i)
    }

    pub fn other(&self, n: u32) -> Option<u32> {
        if self.a == n {
            Some(self.b)
        } else if self.b == n {
            Some(self.a)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Line { points: Vec<Point> },
    Polygon { points: Vec<Point> },
    // Sampled pen strokes; no derivable boundary.
    Freehand { points: Vec<Point> },
}

impl ShapeKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line { .. } => "line",
            ShapeKind::Polygon { .. } => "polygon",
            ShapeKind::Freehand { .. } => "freehand",
        }
    }

    pub fn points(&self) -> Option<&[Point]> {
        match self {
            ShapeKind::Line { points }
            | ShapeKind::Polygon { points }
            | ShapeKind::Freehand { points } => Some(points),
            _ => None,
        }
    }
}

/// Vector shape. `anchor` is the shape center; point lists are relative to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub anchor: Point,
    /// Degrees, counter-clockwise about `anchor`.
    pub rotation: f64,
    pub width: f64,
    pub height: f64,
    pub style: Style,
    pub z: u32,
}

impl Shape {
    pub fn rectangle(center: Point, width: f64, height: f64) -> Self {
        Shape {
            id: 0,
            kind: ShapeKind::Rectangle,
            anchor: center,
            rotation: 0.0,
            width,
            height,
            style: Style::default(),
            z: 0,
        }
    }

    pub fn ellipse(center: Point, width: f64, height: f64) -> Self {
        Shape { kind: ShapeKind::Ellipse, ..Shape::rectangle(center, width, height) }
    }

    /// Polygon from world-space points, re-anchored to the bounding-box center.
    pub fn polygon(world: &[Point]) -> Self {
        let (anchor, width, height, points) = anchored_points(world);
        Shape {
            kind: ShapeKind::Polygon { points },
            ..Shape::rectangle(anchor, width, height)
        }
    }

    pub fn line(world: &[Point]) -> Self {
        let (anchor, width, height, points) = anchored_points(world);
        Shape {
            kind: ShapeKind::Line { points },
            ..Shape::rectangle(anchor, width, height)
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }
}

fn anchored_points(world: &[Point]) -> (Point, f64, f64, Vec<Point>) {
    match crate::geometry::math::bbox(world.iter().copied()) {
        Some((min, max)) => {
            let center = Point::new(0.5 * (min.x + max.x), 0.5 * (min.y + max.y));
            let rel = world.iter().map(|&p| p - center).collect();
            (center, max.x - min.x, max.y - min.y, rel)
        }
        None => (Point::ORIGIN, 0.0, 0.0, Vec::new()),
    }
}

/// Transient cutting gesture in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CuttingLine {
    pub start: Point,
    pub end: Point,
}

impl CuttingLine {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}
