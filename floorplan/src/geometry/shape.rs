//! World-space boundaries of vector shapes.

use super::math::rotate_about;
use super::tolerance::ELLIPSE_SEGMENTS;
use crate::model::{Point, Shape, ShapeKind};

impl Shape {
    /// World-space boundary, or `None` when the shape has no derivable outline.
    ///
    /// Rectangles give their four corners, ellipses a fixed 32-point fan, and
    /// polygon/line kinds their own points; rotation is applied about the anchor.
    /// Freehand strokes have no boundary.
    pub fn boundary_polygon(&self) -> Option<Vec<Point>> {
        let c = self.anchor;
        let rel: Vec<Point> = match &self.kind {
            ShapeKind::Rectangle => {
                let (hw, hh) = (0.5 * self.width, 0.5 * self.height);
                vec![
                    Point::new(-hw, -hh),
                    Point::new(hw, -hh),
                    Point::new(hw, hh),
                    Point::new(-hw, hh),
                ]
            }
            ShapeKind::Ellipse => {
                let (rx, ry) = (0.5 * self.width, 0.5 * self.height);
                (0..ELLIPSE_SEGMENTS)
                    .map(|i| {
                        let a = std::f64::consts::TAU * (i as f64) / (ELLIPSE_SEGMENTS as f64);
                        Point::new(rx * a.cos(), ry * a.sin())
                    })
                    .collect()
            }
            ShapeKind::Polygon { points } | ShapeKind::Line { points } => {
                if points.len() < 2 {
                    return None;
                }
                points.clone()
            }
            ShapeKind::Freehand { .. } => return None,
        };
        let world: Vec<Point> = rel
            .into_iter()
            .map(|p| rotate_about(c + p, c, self.rotation))
            .collect();
        if world.iter().all(Point::is_finite) {
            Some(world)
        } else {
            None
        }
    }

    /// Whether the boundary encloses area (slicing partitions only these).
    pub fn is_closed(&self) -> bool {
        matches!(
            self.kind,
            ShapeKind::Rectangle | ShapeKind::Ellipse | ShapeKind::Polygon { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_corners_rotate_about_anchor() {
        let r = Shape::rectangle(Point::new(100.0, 100.0), 20.0, 10.0).with_rotation(90.0);
        let pts = r.boundary_polygon().unwrap();
        assert_eq!(pts.len(), 4);
        // (-10,-5) rotated 90 degrees -> (5,-10)
        assert!((pts[0].x - 105.0).abs() < 1e-9 && (pts[0].y - 90.0).abs() < 1e-9);
    }

    #[test]
    fn ellipse_has_fixed_fan() {
        let e = Shape::ellipse(Point::ORIGIN, 40.0, 20.0);
        let pts = e.boundary_polygon().unwrap();
        assert_eq!(pts.len(), ELLIPSE_SEGMENTS);
        assert!((pts[0].x - 20.0).abs() < 1e-9 && pts[0].y.abs() < 1e-9);
    }

    #[test]
    fn polygon_points_are_translated() {
        let world = [Point::new(10.0, 10.0), Point::new(30.0, 10.0), Point::new(30.0, 40.0)];
        let poly = Shape::polygon(&world);
        assert_eq!(poly.anchor, Point::new(20.0, 25.0));
        assert_eq!(poly.boundary_polygon().unwrap(), world.to_vec());
    }

    #[test]
    fn freehand_has_no_boundary() {
        let mut s = Shape::line(&[Point::ORIGIN, Point::new(5.0, 5.0)]);
        s.kind = ShapeKind::Freehand { points: vec![Point::ORIGIN, Point::new(1.0, 1.0)] };
        assert!(s.boundary_polygon().is_none());
        assert!(!s.is_closed());
    }
}
