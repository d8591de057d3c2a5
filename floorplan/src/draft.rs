//! In-progress wall drawing session.

use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::geometry::math::dist;
use crate::geometry::tolerance::EPS_POS;
use crate::model::Point;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum WallDraft {
    #[default]
    Idle,
    Drawing {
        points: Vec<Point>,
        /// Pointer position not yet committed as a point.
        preview: Option<Point>,
    },
}

impl WallDraft {
    pub fn is_drawing(&self) -> bool {
        matches!(self, WallDraft::Drawing { .. })
    }

    /// Start a new draft at `p`, discarding any previous one.
    pub fn begin(&mut self, p: Point) -> Result<(), SceneError> {
        if !p.is_finite() {
            return Err(SceneError::NonFinite("point"));
        }
        *self = WallDraft::Drawing { points: vec![p], preview: None };
        Ok(())
    }

    /// Append a clicked point. Returns `Ok(false)` when it would form a zero-length segment.
    pub fn append(&mut self, p: Point) -> Result<bool, SceneError> {
        if !p.is_finite() {
            return Err(SceneError::NonFinite("point"));
        }
        let WallDraft::Drawing { points, preview } = self else {
            return Err(SceneError::DraftNotActive);
        };
        if points.last().map_or(false, |&q| dist(q, p) <= EPS_POS) {
            return Ok(false);
        }
        points.push(p);
        *preview = None;
        Ok(true)
    }

    pub fn update_preview(&mut self, p: Point) -> Result<(), SceneError> {
        if !p.is_finite() {
            return Err(SceneError::NonFinite("point"));
        }
        match self {
            WallDraft::Drawing { preview, .. } => {
                *preview = Some(p);
                Ok(())
            }
            WallDraft::Idle => Err(SceneError::DraftNotActive),
        }
    }

    pub fn points(&self) -> &[Point] {
        match self {
            WallDraft::Drawing { points, .. } => points,
            WallDraft::Idle => &[],
        }
    }

    /// Committed points followed by the preview endpoint, for painting the rubber band.
    pub fn preview_points(&self) -> Vec<Point> {
        match self {
            WallDraft::Drawing { points, preview } => points.iter().copied().chain(*preview).collect(),
            WallDraft::Idle => Vec::new(),
        }
    }

    pub fn segments(&self) -> Vec<(Point, Point)> {
        self.points().windows(2).map(|w| (w[0], w[1])).collect()
    }

    /// End the session and hand back its points. The draft is idle afterwards
    /// whatever the outcome.
    pub fn take(&mut self) -> Result<Vec<Point>, SceneError> {
        match std::mem::take(self) {
            WallDraft::Drawing { points, .. } if points.len() >= 2 => Ok(points),
            WallDraft::Drawing { .. } => Err(SceneError::DraftTooShort),
            WallDraft::Idle => Err(SceneError::DraftNotActive),
        }
    }

    pub fn cancel(&mut self) -> bool {
        let was = self.is_drawing();
        *self = WallDraft::Idle;
        was
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        let mut d = WallDraft::default();
        assert_eq!(d.append(Point::ORIGIN), Err(SceneError::DraftNotActive));
        d.begin(Point::ORIGIN).unwrap();
        assert_eq!(d.append(Point::ORIGIN), Ok(false));
        d.update_preview(Point::new(3.0, 4.0)).unwrap();
        assert_eq!(d.preview_points(), vec![Point::ORIGIN, Point::new(3.0, 4.0)]);
        assert_eq!(d.append(Point::new(10.0, 0.0)), Ok(true));
        assert_eq!(d.preview_points().len(), 2);
        assert_eq!(d.segments().len(), 1);
        assert_eq!(d.take().unwrap().len(), 2);
        assert!(!d.is_drawing());
    }

    #[test]
    fn short_draft_is_rejected_and_reset() {
        let mut d = WallDraft::default();
        d.begin(Point::ORIGIN).unwrap();
        assert_eq!(d.take(), Err(SceneError::DraftTooShort));
        assert_eq!(d, WallDraft::Idle);
        assert_eq!(d.begin(Point::new(f64::NAN, 0.0)), Err(SceneError::NonFinite("point")));
        assert!(!d.cancel());
    }
}
