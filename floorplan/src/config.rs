use serde::{Deserialize, Serialize};

use crate::geometry::tolerance;

/// Editing tolerances and defaults, all in millimeters.
///
/// Hosts may pass a partial object; missing fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// A draft end within this distance of a wall endpoint connects to it.
    pub snap_threshold: f64,
    /// Nodes closer than this collapse into one when building or merging walls.
    pub merge_tolerance: f64,
    /// A draft whose last point lands this close to its first closes into a loop.
    pub closure_tolerance: f64,
    pub min_edge_length: f64,
    pub default_gap: f64,
    pub default_thickness: f64,
    pub history_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            snap_threshold: tolerance::SNAP_TOL,
            merge_tolerance: tolerance::MERGE_TOL,
            closure_tolerance: tolerance::CLOSURE_TOL,
            min_edge_length: tolerance::MIN_EDGE_LEN,
            default_gap: tolerance::DEFAULT_GAP,
            default_thickness: tolerance::DEFAULT_THICKNESS,
            history_depth: 64,
        }
    }
}

impl EditorConfig {
    pub fn from_json_value(v: serde_json::Value) -> Result<Self, crate::SceneError> {
        let cfg: EditorConfig = serde_json::from_value(v)?;
        let lengths = [
            ("snap_threshold", cfg.snap_threshold),
            ("merge_tolerance", cfg.merge_tolerance),
            ("closure_tolerance", cfg.closure_tolerance),
            ("min_edge_length", cfg.min_edge_length),
            ("default_gap", cfg.default_gap),
            ("default_thickness", cfg.default_thickness),
        ];
        for (name, v) in lengths {
            if !v.is_finite() {
                return Err(crate::SceneError::NonFinite(name));
            }
            if v < 0.0 {
                return Err(crate::SceneError::OutOfBounds(name.to_string()));
            }
        }
        if cfg.history_depth == 0 {
            return Err(crate::SceneError::OutOfBounds("history_depth".into()));
        }
        Ok(cfg)
    }
}
