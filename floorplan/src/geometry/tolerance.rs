// Centralized tolerances and helpers for wall topology (millimeters)

pub const MERGE_TOL: f64 = 0.5;           // node dedup radius within one wall
pub const CLOSURE_TOL: f64 = 1.0;         // draft end within this of its start closes the loop
pub const SNAP_TOL: f64 = 10.0;           // draft end within this of a wall endpoint connects
pub const MIN_EDGE_LEN: f64 = 0.8;        // shorter edges are pruned after structural edits
pub const EPS_POS: f64 = 1e-6;            // exact-duplicate threshold after splitting
pub const EPS_LEN: f64 = 1e-9;            // zero-length vector threshold
pub const EPS_DENOM: f64 = 1e-9;          // determinant guard for line solves

// |cos| of 85 degrees; directions within 5 degrees of square count as perpendicular
pub const PERP_COS: f64 = 0.087_155_742_747_658_17;

pub const DEFAULT_GAP: f64 = 100.0;
pub const DEFAULT_THICKNESS: f64 = 100.0;
pub const ELLIPSE_SEGMENTS: usize = 32;

// Uniform grid cell for crossing detection
pub const CROSSING_CELL: f64 = 1000.0;

#[inline] pub fn clamp01(x: f64) -> f64 { x.max(0.0).min(1.0) }
#[inline] pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool { (a - b).abs() <= eps }

