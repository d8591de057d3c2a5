// Ingestion limits for snapshots coming back from the host

// Scene size caps
pub const MAX_WALLS: usize = 20_000;
pub const MAX_SHAPES: usize = 50_000;
pub const MAX_NODES_PER_WALL: usize = 100_000;
pub const MAX_EDGES_PER_WALL: usize = 150_000;
pub const MAX_POINTS_PER_SHAPE: usize = 50_000;

// Numeric bounds (mm)
pub const COORD_MIN: f64 = -1.0e9;
pub const COORD_MAX: f64 =  1.0e9;
pub const GAP_MAX: f64 = 100_000.0;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }

#[inline]
pub fn in_gap_bounds(g: f64) -> bool { g.is_finite() && g >= 0.0 && g <= GAP_MAX }
