use crate::weighting::Weight;

pub const MAX_WEIGHT: Weight = u64::MAX;

/// Fixed-point scale of the integer weights: millimeters per meter, milliseconds per second.
pub(crate) const WEIGHT_SCALE: f64 = 1000.0;

pub(crate) const DEFAULT_SPEED_KMH: f64 = 30.0;
pub(crate) const DEFAULT_MAX_SNAP_DISTANCE_METERS: f64 = 500.0;

/// How many R-tree neighbours are re-ranked by haversine distance when snapping.
pub(crate) const SNAP_CANDIDATES: usize = 8;
