use std::fmt;

use geo::{Distance, Haversine};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A geographic coordinate, optionally pinned to a road network node.
///
/// When `node` is set, distance lookups use that node directly instead of
/// snapping the coordinates to the closest node of the network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,

    /// External id of the road network node this point sits on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<u64>,
}

impl Point {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            node: None,
        }
    }

    pub fn on_node(lat: f64, lng: f64, node: u64) -> Self {
        Self {
            lat,
            lng,
            node: Some(node),
        }
    }

    pub fn with_node(self, node: u64) -> Self {
        Self {
            node: Some(node),
            ..self
        }
    }

    pub fn haversine_distance(&self, other: &Point) -> f64 {
        Haversine.distance(geo::Point::from(self), geo::Point::from(other))
    }

    /// Two points refer to the same place when their coordinates match exactly.
    /// The node annotation is ignored so that snapped and raw points compare equal.
    pub fn same_location(&self, other: &Point) -> bool {
        self.lat == other.lat && self.lng == other.lng
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(node) => write!(f, "({}, {}) [node {}]", self.lat, self.lng, node),
            None => write!(f, "({}, {})", self.lat, self.lng),
        }
    }
}

impl From<&Point> for geo::Point<f64> {
    fn from(point: &Point) -> Self {
        geo::Point::new(point.lng, point.lat)
    }
}

impl From<geo::Point<f64>> for Point {
    fn from(point: geo::Point<f64>) -> Self {
        Point::new(point.y(), point.x())
    }
}
