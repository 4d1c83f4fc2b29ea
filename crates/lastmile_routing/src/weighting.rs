use std::fmt::Display;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{MAX_WEIGHT, WEIGHT_SCALE},
    edge_direction::EdgeDirection,
    graph::GraphEdge,
};

/// Fixed-point edge weight, millimeters or milliseconds depending on the metric.
pub type Weight = u64;

pub trait Weighting: Send + Sync {
    /// Returns `MAX_WEIGHT` when the edge cannot be traversed in this direction.
    fn calc_edge_weight(&self, edge: &GraphEdge, direction: EdgeDirection) -> Weight;

    /// Converts an accumulated weight back into meters or seconds.
    fn weight_to_value(&self, weight: Weight) -> f64 {
        weight as f64 / WEIGHT_SCALE
    }
}

#[derive(
    Deserialize, Serialize, JsonSchema, Debug, Default, Clone, Copy, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Shortest travel distance in meters
    #[default]
    Distance,
    /// Shortest travel time in seconds
    Time,
}

impl Metric {
    pub fn weighting(&self, default_speed_kmh: f64) -> Box<dyn Weighting> {
        match self {
            Metric::Distance => Box::new(DistanceWeighting),
            Metric::Time => Box::new(TimeWeighting::new(default_speed_kmh)),
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Metric::Distance => "distance",
                Metric::Time => "time",
            }
        )
    }
}

fn is_blocked(edge: &GraphEdge, direction: EdgeDirection) -> bool {
    edge.is_oneway() && direction == EdgeDirection::Backward
}

pub struct DistanceWeighting;

impl Weighting for DistanceWeighting {
    fn calc_edge_weight(&self, edge: &GraphEdge, direction: EdgeDirection) -> Weight {
        if is_blocked(edge, direction) {
            return MAX_WEIGHT;
        }

        (edge.distance() * WEIGHT_SCALE).round() as Weight
    }
}

pub struct TimeWeighting {
    default_speed_kmh: f64,
}

impl TimeWeighting {
    pub fn new(default_speed_kmh: f64) -> Self {
        TimeWeighting { default_speed_kmh }
    }

    fn speed(&self, edge: &GraphEdge) -> f64 {
        edge.speed_kmh()
            .filter(|speed| *speed > 0.0)
            .unwrap_or(self.default_speed_kmh)
    }
}

impl Weighting for TimeWeighting {
    fn calc_edge_weight(&self, edge: &GraphEdge, direction: EdgeDirection) -> Weight {
        if is_blocked(edge, direction) {
            return MAX_WEIGHT;
        }

        let speed_meters_per_second = self.speed(edge) / 3.6;
        (edge.distance() / speed_meters_per_second * WEIGHT_SCALE).round() as Weight
    }
}
