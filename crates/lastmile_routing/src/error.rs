use thiserror::Error;

use crate::point::Point;

#[derive(Debug, Error)]
pub enum RoutingError {
    /// The network has no path between the two points. This is a data problem,
    /// retrying yields the same answer.
    #[error("No path between {from} and {to}")]
    UnreachablePoint { from: Point, to: Point },

    #[error("Point {0} does not resolve to a road network node")]
    UnresolvedPoint(Point),

    #[error("Invalid road network: {0}")]
    InvalidNetwork(String),

    #[error("Matrix of size {size} holds {values} values")]
    InvalidMatrix { size: usize, values: usize },

    #[error("Failed to read road network: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse road network: {0}")]
    Json(#[from] serde_json::Error),
}
