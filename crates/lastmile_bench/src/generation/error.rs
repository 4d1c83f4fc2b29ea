use lastmile_routing::{error::RoutingError, point::Point};
use thiserror::Error;

/// Failures while generating or loading one instance. They abort that instance only.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Vehicle capacity must be positive, got {0}")]
    InvalidCapacity(f64),

    #[error("Instance has no depot or hub candidate")]
    NoDepot,

    #[error("Invalid point {0}")]
    InvalidPoint(Point),

    #[error("Delivery {id} has invalid size {size}")]
    InvalidSize { id: String, size: f64 },

    #[error("Delivery id {0} is used more than once")]
    DuplicateDelivery(String),

    #[error("Delivery {id} of size {size} does not fit in a vehicle of capacity {capacity}")]
    OversizedDemand { id: String, size: f64, capacity: f64 },

    #[error("Region {0} has no density to sample from")]
    EmptyRegion(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid size distribution: {0}")]
    InvalidDistribution(String),

    #[error(transparent)]
    Routing(#[from] RoutingError),
}
