use lastmile_routing::{error::RoutingError, point::Point};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InfeasibleReason {
    #[error("route {vehicle} carries {load}, over the capacity of {capacity}")]
    CapacityExceeded {
        vehicle: usize,
        load: f64,
        capacity: f64,
    },

    #[error("delivery {id} is not served")]
    UncoveredDelivery { id: String },

    #[error("delivery {id} is served more than once")]
    DuplicateDelivery { id: String },

    #[error("delivery {id} is not part of the instance")]
    UnknownDelivery { id: String },

    #[error("route {vehicle} starts from {origin}, which is not a depot")]
    InvalidDepot { vehicle: usize, origin: Point },

    #[error("hub {hub} is not a candidate site")]
    HubNotCandidate { hub: Point },

    #[error("instance {instance} uses a different hub set than the rest of the submission")]
    HubSetInconsistent { instance: String },

    #[error("no-recombination violation: position {position} of route {route} is already finalized up to {len}")]
    NoRecombination {
        route: usize,
        position: usize,
        len: usize,
    },

    #[error("position {position} is past the end of route {route}")]
    InvalidPosition { route: usize, position: usize },

    #[error("route {route} does not exist")]
    UnknownRoute { route: usize },

    #[error("delivery {id} arrives at {arrival_index}, the simulation is at {cursor}")]
    NotYetArrived {
        id: String,
        arrival_index: usize,
        cursor: usize,
    },

    #[error("solution is for instance {found}, expected {expected}")]
    InstanceMismatch { expected: String, found: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Infeasible solution for {instance}: {reason}")]
pub struct InfeasibleSolutionError {
    pub instance: String,
    pub reason: InfeasibleReason,
}

impl InfeasibleSolutionError {
    pub fn new(instance: impl Into<String>, reason: InfeasibleReason) -> Self {
        InfeasibleSolutionError {
            instance: instance.into(),
            reason,
        }
    }
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Infeasible(#[from] InfeasibleSolutionError),

    /// Not a property of the solution: the instance cannot be scored on this network
    #[error(transparent)]
    Routing(#[from] RoutingError),
}

impl EvaluationError {
    pub fn infeasible(instance: impl Into<String>, reason: InfeasibleReason) -> Self {
        EvaluationError::Infeasible(InfeasibleSolutionError::new(instance, reason))
    }

    pub fn reason(&self) -> Option<&InfeasibleReason> {
        match self {
            EvaluationError::Infeasible(err) => Some(&err.reason),
            EvaluationError::Routing(_) => None,
        }
    }
}
