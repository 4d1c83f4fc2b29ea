use lastmile_routing::{error::RoutingError, oracle::DistanceOracle};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    evaluation::{
        error::{EvaluationError, InfeasibleSolutionError},
        evaluator::EvaluationReport,
        incremental::{IncrementalState, Placement},
    },
    problem::{instance::Instance, solution::Solution, task::TaskKind},
};

use super::router::{IncrementalRouter, RouterView};

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationState {
    NotStarted,
    /// Waiting for the placement of the delivery at `cursor`
    Running { cursor: usize },
    Finished,
    /// A placement was rejected. The run is over and scored as infeasible.
    Failed(InfeasibleSolutionError),
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Simulation is not running")]
    NotRunning,

    #[error("Simulation already started")]
    AlreadyStarted,

    #[error(transparent)]
    Routing(#[from] RoutingError),
}

/// Runs one instance of the incremental variant: deliveries are revealed in
/// arrival order and each one is placed before the next arrives.
pub struct IncrementalSimulator<'a> {
    incremental: IncrementalState<'a>,
    history: &'a [Instance],
    state: SimulationState,
}

impl<'a> IncrementalSimulator<'a> {
    pub fn new(instance: &'a Instance, oracle: &'a DistanceOracle, history: &'a [Instance]) -> Self {
        IncrementalSimulator {
            incremental: IncrementalState::new(instance, oracle),
            history,
            state: SimulationState::NotStarted,
        }
    }

    pub fn start(&mut self) -> Result<&SimulationState, SimulationError> {
        if self.state != SimulationState::NotStarted {
            return Err(SimulationError::AlreadyStarted);
        }

        self.state = if self.incremental.is_complete() {
            SimulationState::Finished
        } else {
            SimulationState::Running { cursor: 0 }
        };

        debug!(
            instance = self.incremental.instance().name(),
            deliveries = self.incremental.instance().deliveries().len(),
            "Started simulation"
        );

        Ok(&self.state)
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// What the router sees for the current delivery, while running.
    pub fn view(&self) -> Option<RouterView<'_>> {
        match self.state {
            SimulationState::Running { .. } => RouterView::new(&self.incremental, self.history),
            _ => None,
        }
    }

    /// Applies the placement of the current delivery. A rejected placement
    /// fails the run, a routing error leaves it where it was.
    pub fn apply(&mut self, id: &str, placement: Placement) -> Result<&SimulationState, SimulationError> {
        if !matches!(self.state, SimulationState::Running { .. }) {
            return Err(SimulationError::NotRunning);
        }

        match self.incremental.place(id, placement) {
            Ok(()) => {
                self.state = if self.incremental.is_complete() {
                    info!(
                        instance = self.incremental.instance().name(),
                        routes = self.incremental.routes().len(),
                        cost = self.incremental.current_cost(),
                        "Finished simulation"
                    );
                    SimulationState::Finished
                } else {
                    SimulationState::Running {
                        cursor: self.incremental.cursor(),
                    }
                };
            }
            Err(EvaluationError::Infeasible(err)) => {
                warn!(instance = %err.instance, reason = %err.reason, "Simulation failed");
                self.state = SimulationState::Failed(err);
            }
            Err(EvaluationError::Routing(err)) => return Err(err.into()),
        }

        Ok(&self.state)
    }

    /// Asks the router to place the current delivery.
    pub fn step(
        &mut self,
        router: &mut dyn IncrementalRouter,
    ) -> Result<&SimulationState, SimulationError> {
        let (id, placement) = {
            let view = self.view().ok_or(SimulationError::NotRunning)?;
            (view.current().id().to_owned(), router.place(&view)?)
        };

        self.apply(&id, placement)
    }

    /// Starts the run if needed and steps until it finishes or fails.
    pub fn run(
        &mut self,
        router: &mut dyn IncrementalRouter,
    ) -> Result<&SimulationState, SimulationError> {
        if self.state == SimulationState::NotStarted {
            self.start()?;
        }

        while let SimulationState::Running { .. } = self.state {
            self.step(router)?;
        }

        Ok(&self.state)
    }

    /// Cost of the routes so far, `f64::INFINITY` for a failed run.
    pub fn current_cost(&self) -> f64 {
        match self.state {
            SimulationState::Failed(_) => f64::INFINITY,
            _ => self.incremental.current_cost(),
        }
    }

    /// Score of a finished or failed run.
    pub fn report(&self) -> Option<EvaluationReport> {
        let instance = self.incremental.instance().name().to_owned();
        let num_vehicles = self.incremental.routes().len();

        match &self.state {
            SimulationState::Finished => Some(EvaluationReport {
                instance,
                task: TaskKind::Incremental,
                feasible: true,
                reason: None,
                total_distance: self.current_cost(),
                num_vehicles,
            }),
            SimulationState::Failed(err) => Some(EvaluationReport {
                instance,
                task: TaskKind::Incremental,
                feasible: false,
                reason: Some(err.reason.clone()),
                total_distance: f64::INFINITY,
                num_vehicles,
            }),
            _ => None,
        }
    }

    /// Routes placed so far.
    pub fn into_solution(self) -> Solution {
        self.incremental.into_solution()
    }
}

/// Runs `router` over a whole instance. The report is the simulator's own
/// score, a failed run keeps the reason its placement was rejected.
pub fn simulate(
    router: &mut dyn IncrementalRouter,
    instance: &Instance,
    oracle: &DistanceOracle,
    history: &[Instance],
) -> Result<(Solution, EvaluationReport), SimulationError> {
    let mut simulator = IncrementalSimulator::new(instance, oracle, history);
    simulator.run(router)?;

    let report = simulator.report().ok_or(SimulationError::NotRunning)?;

    Ok((simulator.into_solution(), report))
}
