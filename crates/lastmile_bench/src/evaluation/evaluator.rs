use lastmile_routing::{error::RoutingError, oracle::DistanceOracle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::problem::{instance::Instance, solution::Solution, task::TaskKind};

use super::{
    cvrp::CvrpValidator,
    error::{EvaluationError, InfeasibleReason},
    hub_placement::{HubPlacementValidator, SubmissionReport},
    incremental::IncrementalValidator,
    validator::SolutionValidator,
};

/// Score of one solution. Infeasible solutions cost `f64::INFINITY`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub instance: String,
    pub task: TaskKind,
    pub feasible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<InfeasibleReason>,
    pub total_distance: f64,
    pub num_vehicles: usize,
}

impl EvaluationReport {
    pub fn feasible(instance: &Instance, task: TaskKind, solution: &Solution, distance: f64) -> Self {
        EvaluationReport {
            instance: instance.name().to_owned(),
            task,
            feasible: true,
            reason: None,
            total_distance: distance,
            num_vehicles: solution.num_vehicles(),
        }
    }

    pub fn infeasible(
        instance: &Instance,
        task: TaskKind,
        solution: &Solution,
        reason: InfeasibleReason,
    ) -> Self {
        EvaluationReport {
            instance: instance.name().to_owned(),
            task,
            feasible: false,
            reason: Some(reason),
            total_distance: f64::INFINITY,
            num_vehicles: solution.num_vehicles(),
        }
    }

    /// Turns the outcome of a validator into a report. Routing failures are not
    /// a property of the solution and are returned as errors.
    pub(crate) fn from_result(
        instance: &Instance,
        task: TaskKind,
        solution: &Solution,
        result: Result<f64, EvaluationError>,
    ) -> Result<Self, RoutingError> {
        match result {
            Ok(distance) => Ok(EvaluationReport::feasible(instance, task, solution, distance)),
            Err(EvaluationError::Infeasible(err)) => {
                debug!(instance = instance.name(), reason = %err.reason, "Infeasible solution");
                Ok(EvaluationReport::infeasible(instance, task, solution, err.reason))
            }
            Err(EvaluationError::Routing(err)) => Err(err),
        }
    }
}

/// Scores solutions with the validator of their task.
pub struct Evaluator<'a> {
    oracle: &'a DistanceOracle,
}

impl<'a> Evaluator<'a> {
    pub fn new(oracle: &'a DistanceOracle) -> Self {
        Evaluator { oracle }
    }

    /// Task declared by the solution, or else the one implied by the instance.
    pub fn task_of(instance: &Instance, solution: &Solution) -> TaskKind {
        solution.task.unwrap_or_else(|| instance.default_task())
    }

    pub fn validator(&self, task: TaskKind) -> Box<dyn SolutionValidator + 'a> {
        match task {
            TaskKind::Cvrp => Box::new(CvrpValidator::new(self.oracle)),
            TaskKind::Incremental => Box::new(IncrementalValidator::new(self.oracle)),
            TaskKind::HubPlacement => Box::new(HubPlacementValidator::new(self.oracle)),
        }
    }

    pub fn evaluate(
        &self,
        instance: &Instance,
        solution: &Solution,
    ) -> Result<EvaluationReport, RoutingError> {
        self.evaluate_as(Evaluator::task_of(instance, solution), instance, solution)
    }

    pub fn evaluate_as(
        &self,
        task: TaskKind,
        instance: &Instance,
        solution: &Solution,
    ) -> Result<EvaluationReport, RoutingError> {
        let result = self.validator(task).validate(instance, solution);
        EvaluationReport::from_result(instance, task, solution, result)
    }

    /// Independent instances are evaluated in parallel. Reports keep the input order.
    #[instrument(skip_all, fields(solutions = solutions.len()), level = "debug")]
    pub fn evaluate_all(
        &self,
        solutions: &[(&Instance, &Solution)],
    ) -> Result<Vec<EvaluationReport>, RoutingError> {
        let reports = solutions
            .par_iter()
            .map(|(instance, solution)| self.evaluate(instance, solution))
            .collect::<Result<Vec<EvaluationReport>, RoutingError>>()?;

        info!(
            feasible = reports.iter().filter(|report| report.feasible).count(),
            infeasible = reports.iter().filter(|report| !report.feasible).count(),
            "Evaluated solutions"
        );

        Ok(reports)
    }

    /// A hub placement submission, scored as a whole.
    pub fn evaluate_submission(
        &self,
        solutions: &[(&Instance, &Solution)],
    ) -> Result<SubmissionReport, RoutingError> {
        HubPlacementValidator::new(self.oracle).validate_submission(solutions)
    }
}

#[cfg(test)]
mod tests {
    use lastmile_routing::point::Point;

    use crate::{
        problem::solution::SolutionVehicle,
        test_utils::{grid_instance, grid_oracle, grid_point},
    };

    use super::*;

    fn instance() -> Instance {
        grid_instance("grid", &[(1, 2), (2, 1), (3, 3)], &[1.0, 1.0, 1.0], 2.0)
    }

    fn solution(routes: &[&[&str]]) -> Solution {
        Solution::new(
            "grid",
            routes
                .iter()
                .map(|ids| {
                    SolutionVehicle::new(
                        grid_point(0, 0),
                        ids.iter().map(|id| id.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_feasible_report() {
        let oracle = grid_oracle();
        let report = Evaluator::new(&oracle)
            .evaluate(&instance(), &solution(&[&["grid-0", "grid-1"], &["grid-2"]]))
            .unwrap();

        assert!(report.feasible);
        assert_eq!(report.task, TaskKind::Cvrp);
        assert_eq!(report.num_vehicles, 2);
        // 0,0 -> 1,2 -> 2,1 -> 0,0 is 3 + 2 + 3 blocks, 0,0 -> 3,3 and back is 12 blocks
        assert!((report.total_distance - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_report_costs_infinity() {
        let oracle = grid_oracle();
        let report = Evaluator::new(&oracle)
            .evaluate(&instance(), &solution(&[&["grid-0", "grid-1", "grid-2"]]))
            .unwrap();

        assert!(!report.feasible);
        assert_eq!(report.total_distance, f64::INFINITY);
        assert!(matches!(
            report.reason,
            Some(InfeasibleReason::CapacityExceeded { vehicle: 0, .. })
        ));
    }

    #[test]
    fn test_dispatch_on_solution_task() {
        let oracle = grid_oracle();
        let evaluator = Evaluator::new(&oracle);
        let instance = instance();

        // Visits grid-1 before grid-0, which arrived first
        let reordered = solution(&[&["grid-1", "grid-0"], &["grid-2"]]);
        assert!(evaluator.evaluate(&instance, &reordered).unwrap().feasible);

        let report = evaluator
            .evaluate(&instance, &reordered.clone().with_task(TaskKind::Incremental))
            .unwrap();
        assert_eq!(report.task, TaskKind::Incremental);
        assert!(matches!(
            report.reason,
            Some(InfeasibleReason::NoRecombination { .. })
        ));
    }

    #[test]
    fn test_routing_errors_propagate() {
        let oracle = grid_oracle();
        let mut far = solution(&[&["grid-0", "grid-1"], &["grid-2"]]);
        far.vehicles[0].origin = Point::new(0.0, 0.0);

        // Same coordinates as the depot, only the missing node differs
        assert!(Evaluator::new(&oracle).evaluate(&instance(), &far).unwrap().feasible);

        let mut instance = instance();
        instance.deliveries[2].set_point(Point::new(40.0, 40.0));

        assert!(matches!(
            Evaluator::new(&oracle).evaluate(&instance, &far),
            Err(RoutingError::UnresolvedPoint(_))
        ));
    }

    #[test]
    fn test_evaluate_all_keeps_order() {
        let oracle = grid_oracle();
        let instance = instance();
        let good = solution(&[&["grid-0", "grid-1"], &["grid-2"]]);
        let bad = solution(&[&["grid-0"]]);

        let reports = Evaluator::new(&oracle)
            .evaluate_all(&[(&instance, &good), (&instance, &bad), (&instance, &good)])
            .unwrap();

        assert_eq!(
            reports.iter().map(|report| report.feasible).collect::<Vec<_>>(),
            vec![true, false, true]
        );
    }
}
