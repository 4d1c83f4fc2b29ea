use lastmile_routing::{error::RoutingError, oracle::DistanceOracle, point::Point};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::problem::{instance::Instance, solution::Solution, task::TaskKind};

use super::{
    cvrp::CvrpValidator,
    error::{EvaluationError, InfeasibleReason},
    evaluator::EvaluationReport,
    validator::{SolutionValidator, check_instance},
};

/// Aggregated score of a hub placement submission.
#[derive(Serialize, Debug, Clone)]
pub struct SubmissionReport {
    /// Every instance selected the same hubs
    pub hub_consistent: bool,
    /// Hubs of the first instance, sorted
    pub hubs: Vec<Point>,
    pub reports: Vec<EvaluationReport>,
    pub feasible: bool,
    /// Sum over the instances, `f64::INFINITY` unless the whole submission is feasible
    pub total_distance: f64,
}

/// Task 3: the hubs are picked from the candidate sites of the instance and
/// then used as the depots of a regular capacitated routing solution.
pub struct HubPlacementValidator<'a> {
    oracle: &'a DistanceOracle,
}

/// Hub set in a canonical order, duplicates removed. Node annotations are ignored.
fn hub_key(hubs: &[Point]) -> Vec<Point> {
    let mut hubs: Vec<Point> = hubs.iter().map(|hub| Point::new(hub.lat, hub.lng)).collect();
    hubs.sort_by(|a, b| a.lat.total_cmp(&b.lat).then(a.lng.total_cmp(&b.lng)));
    hubs.dedup_by(|a, b| a.same_location(b));
    hubs
}

impl<'a> HubPlacementValidator<'a> {
    pub fn new(oracle: &'a DistanceOracle) -> Self {
        HubPlacementValidator { oracle }
    }

    /// Scores every instance of a submission. When two instances disagree on
    /// their hubs the submission is rejected wholesale, no instance is scored.
    #[instrument(skip_all, fields(instances = solutions.len()), level = "debug")]
    pub fn validate_submission(
        &self,
        solutions: &[(&Instance, &Solution)],
    ) -> Result<SubmissionReport, RoutingError> {
        for (instance, solution) in solutions {
            if solution.hubs.is_none() {
                warn!(
                    instance = instance.name(),
                    "Solution does not declare its hubs, using its route origins"
                );
            }
        }

        let keys: Vec<Vec<Point>> = solutions
            .iter()
            .map(|(_, solution)| hub_key(&solution.hub_set()))
            .collect();
        let hubs = keys.first().cloned().unwrap_or_default();

        let inconsistent = solutions
            .iter()
            .zip(&keys)
            .find(|(_, key)| **key != hubs)
            .map(|((instance, _), _)| instance.name().to_owned());

        if let Some(instance) = inconsistent {
            warn!(%instance, "Hub set differs from the rest of the submission");

            let reason = InfeasibleReason::HubSetInconsistent { instance };
            let reports = solutions
                .iter()
                .map(|(instance, solution)| {
                    EvaluationReport::infeasible(
                        instance,
                        TaskKind::HubPlacement,
                        solution,
                        reason.clone(),
                    )
                })
                .collect();

            return Ok(SubmissionReport {
                hub_consistent: false,
                hubs,
                reports,
                feasible: false,
                total_distance: f64::INFINITY,
            });
        }

        let reports = solutions
            .par_iter()
            .map(|(instance, solution)| {
                let result = self.validate(instance, solution);
                EvaluationReport::from_result(instance, TaskKind::HubPlacement, solution, result)
            })
            .collect::<Result<Vec<EvaluationReport>, RoutingError>>()?;

        let feasible = reports.iter().all(|report| report.feasible);
        let total_distance = if feasible {
            reports.iter().map(|report| report.total_distance).sum()
        } else {
            f64::INFINITY
        };

        info!(hubs = hubs.len(), feasible, total_distance, "Evaluated submission");

        Ok(SubmissionReport {
            hub_consistent: true,
            hubs,
            reports,
            feasible,
            total_distance,
        })
    }
}

impl SolutionValidator for HubPlacementValidator<'_> {
    fn task(&self) -> TaskKind {
        TaskKind::HubPlacement
    }

    /// A single instance on its own, the hub set only has to come from the candidates.
    fn validate(&self, instance: &Instance, solution: &Solution) -> Result<f64, EvaluationError> {
        check_instance(instance, solution)?;

        let hubs = solution
            .hub_set()
            .iter()
            .map(|hub| {
                instance.hubs().contains(hub).copied().ok_or_else(|| {
                    EvaluationError::infeasible(
                        instance.name(),
                        InfeasibleReason::HubNotCandidate { hub: *hub },
                    )
                })
            })
            .collect::<Result<Vec<Point>, EvaluationError>>()?;

        CvrpValidator::new(self.oracle).validate_with_depots(instance, &hubs, solution)
    }
}
