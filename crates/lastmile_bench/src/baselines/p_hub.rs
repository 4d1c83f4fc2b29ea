use lastmile_routing::{error::RoutingError, oracle::DistanceOracle, point::Point};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::problem::{
    delivery::Delivery,
    instance::Instance,
    solution::{Solution, SolutionVehicle},
    task::TaskKind,
};

use super::{
    solver::{CvrpSolver, MatrixProvider},
    task1::route_vehicles,
};

/// Task 3 baseline. Picks `num_hubs` candidate sites for the whole collection
/// with a greedy p-median over the pooled deliveries, sends every delivery to
/// its closest hub and routes each hub on its own.
pub struct PHubBaseline {
    num_hubs: usize,
}

/// `costs[hub][delivery]`, infinite when the delivery cannot be reached.
fn hub_costs(
    oracle: &DistanceOracle,
    candidates: &[Point],
    deliveries: &[&Delivery],
) -> Result<Vec<Vec<f64>>, RoutingError> {
    oracle.prepare(candidates)?;

    candidates
        .par_iter()
        .map(|hub| {
            deliveries
                .iter()
                .map(|delivery| match oracle.distance(hub, delivery.point()) {
                    Ok(distance) => Ok(distance),
                    Err(RoutingError::UnreachablePoint { .. }) => Ok(f64::INFINITY),
                    Err(err) => Err(err),
                })
                .collect::<Result<Vec<f64>, RoutingError>>()
        })
        .collect()
}

/// Greedy p-median: adds the candidate that lowers the summed distance to the
/// closest open hub the most, `num_hubs` times. Ties go to the lower index.
fn select_hubs(costs: &[Vec<f64>], num_deliveries: usize, num_hubs: usize) -> Vec<usize> {
    let mut selected: Vec<usize> = vec![];
    let mut closest = vec![f64::INFINITY; num_deliveries];

    while selected.len() < num_hubs.min(costs.len()) {
        let total = |hub: usize| -> f64 {
            closest
                .iter()
                .zip(&costs[hub])
                .map(|(current, cost)| current.min(*cost))
                .sum()
        };

        let best = (0..costs.len())
            .filter(|hub| !selected.contains(hub))
            .map(|hub| (hub, total(hub)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let Some((hub, _)) = best else {
            break;
        };

        for (current, cost) in closest.iter_mut().zip(&costs[hub]) {
            *current = current.min(*cost);
        }
        selected.push(hub);
    }

    selected.sort_unstable();
    selected
}

impl PHubBaseline {
    pub fn new(num_hubs: usize) -> Self {
        PHubBaseline { num_hubs }
    }

    /// Hubs shared by every instance, taken from the candidates of the first one.
    #[instrument(skip_all, fields(instances = instances.len(), num_hubs = self.num_hubs), level = "debug")]
    pub fn select(
        &self,
        oracle: &DistanceOracle,
        instances: &[Instance],
    ) -> Result<Vec<Point>, RoutingError> {
        let Some(first) = instances.first() else {
            return Ok(vec![]);
        };

        let candidates = first.depots();
        let deliveries: Vec<&Delivery> = instances
            .iter()
            .flat_map(|instance| instance.deliveries())
            .collect();

        let costs = hub_costs(oracle, candidates, &deliveries)?;
        let hubs: Vec<Point> = select_hubs(&costs, deliveries.len(), self.num_hubs)
            .into_iter()
            .map(|hub| candidates[hub])
            .collect();

        info!(
            hubs = hubs.len(),
            candidates = candidates.len(),
            deliveries = deliveries.len(),
            "Selected hubs"
        );

        Ok(hubs)
    }

    /// Routes one instance from `hubs`.
    pub fn solve_instance(
        &self,
        solver: &dyn CvrpSolver,
        provider: &MatrixProvider,
        instance: &Instance,
        hubs: &[Point],
    ) -> Result<Solution, RoutingError> {
        let deliveries: Vec<&Delivery> = instance.deliveries().iter().collect();
        let costs = hub_costs(provider.oracle(), hubs, &deliveries)?;

        let mut assigned: Vec<Vec<&Delivery>> = vec![vec![]; hubs.len()];
        for (index, delivery) in deliveries.iter().enumerate() {
            let hub = (0..hubs.len())
                .min_by(|&a, &b| costs[a][index].total_cmp(&costs[b][index]).then(a.cmp(&b)));

            match hub {
                Some(hub) => assigned[hub].push(*delivery),
                None => return Err(RoutingError::UnresolvedPoint(*delivery.point())),
            }
        }

        let mut vehicles: Vec<SolutionVehicle> = vec![];
        for (hub, deliveries) in hubs.iter().zip(&assigned) {
            debug!(hub = %hub, deliveries = deliveries.len(), "Routing hub");
            vehicles.extend(route_vehicles(
                solver,
                provider,
                hub,
                deliveries,
                instance.capacity(),
            )?);
        }

        Ok(Solution::new(instance.name(), vehicles)
            .with_task(TaskKind::HubPlacement)
            .with_hubs(hubs.to_vec()))
    }

    /// One solution per instance, all with the same hubs.
    pub fn solve(
        &self,
        solver: &dyn CvrpSolver,
        provider: &MatrixProvider,
        instances: &[Instance],
    ) -> Result<Vec<Solution>, RoutingError> {
        let hubs = self.select(provider.oracle(), instances)?;

        instances
            .iter()
            .map(|instance| self.solve_instance(solver, provider, instance, &hubs))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        baselines::savings::SavingsSolver,
        evaluation::hub_placement::HubPlacementValidator,
        generation::instance_builder::InstanceBuilder,
        test_utils::{grid_oracle, grid_point},
    };

    use super::*;

    #[test]
    fn test_select_hubs() {
        let costs = vec![
            vec![1.0, 1.0, 9.0, 9.0],
            vec![9.0, 9.0, 1.0, 1.0],
            vec![4.0, 4.0, 4.0, 4.0],
        ];

        // Alone the middle site is best, paired the two sides are
        assert_eq!(select_hubs(&costs, 4, 1), vec![2]);
        assert_eq!(select_hubs(&costs, 4, 3), vec![0, 1, 2]);
        assert_eq!(select_hubs(&costs, 4, 10), vec![0, 1, 2]);
        assert!(select_hubs(&costs, 4, 0).is_empty());
    }

    fn instance(name: &str, cells: &[(u64, u64)]) -> Instance {
        let mut builder = InstanceBuilder::default();
        builder
            .set_name(name)
            .set_capacity(2.0)
            .set_hub_candidates(vec![grid_point(0, 0), grid_point(5, 5), grid_point(0, 5)]);
        for (index, &(row, col)) in cells.iter().enumerate() {
            builder.add_delivery(format!("{}-{}", name, index), grid_point(row, col), 1.0);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_shared_hubs_across_instances() {
        let oracle = grid_oracle();
        let instances = vec![
            instance("first", &[(0, 1), (1, 0), (5, 4), (4, 5)]),
            instance("second", &[(1, 1), (4, 4), (5, 3)]),
        ];

        let baseline = PHubBaseline::new(2);
        let provider = MatrixProvider::new(&oracle);

        assert_eq!(
            baseline.select(&oracle, &instances).unwrap(),
            vec![grid_point(0, 0), grid_point(5, 5)]
        );

        let solutions = baseline.solve(&SavingsSolver, &provider, &instances).unwrap();
        let submission: Vec<(&Instance, &Solution)> = instances.iter().zip(&solutions).collect();

        let report = HubPlacementValidator::new(&oracle)
            .validate_submission(&submission)
            .unwrap();

        assert!(report.hub_consistent);
        assert!(report.feasible);
    }
}
