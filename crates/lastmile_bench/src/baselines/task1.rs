use lastmile_routing::{error::RoutingError, point::Point};
use tracing::{debug, instrument};

use crate::problem::{
    delivery::Delivery,
    instance::Instance,
    solution::{Solution, SolutionVehicle},
    task::TaskKind,
};

use super::{
    savings::sort_routes,
    solver::{CvrpSolver, MatrixProvider, estimate_num_vehicles, solve_cvrp},
};

/// Vehicles serving `deliveries` from `depot`, as found by `solver`.
pub(crate) fn route_vehicles(
    solver: &dyn CvrpSolver,
    provider: &MatrixProvider,
    depot: &Point,
    deliveries: &[&Delivery],
    capacity: f64,
) -> Result<Vec<SolutionVehicle>, RoutingError> {
    let mut routes = solve_cvrp(solver, provider, depot, deliveries, capacity)?;
    sort_routes(&mut routes);

    Ok(routes
        .into_iter()
        .map(|route| {
            SolutionVehicle::new(
                *depot,
                route
                    .into_iter()
                    .map(|index| deliveries[index].id().to_owned())
                    .collect(),
            )
        })
        .collect())
}

/// Task 1 baseline: every delivery routed from the first depot of the instance.
#[instrument(skip_all, fields(instance = instance.name(), solver = solver.name()), level = "debug")]
pub fn solve_cvrp_instance(
    solver: &dyn CvrpSolver,
    provider: &MatrixProvider,
    instance: &Instance,
) -> Result<Solution, RoutingError> {
    let Some(depot) = instance.depots().first() else {
        return Ok(Solution::new(instance.name(), vec![]).with_task(TaskKind::Cvrp));
    };

    let deliveries: Vec<&Delivery> = instance.deliveries().iter().collect();
    let vehicles = route_vehicles(solver, provider, depot, &deliveries, instance.capacity())?;

    debug!(
        vehicles = vehicles.len(),
        estimate = estimate_num_vehicles(instance),
        "Solved instance"
    );

    Ok(Solution::new(instance.name(), vehicles).with_task(TaskKind::Cvrp))
}
