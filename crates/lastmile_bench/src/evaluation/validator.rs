use lastmile_routing::point::Point;

use crate::problem::{instance::Instance, solution::Solution, task::TaskKind};

use super::{
    cost::RouteRef,
    error::{EvaluationError, InfeasibleReason},
};

/// Feasibility rules of one benchmark variant on top of the shared cost function.
pub trait SolutionValidator: Sync {
    fn task(&self) -> TaskKind;

    /// Total distance of a feasible solution.
    fn validate(&self, instance: &Instance, solution: &Solution) -> Result<f64, EvaluationError>;
}

pub(crate) fn check_instance(instance: &Instance, solution: &Solution) -> Result<(), EvaluationError> {
    if solution.instance != instance.name() {
        return Err(EvaluationError::infeasible(
            instance.name(),
            InfeasibleReason::InstanceMismatch {
                expected: instance.name().to_owned(),
                found: solution.instance.clone(),
            },
        ));
    }

    Ok(())
}

/// The depot of `depots` at the origin of a vehicle.
pub(crate) fn find_depot<'a>(
    depots: &'a [Point],
    vehicle: usize,
    origin: &Point,
) -> Result<&'a Point, InfeasibleReason> {
    depots
        .iter()
        .find(|depot| depot.same_location(origin))
        .ok_or(InfeasibleReason::InvalidDepot {
            vehicle,
            origin: *origin,
        })
}

/// Checks that the vehicles start from `depots`, stay within capacity and
/// serve every delivery exactly once. Returns the routes to be priced.
pub(crate) fn check_partition<'a>(
    instance: &'a Instance,
    depots: &'a [Point],
    solution: &Solution,
) -> Result<Vec<RouteRef<'a>>, InfeasibleReason> {
    let mut served = vec![false; instance.deliveries().len()];
    let mut routes = Vec::with_capacity(solution.vehicles.len());

    for (vehicle_index, vehicle) in solution.vehicles.iter().enumerate() {
        let depot = find_depot(depots, vehicle_index, &vehicle.origin)?;

        let mut load = 0.0;
        let mut stops = Vec::with_capacity(vehicle.deliveries.len());

        for id in &vehicle.deliveries {
            let index = instance
                .delivery_index(id)
                .ok_or_else(|| InfeasibleReason::UnknownDelivery { id: id.clone() })?;

            if served[index] {
                return Err(InfeasibleReason::DuplicateDelivery { id: id.clone() });
            }
            served[index] = true;

            let delivery = instance.delivery(index);
            load += delivery.size();
            stops.push(delivery.point());
        }

        // No tolerance, a route exactly at capacity is fine
        if load > instance.capacity() {
            return Err(InfeasibleReason::CapacityExceeded {
                vehicle: vehicle_index,
                load,
                capacity: instance.capacity(),
            });
        }

        routes.push(RouteRef { depot, stops });
    }

    if let Some(index) = served.iter().position(|served| !served) {
        return Err(InfeasibleReason::UncoveredDelivery {
            id: instance.delivery(index).id().to_owned(),
        });
    }

    Ok(routes)
}
