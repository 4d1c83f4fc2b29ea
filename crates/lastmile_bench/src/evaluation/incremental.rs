use lastmile_routing::{oracle::DistanceOracle, point::Point};
use serde::{Deserialize, Serialize};

use crate::problem::{
    delivery::Delivery,
    instance::Instance,
    solution::{Solution, SolutionVehicle},
    task::TaskKind,
};

use super::{
    error::{EvaluationError, InfeasibleReason},
    validator::{SolutionValidator, check_instance, find_depot},
};

/// Where the current delivery goes.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Placement {
    /// After the last delivery of an open route
    Append { route: usize },
    /// At `position` of an open route, only the end of the route is allowed
    Insert { route: usize, position: usize },
    /// First delivery of a new route leaving from `depot`
    NewRoute { depot: Point },
}

/// A route being built online. Its deliveries are final.
#[derive(Debug, Clone)]
pub struct OpenRoute {
    depot: Point,
    deliveries: Vec<usize>,
    load: f64,
    legs: f64,
    return_leg: f64,
}

impl OpenRoute {
    pub fn depot(&self) -> &Point {
        &self.depot
    }

    /// Arrival indices of the deliveries, in visiting order.
    pub fn deliveries(&self) -> &[usize] {
        &self.deliveries
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    /// Distance from the depot through every delivery back to the depot.
    pub fn distance(&self) -> f64 {
        self.legs + self.return_leg
    }
}

/// Online validator of the incremental variant.
///
/// Deliveries are placed strictly in arrival order: the delivery at the cursor
/// is the only one that can be placed, and placed deliveries never move. The
/// cost is accumulated leg by leg in the same order the offline cost function
/// uses, so both agree on a finished run.
pub struct IncrementalState<'a> {
    instance: &'a Instance,
    oracle: &'a DistanceOracle,
    routes: Vec<OpenRoute>,
    cursor: usize,
}

impl<'a> IncrementalState<'a> {
    pub fn new(instance: &'a Instance, oracle: &'a DistanceOracle) -> Self {
        IncrementalState {
            instance,
            oracle,
            routes: vec![],
            cursor: 0,
        }
    }

    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    pub fn oracle(&self) -> &'a DistanceOracle {
        self.oracle
    }

    /// Arrival index of the next delivery to place.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&'a Delivery> {
        self.instance.deliveries().get(self.cursor)
    }

    /// Deliveries that arrived so far, the current one included.
    pub fn arrived(&self) -> &'a [Delivery] {
        let end = (self.cursor + 1).min(self.instance.deliveries().len());
        &self.instance.deliveries()[..end]
    }

    pub fn routes(&self) -> &[OpenRoute] {
        &self.routes
    }

    pub fn is_complete(&self) -> bool {
        self.cursor == self.instance.deliveries().len()
    }

    pub fn current_cost(&self) -> f64 {
        self.routes
            .iter()
            .fold(0.0, |total, route| total + route.distance())
    }

    fn infeasible(&self, reason: InfeasibleReason) -> EvaluationError {
        EvaluationError::infeasible(self.instance.name(), reason)
    }

    /// Finalizes the delivery `id` at `placement`. A rejected placement leaves
    /// the state untouched.
    pub fn place(&mut self, id: &str, placement: Placement) -> Result<(), EvaluationError> {
        let index = self
            .instance
            .delivery_index(id)
            .ok_or_else(|| self.infeasible(InfeasibleReason::UnknownDelivery { id: id.to_owned() }))?;

        if index < self.cursor {
            return Err(self.infeasible(InfeasibleReason::DuplicateDelivery { id: id.to_owned() }));
        }

        if index > self.cursor {
            return Err(self.infeasible(InfeasibleReason::NotYetArrived {
                id: id.to_owned(),
                arrival_index: index,
                cursor: self.cursor,
            }));
        }

        let delivery = self.instance.delivery(index);
        let capacity = self.instance.capacity();

        match placement {
            Placement::Append { route } => self.extend_route(route, index),
            Placement::Insert { route, position } => {
                let len = self
                    .routes
                    .get(route)
                    .map(OpenRoute::len)
                    .ok_or_else(|| self.infeasible(InfeasibleReason::UnknownRoute { route }))?;

                if position < len {
                    return Err(self.infeasible(InfeasibleReason::NoRecombination {
                        route,
                        position,
                        len,
                    }));
                }

                if position > len {
                    return Err(self.infeasible(InfeasibleReason::InvalidPosition { route, position }));
                }

                self.extend_route(route, index)
            }
            Placement::NewRoute { depot } => {
                let depot = *find_depot(self.instance.depots(), self.routes.len(), &depot)
                    .map_err(|reason| self.infeasible(reason))?;

                if delivery.size() > capacity {
                    return Err(self.infeasible(InfeasibleReason::CapacityExceeded {
                        vehicle: self.routes.len(),
                        load: delivery.size(),
                        capacity,
                    }));
                }

                let legs = self.oracle.distance(&depot, delivery.point())?;
                let return_leg = self.oracle.distance(delivery.point(), &depot)?;

                self.routes.push(OpenRoute {
                    depot,
                    deliveries: vec![index],
                    load: delivery.size(),
                    legs,
                    return_leg,
                });
                self.cursor += 1;

                Ok(())
            }
        }
    }

    fn extend_route(&mut self, route: usize, index: usize) -> Result<(), EvaluationError> {
        let open_route = self
            .routes
            .get(route)
            .ok_or_else(|| self.infeasible(InfeasibleReason::UnknownRoute { route }))?;

        let delivery = self.instance.delivery(index);
        let load = open_route.load + delivery.size();

        if load > self.instance.capacity() {
            return Err(self.infeasible(InfeasibleReason::CapacityExceeded {
                vehicle: route,
                load,
                capacity: self.instance.capacity(),
            }));
        }

        let previous = match open_route.deliveries.last() {
            Some(&last) => self.instance.delivery(last).point(),
            None => &open_route.depot,
        };
        let leg = self.oracle.distance(previous, delivery.point())?;
        let return_leg = self.oracle.distance(delivery.point(), &open_route.depot)?;

        let open_route = &mut self.routes[route];
        open_route.deliveries.push(index);
        open_route.load = load;
        open_route.legs += leg;
        open_route.return_leg = return_leg;
        self.cursor += 1;

        Ok(())
    }

    pub fn into_solution(self) -> Solution {
        let vehicles = self
            .routes
            .iter()
            .map(|route| {
                SolutionVehicle::new(
                    route.depot,
                    route
                        .deliveries
                        .iter()
                        .map(|&index| self.instance.delivery(index).id().to_owned())
                        .collect(),
                )
            })
            .collect();

        Solution::new(self.instance.name(), vehicles).with_task(TaskKind::Incremental)
    }
}

/// Task 2 on a solution file: replays its routes in arrival order through
/// `IncrementalState`. A route listing a delivery before one that arrived
/// earlier would need a recombination and is rejected.
pub struct IncrementalValidator<'a> {
    oracle: &'a DistanceOracle,
}

impl<'a> IncrementalValidator<'a> {
    pub fn new(oracle: &'a DistanceOracle) -> Self {
        IncrementalValidator { oracle }
    }
}

impl SolutionValidator for IncrementalValidator<'_> {
    fn task(&self) -> TaskKind {
        TaskKind::Incremental
    }

    fn validate(&self, instance: &Instance, solution: &Solution) -> Result<f64, EvaluationError> {
        check_instance(instance, solution)?;
        let infeasible =
            |reason: InfeasibleReason| EvaluationError::infeasible(instance.name(), reason);

        // (vehicle, position in the vehicle) of every delivery
        let mut assignment: Vec<Option<(usize, usize)>> = vec![None; instance.deliveries().len()];
        let mut vehicle_indices: Vec<Vec<usize>> = Vec::with_capacity(solution.vehicles.len());

        for (vehicle_index, vehicle) in solution.vehicles.iter().enumerate() {
            find_depot(instance.depots(), vehicle_index, &vehicle.origin).map_err(infeasible)?;

            let mut indices = Vec::with_capacity(vehicle.deliveries.len());
            for (position, id) in vehicle.deliveries.iter().enumerate() {
                let index = instance
                    .delivery_index(id)
                    .ok_or_else(|| infeasible(InfeasibleReason::UnknownDelivery { id: id.clone() }))?;

                if assignment[index].is_some() {
                    return Err(infeasible(InfeasibleReason::DuplicateDelivery { id: id.clone() }));
                }

                assignment[index] = Some((vehicle_index, position));
                indices.push(index);
            }
            vehicle_indices.push(indices);
        }

        let assignment = assignment
            .into_iter()
            .enumerate()
            .map(|(index, assigned)| {
                assigned.ok_or_else(|| {
                    infeasible(InfeasibleReason::UncoveredDelivery {
                        id: instance.delivery(index).id().to_owned(),
                    })
                })
            })
            .collect::<Result<Vec<(usize, usize)>, EvaluationError>>()?;

        let mut state = IncrementalState::new(instance, self.oracle);
        let mut vehicle_routes: Vec<Option<usize>> = vec![None; solution.vehicles.len()];

        for (index, &(vehicle_index, position)) in assignment.iter().enumerate() {
            let placement = match vehicle_routes[vehicle_index] {
                None => {
                    vehicle_routes[vehicle_index] = Some(state.routes().len());
                    Placement::NewRoute {
                        depot: solution.vehicles[vehicle_index].origin,
                    }
                }
                Some(route) => Placement::Insert {
                    route,
                    // Already placed deliveries listed before this one
                    position: vehicle_indices[vehicle_index][..position]
                        .iter()
                        .filter(|&&other| other < index)
                        .count(),
                },
            };

            state.place(instance.delivery(index).id(), placement)?;
        }

        Ok(state.current_cost())
    }
}
