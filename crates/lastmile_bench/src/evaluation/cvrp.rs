use lastmile_routing::{oracle::DistanceOracle, point::Point};

use crate::problem::{instance::Instance, solution::Solution, task::TaskKind};

use super::{
    cost::total_distance,
    error::EvaluationError,
    validator::{SolutionValidator, check_instance, check_partition},
};

/// Task 1: the routes must partition the deliveries, start and end at a depot
/// and respect the vehicle capacity.
pub struct CvrpValidator<'a> {
    oracle: &'a DistanceOracle,
}

impl<'a> CvrpValidator<'a> {
    pub fn new(oracle: &'a DistanceOracle) -> Self {
        CvrpValidator { oracle }
    }

    pub(crate) fn validate_with_depots(
        &self,
        instance: &Instance,
        depots: &[Point],
        solution: &Solution,
    ) -> Result<f64, EvaluationError> {
        check_instance(instance, solution)?;

        let routes = check_partition(instance, depots, solution)
            .map_err(|reason| EvaluationError::infeasible(instance.name(), reason))?;

        Ok(total_distance(self.oracle, &routes)?)
    }
}

impl SolutionValidator for CvrpValidator<'_> {
    fn task(&self) -> TaskKind {
        TaskKind::Cvrp
    }

    fn validate(&self, instance: &Instance, solution: &Solution) -> Result<f64, EvaluationError> {
        self.validate_with_depots(instance, instance.depots(), solution)
    }
}

#[cfg(test)]
mod tests {
    use lastmile_routing::point::Point;
    use proptest::prelude::*;

    use crate::{
        evaluation::error::InfeasibleReason,
        generation::instance_builder::InstanceBuilder,
        problem::solution::SolutionVehicle,
        test_utils::{cycle_oracle, grid_instance, grid_oracle, grid_point, line_point},
    };

    use super::*;

    /// Depot on node 0 of the unit cycle, deliveries on nodes 1 and 3.
    fn cycle_instance() -> Instance {
        let mut builder = InstanceBuilder::default();
        builder
            .set_name("cycle")
            .set_capacity(2.0)
            .set_origin(line_point(0))
            .add_delivery("a", line_point(1), 1.0)
            .add_delivery("b", line_point(3), 1.0);
        builder.build().unwrap()
    }

    fn vehicle(origin: Point, ids: &[&str]) -> SolutionVehicle {
        SolutionVehicle::new(origin, ids.iter().map(|id| id.to_string()).collect())
    }

    fn reason(result: Result<f64, EvaluationError>) -> InfeasibleReason {
        match result {
            Err(EvaluationError::Infeasible(err)) => err.reason,
            other => panic!("expected an infeasible solution, got {:?}", other),
        }
    }

    #[test]
    fn test_single_route_on_cycle() {
        let oracle = cycle_oracle();
        let instance = cycle_instance();
        let validator = CvrpValidator::new(&oracle);

        let depot = Point::new(0.0, 0.0);
        let solution = Solution::new("cycle", vec![vehicle(depot, &["a", "b"])]);

        // 0 -> 1 is 1, 1 -> 3 is 2 either way around, 3 -> 0 is 1
        let expected = oracle.distance(&line_point(0), &line_point(1)).unwrap()
            + oracle.distance(&line_point(1), &line_point(3)).unwrap()
            + oracle.distance(&line_point(3), &line_point(0)).unwrap();

        assert_eq!(validator.validate(&instance, &solution).unwrap(), expected);
        assert_eq!(expected, 4.0);
    }

    #[test]
    fn test_skipped_delivery_is_rejected() {
        let oracle = cycle_oracle();
        let instance = cycle_instance();
        let validator = CvrpValidator::new(&oracle);

        let solution = Solution::new("cycle", vec![vehicle(line_point(0), &["a"])]);

        assert_eq!(
            reason(validator.validate(&instance, &solution)),
            InfeasibleReason::UncoveredDelivery { id: "b".into() }
        );
    }

    #[test]
    fn test_duplicate_and_unknown_deliveries() {
        let oracle = cycle_oracle();
        let instance = cycle_instance();
        let validator = CvrpValidator::new(&oracle);

        let duplicate = Solution::new(
            "cycle",
            vec![
                vehicle(line_point(0), &["a", "b"]),
                vehicle(line_point(0), &["a"]),
            ],
        );
        let unknown = Solution::new("cycle", vec![vehicle(line_point(0), &["a", "b", "z"])]);

        assert_eq!(
            reason(validator.validate(&instance, &duplicate)),
            InfeasibleReason::DuplicateDelivery { id: "a".into() }
        );
        assert_eq!(
            reason(validator.validate(&instance, &unknown)),
            InfeasibleReason::UnknownDelivery { id: "z".into() }
        );
    }

    #[test]
    fn test_capacity_boundary() {
        let oracle = grid_oracle();
        let validator = CvrpValidator::new(&oracle);
        let instance = grid_instance("grid", &[(1, 1), (2, 2), (3, 3)], &[2.5, 2.5, 0.5], 5.0);

        let at_capacity = Solution::new(
            "grid",
            vec![
                vehicle(grid_point(0, 0), &["grid-0", "grid-1"]),
                vehicle(grid_point(0, 0), &["grid-2"]),
            ],
        );
        assert!(validator.validate(&instance, &at_capacity).is_ok());

        let over_capacity = Solution::new(
            "grid",
            vec![vehicle(grid_point(0, 0), &["grid-0", "grid-1", "grid-2"])],
        );
        assert_eq!(
            reason(validator.validate(&instance, &over_capacity)),
            InfeasibleReason::CapacityExceeded {
                vehicle: 0,
                load: 5.5,
                capacity: 5.0
            }
        );

        // No tolerance above the capacity
        let instance = grid_instance("grid", &[(1, 1), (2, 2)], &[2.5, 2.5 + 1e-9], 5.0);
        let barely_over = Solution::new(
            "grid",
            vec![vehicle(grid_point(0, 0), &["grid-0", "grid-1"])],
        );
        assert!(matches!(
            reason(validator.validate(&instance, &barely_over)),
            InfeasibleReason::CapacityExceeded { vehicle: 0, load, capacity } if load > capacity && capacity == 5.0
        ));
    }

    #[test]
    fn test_invalid_depot_and_instance() {
        let oracle = cycle_oracle();
        let instance = cycle_instance();
        let validator = CvrpValidator::new(&oracle);

        let wrong_depot = Solution::new("cycle", vec![vehicle(line_point(2), &["a", "b"])]);
        assert!(matches!(
            reason(validator.validate(&instance, &wrong_depot)),
            InfeasibleReason::InvalidDepot { vehicle: 0, .. }
        ));

        let wrong_instance = Solution::new("other", vec![vehicle(line_point(0), &["a", "b"])]);
        assert!(matches!(
            reason(validator.validate(&instance, &wrong_instance)),
            InfeasibleReason::InstanceMismatch { .. }
        ));
    }

    #[test]
    fn test_empty_routes_cost_nothing() {
        let oracle = cycle_oracle();
        let instance = cycle_instance();
        let validator = CvrpValidator::new(&oracle);

        let solution = Solution::new(
            "cycle",
            vec![vehicle(line_point(0), &[]), vehicle(line_point(0), &["a", "b"])],
        );

        assert_eq!(validator.validate(&instance, &solution).unwrap(), 4.0);
    }

    const CELLS: [(u64, u64); 8] = [
        (1, 2),
        (2, 4),
        (3, 1),
        (4, 5),
        (5, 3),
        (2, 2),
        (0, 4),
        (5, 0),
    ];

    fn partition_instance() -> Instance {
        grid_instance("grid", &CELLS, &[1.0; 8], 8.0)
    }

    /// Splits the ids in `order` into consecutive routes at the given cut points.
    fn partition(order: &[usize], cuts: &[usize]) -> Solution {
        let mut bounds: Vec<usize> = cuts.iter().map(|cut| cut % (order.len() + 1)).collect();
        bounds.push(0);
        bounds.push(order.len());
        bounds.sort_unstable();

        let vehicles = bounds
            .windows(2)
            .map(|window| {
                SolutionVehicle::new(
                    grid_point(0, 0),
                    order[window[0]..window[1]]
                        .iter()
                        .map(|index| format!("grid-{}", index))
                        .collect(),
                )
            })
            .collect();

        Solution::new("grid", vehicles)
    }

    proptest! {
        #[test]
        fn test_any_partition_is_accepted(
            order in Just((0..8).collect::<Vec<usize>>()).prop_shuffle(),
            cuts in prop::collection::vec(0usize..9, 0..4),
        ) {
            let oracle = grid_oracle();
            let validator = CvrpValidator::new(&oracle);
            let instance = partition_instance();

            let cost = validator.validate(&instance, &partition(&order, &cuts)).unwrap();
            prop_assert!(cost > 0.0);
        }

        #[test]
        fn test_removed_delivery_is_rejected(
            order in Just((0..8).collect::<Vec<usize>>()).prop_shuffle(),
            cuts in prop::collection::vec(0usize..9, 0..4),
            removed in 0usize..8,
        ) {
            let oracle = grid_oracle();
            let validator = CvrpValidator::new(&oracle);
            let instance = partition_instance();

            let order: Vec<usize> = order.into_iter().filter(|&index| index != removed).collect();
            let result = validator.validate(&instance, &partition(&order, &cuts));

            let expected = InfeasibleReason::UncoveredDelivery {
                id: format!("grid-{}", removed),
            };
            let rejected = matches!(
                result,
                Err(EvaluationError::Infeasible(err)) if err.reason == expected
            );
            prop_assert!(rejected);
        }

        #[test]
        fn test_duplicated_delivery_is_rejected(
            order in Just((0..8).collect::<Vec<usize>>()).prop_shuffle(),
            cuts in prop::collection::vec(0usize..9, 0..4),
            duplicated in 0usize..8,
            position in 0usize..9,
        ) {
            let oracle = grid_oracle();
            let validator = CvrpValidator::new(&oracle);
            let instance = partition_instance();

            let mut order = order;
            order.insert(position, duplicated);
            let result = validator.validate(&instance, &partition(&order, &cuts));

            let expected = InfeasibleReason::DuplicateDelivery {
                id: format!("grid-{}", duplicated),
            };
            let rejected = matches!(
                result,
                Err(EvaluationError::Infeasible(err)) if err.reason == expected
            );
            prop_assert!(rejected);
        }
    }
}
