use lastmile_routing::{
    cache::{MatrixCache, cached_matrix},
    error::RoutingError,
    matrix::DistanceMatrix,
    oracle::DistanceOracle,
    point::Point,
};
use tracing::warn;

use crate::problem::{delivery::Delivery, instance::Instance};

/// One depot capacitated routing problem in matrix form. Index 0 of the
/// matrix is the depot, index `i + 1` is delivery `i`.
#[derive(Debug, Clone)]
pub struct CvrpProblem {
    pub matrix: DistanceMatrix,
    pub sizes: Vec<f64>,
    pub capacity: f64,
}

impl CvrpProblem {
    pub fn num_deliveries(&self) -> usize {
        self.sizes.len()
    }

    /// Distance between two deliveries.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.matrix.get(from + 1, to + 1)
    }

    pub fn from_depot(&self, to: usize) -> f64 {
        self.matrix.get(0, to + 1)
    }

    pub fn to_depot(&self, from: usize) -> f64 {
        self.matrix.get(from + 1, 0)
    }

    /// Sizes summed in route order.
    pub fn load(&self, route: &[usize]) -> f64 {
        route.iter().fold(0.0, |load, &index| load + self.sizes[index])
    }

    pub fn route_distance(&self, route: &[usize]) -> f64 {
        match (route.first(), route.last()) {
            (Some(&first), Some(&last)) => {
                let legs = route
                    .windows(2)
                    .fold(self.from_depot(first), |total, leg| {
                        total + self.distance(leg[0], leg[1])
                    });
                legs + self.to_depot(last)
            }
            _ => 0.0,
        }
    }
}

/// A capacitated routing backend. Returns routes of delivery indices, every
/// delivery in exactly one route.
pub trait CvrpSolver: Send + Sync {
    fn name(&self) -> &str;

    fn solve(&self, problem: &CvrpProblem) -> Vec<Vec<usize>>;
}

/// Distance matrices for the baselines, read through a persistent cache when one is set.
pub struct MatrixProvider<'a> {
    oracle: &'a DistanceOracle,
    cache: Option<&'a dyn MatrixCache>,
}

impl<'a> MatrixProvider<'a> {
    pub fn new(oracle: &'a DistanceOracle) -> Self {
        MatrixProvider {
            oracle,
            cache: None,
        }
    }

    pub fn with_cache(oracle: &'a DistanceOracle, cache: &'a dyn MatrixCache) -> Self {
        MatrixProvider {
            oracle,
            cache: Some(cache),
        }
    }

    pub fn oracle(&self) -> &'a DistanceOracle {
        self.oracle
    }

    pub fn matrix(&self, points: &[Point]) -> Result<DistanceMatrix, RoutingError> {
        let Some(cache) = self.cache else {
            return self.oracle.matrix(points);
        };

        match cached_matrix(self.oracle, points, cache) {
            Ok(matrix) => Ok(matrix),
            Err(err) => match err.downcast::<RoutingError>() {
                Ok(err) => Err(err),
                Err(err) => {
                    warn!("Matrix cache unavailable, computing directly: {}", err);
                    self.oracle.matrix(points)
                }
            },
        }
    }
}

/// Solves the routing of `deliveries` from `depot`. Routes index into `deliveries`.
pub fn solve_cvrp(
    solver: &dyn CvrpSolver,
    provider: &MatrixProvider,
    depot: &Point,
    deliveries: &[&Delivery],
    capacity: f64,
) -> Result<Vec<Vec<usize>>, RoutingError> {
    if deliveries.is_empty() {
        return Ok(vec![]);
    }

    let points: Vec<Point> = std::iter::once(*depot)
        .chain(deliveries.iter().map(|delivery| *delivery.point()))
        .collect();

    let problem = CvrpProblem {
        matrix: provider.matrix(&points)?,
        sizes: deliveries.iter().map(|delivery| delivery.size()).collect(),
        capacity,
    };

    Ok(solver.solve(&problem))
}

/// Upper bound on the vehicles an instance needs: the number of the largest
/// deliveries that fit in a vehicle bounds how many any vehicle can carry.
/// Unlike `ceil(total / capacity)` it never underestimates.
pub fn estimate_num_vehicles(instance: &Instance) -> usize {
    let num_deliveries = instance.deliveries().len();
    if num_deliveries == 0 {
        return 0;
    }

    let per_vehicle = (instance.capacity() / instance.max_size()).floor() as usize;
    if per_vehicle == 0 {
        return num_deliveries;
    }

    num_deliveries.div_ceil(per_vehicle)
}
