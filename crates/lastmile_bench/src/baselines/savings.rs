use std::cmp::Ordering;

use super::solver::{CvrpProblem, CvrpSolver};

struct Saving {
    from: usize,
    to: usize,
    value: f64,
}

/// Clarke-Wright savings on a directed matrix.
///
/// Every delivery starts on its own route. Two routes are joined when the
/// tail of one is `from` and the head of the other is `to`, in decreasing
/// order of `d(from, depot) + d(depot, to) - d(from, to)`. Routes are never
/// reversed since that changes their cost when streets are one-way.
#[derive(Default)]
pub struct SavingsSolver;

impl CvrpSolver for SavingsSolver {
    fn name(&self) -> &str {
        "savings"
    }

    fn solve(&self, problem: &CvrpProblem) -> Vec<Vec<usize>> {
        let n = problem.num_deliveries();

        let mut savings = Vec::with_capacity(n * n.saturating_sub(1));
        for from in 0..n {
            for to in 0..n {
                if from == to {
                    continue;
                }

                let value =
                    problem.to_depot(from) + problem.from_depot(to) - problem.distance(from, to);
                if value > 0.0 {
                    savings.push(Saving { from, to, value });
                }
            }
        }

        // Largest first, ties in index order so the result is reproducible
        savings.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then(a.from.cmp(&b.from))
                .then(a.to.cmp(&b.to))
        });

        let mut route_of: Vec<usize> = (0..n).collect();
        let mut routes: Vec<Vec<usize>> = (0..n).map(|index| vec![index]).collect();
        let mut loads: Vec<f64> = problem.sizes.clone();

        for saving in &savings {
            let tail_route = route_of[saving.from];
            let head_route = route_of[saving.to];

            if tail_route == head_route
                || routes[tail_route].last() != Some(&saving.from)
                || routes[head_route].first() != Some(&saving.to)
            {
                continue;
            }

            // Summed in route order, the same way feasibility is checked
            let load = routes[head_route]
                .iter()
                .fold(loads[tail_route], |load, &index| load + problem.sizes[index]);
            if load > problem.capacity {
                continue;
            }

            let mut merged = std::mem::take(&mut routes[head_route]);
            for &index in &merged {
                route_of[index] = tail_route;
            }
            routes[tail_route].append(&mut merged);
            loads[tail_route] = load;
            loads[head_route] = 0.0;
        }

        routes.retain(|route| !route.is_empty());
        routes
    }
}

/// Orders routes by their first delivery, which keeps solution files stable.
pub fn sort_routes(routes: &mut [Vec<usize>]) {
    routes.sort_by(|a, b| match (a.first(), b.first()) {
        (Some(a), Some(b)) => a.cmp(b),
        _ => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use lastmile_routing::matrix::DistanceMatrix;

    use super::*;

    /// Depot at 0 and deliveries on a line at 1, 2, 3 and -1, -2.
    fn line_problem(capacity: f64) -> CvrpProblem {
        let positions = [0.0, 1.0, 2.0, 3.0, -1.0, -2.0];
        let rows = positions
            .iter()
            .map(|a| positions.iter().map(|b| f64::abs(a - b)).collect())
            .collect();

        CvrpProblem {
            matrix: DistanceMatrix::from_rows(rows),
            sizes: vec![1.0; 5],
            capacity,
        }
    }

    fn total(problem: &CvrpProblem, routes: &[Vec<usize>]) -> f64 {
        routes.iter().map(|route| problem.route_distance(route)).sum()
    }

    #[test]
    fn test_merges_along_each_side() {
        let problem = line_problem(10.0);
        let mut routes = SavingsSolver.solve(&problem);
        sort_routes(&mut routes);

        // Going out and back along each side of the depot is optimal
        assert_eq!(routes.len(), 2);
        assert_eq!(total(&problem, &routes), 6.0 + 4.0);
    }

    #[test]
    fn test_respects_capacity() {
        let problem = line_problem(2.0);
        let routes = SavingsSolver.solve(&problem);

        let mut served: Vec<usize> = routes.iter().flatten().copied().collect();
        served.sort_unstable();

        assert_eq!(served, vec![0, 1, 2, 3, 4]);
        assert!(routes.iter().all(|route| problem.load(route) <= 2.0));
        assert_eq!(routes.len(), 3);
    }

    #[test]
    fn test_directed_matrix_keeps_direction() {
        // Driving 0 -> 1 is cheap, 1 -> 0 is expensive
        let problem = CvrpProblem {
            matrix: DistanceMatrix::from_rows(vec![
                vec![0.0, 10.0, 10.0],
                vec![10.0, 0.0, 1.0],
                vec![10.0, 50.0, 0.0],
            ]),
            sizes: vec![1.0, 1.0],
            capacity: 2.0,
        };

        assert_eq!(SavingsSolver.solve(&problem), vec![vec![0, 1]]);
    }

    #[test]
    fn test_empty_problem() {
        let problem = CvrpProblem {
            matrix: DistanceMatrix::from_rows(vec![vec![0.0]]),
            sizes: vec![],
            capacity: 1.0,
        };

        assert!(SavingsSolver.solve(&problem).is_empty());
    }
}
