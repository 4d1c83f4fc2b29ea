use lastmile_routing::{error::RoutingError, oracle::DistanceOracle, point::Point};

/// A route as the cost function sees it.
#[derive(Debug, Clone)]
pub struct RouteRef<'a> {
    pub depot: &'a Point,
    pub stops: Vec<&'a Point>,
}

/// Depot to the first stop, stop to stop in order, last stop back to the depot.
/// An empty route costs nothing.
pub fn route_distance<'a>(
    oracle: &DistanceOracle,
    depot: &'a Point,
    stops: impl IntoIterator<Item = &'a Point>,
) -> Result<f64, RoutingError> {
    let mut distance = 0.0;
    let mut last = None;

    for stop in stops {
        distance += oracle.distance(last.unwrap_or(depot), stop)?;
        last = Some(stop);
    }

    if let Some(last) = last {
        distance += oracle.distance(last, depot)?;
    }

    Ok(distance)
}

/// Sum of the route distances, route by route.
pub fn total_distance(oracle: &DistanceOracle, routes: &[RouteRef<'_>]) -> Result<f64, RoutingError> {
    let points: Vec<Point> = routes
        .iter()
        .flat_map(|route| std::iter::once(route.depot).chain(route.stops.iter().copied()))
        .copied()
        .collect();
    oracle.prepare(&points)?;

    routes.iter().try_fold(0.0, |total, route| {
        Ok(total + route_distance(oracle, route.depot, route.stops.iter().copied())?)
    })
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{cycle_oracle, line_point};

    use super::*;

    #[test]
    fn test_route_distance() {
        let oracle = cycle_oracle();
        let depot = line_point(0);
        let stops = [line_point(1), line_point(2)];

        // 0 -> 1 -> 2 -> 0 around the cycle
        assert_eq!(route_distance(&oracle, &depot, &stops).unwrap(), 4.0);
        assert_eq!(route_distance(&oracle, &depot, std::iter::empty()).unwrap(), 0.0);
    }

    #[test]
    fn test_total_distance() {
        let oracle = cycle_oracle();
        let depot = line_point(0);
        let one = line_point(1);
        let three = line_point(3);

        let routes = vec![
            RouteRef {
                depot: &depot,
                stops: vec![&one],
            },
            RouteRef {
                depot: &depot,
                stops: vec![&three],
            },
        ];

        assert_eq!(total_distance(&oracle, &routes).unwrap(), 4.0);
    }
}
