use lastmile_routing::{error::RoutingError, point::Point};

use crate::simulation::{
    Placement,
    router::{IncrementalRouter, RouterView},
};

/// Cheapest option and the depot of a new route for the current delivery.
pub(crate) fn new_route(view: &RouterView<'_>) -> Result<(f64, Point), RoutingError> {
    let point = view.current().point();
    let mut best: Option<(f64, Point)> = None;

    for depot in view.depots() {
        let cost = view.oracle().distance(depot, point)? + view.oracle().distance(point, depot)?;
        if best.is_none_or(|(best_cost, _)| cost < best_cost) {
            best = Some((cost, *depot));
        }
    }

    best.ok_or_else(|| RoutingError::UnresolvedPoint(*point))
}

/// Extra distance of appending the current delivery to `route`, `None` when
/// it does not fit.
pub(crate) fn append_cost(view: &RouterView<'_>, route: usize) -> Result<Option<f64>, RoutingError> {
    let open_route = &view.routes()[route];
    let delivery = view.current();

    if open_route.load() + delivery.size() > view.capacity() {
        return Ok(None);
    }

    let oracle = view.oracle();
    let last = view.last_point(open_route);
    let depot = open_route.depot();

    Ok(Some(
        oracle.distance(last, delivery.point())? + oracle.distance(delivery.point(), depot)?
            - oracle.distance(last, depot)?,
    ))
}

/// Appends each delivery where it adds the least distance, opening a route
/// from the closest depot when that is cheaper or nothing fits.
#[derive(Default)]
pub struct GreedyAppendRouter;

impl IncrementalRouter for GreedyAppendRouter {
    fn name(&self) -> &str {
        "greedy"
    }

    fn place(&mut self, view: &RouterView<'_>) -> Result<Placement, RoutingError> {
        let (mut best_cost, depot) = new_route(view)?;
        let mut best = Placement::NewRoute { depot };

        for route in 0..view.routes().len() {
            let Some(cost) = append_cost(view, route)? else {
                continue;
            };

            // Appending wins ties against a new route, the first route wins among appends
            let better = match best {
                Placement::Append { .. } => cost < best_cost,
                _ => cost <= best_cost,
            };

            if better {
                best_cost = cost;
                best = Placement::Append { route };
            }
        }

        Ok(best)
    }
}
