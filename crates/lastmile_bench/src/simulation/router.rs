use lastmile_routing::{error::RoutingError, oracle::DistanceOracle, point::Point};

use crate::{
    evaluation::incremental::{IncrementalState, OpenRoute, Placement},
    problem::{delivery::Delivery, instance::Instance},
};

/// What a router may look at when placing a delivery. Deliveries that have not
/// arrived yet are not reachable from here.
pub struct RouterView<'a> {
    current: &'a Delivery,
    arrived: &'a [Delivery],
    routes: &'a [OpenRoute],
    capacity: f64,
    depots: &'a [Point],
    oracle: &'a DistanceOracle,
    history: &'a [Instance],
}

impl<'a> RouterView<'a> {
    /// `None` once every delivery is placed.
    pub(crate) fn new(state: &'a IncrementalState<'a>, history: &'a [Instance]) -> Option<Self> {
        let instance = state.instance();

        Some(RouterView {
            current: state.current()?,
            arrived: state.arrived(),
            routes: state.routes(),
            capacity: instance.capacity(),
            depots: instance.depots(),
            oracle: state.oracle(),
            history,
        })
    }

    /// Delivery to place now.
    pub fn current(&self) -> &'a Delivery {
        self.current
    }

    /// Deliveries up to and including the current one, in arrival order.
    pub fn arrived(&self) -> &'a [Delivery] {
        self.arrived
    }

    pub fn routes(&self) -> &'a [OpenRoute] {
        self.routes
    }

    pub fn route_point(&self, index: usize) -> &'a Point {
        self.arrived[index].point()
    }

    /// Where a route currently ends before driving back to its depot.
    pub fn last_point(&self, route: &'a OpenRoute) -> &'a Point {
        match route.deliveries().last() {
            Some(&last) => self.route_point(last),
            None => route.depot(),
        }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn depots(&self) -> &'a [Point] {
        self.depots
    }

    pub fn oracle(&self) -> &'a DistanceOracle {
        self.oracle
    }

    /// Completed instances of the same region.
    pub fn history(&self) -> &'a [Instance] {
        self.history
    }
}

/// Assigns arriving deliveries one at a time. Placements are final.
pub trait IncrementalRouter {
    fn name(&self) -> &str;

    fn place(&mut self, view: &RouterView<'_>) -> Result<Placement, RoutingError>;
}
