use fxhash::FxHashMap;

use super::{Point, delivery::Delivery, task::TaskKind};

/// Where routes may start and end.
#[derive(Debug, Clone, PartialEq)]
pub enum HubSites {
    /// Depots given by the instance, usually a single origin
    Fixed(Vec<Point>),
    /// Sites a hub placement solution picks its hubs from
    Candidates(Vec<Point>),
}

impl HubSites {
    pub fn points(&self) -> &[Point] {
        match self {
            HubSites::Fixed(points) | HubSites::Candidates(points) => points,
        }
    }

    pub fn contains(&self, point: &Point) -> Option<&Point> {
        self.points().iter().find(|site| site.same_location(point))
    }
}

/// A generated problem, read-only once built. See `InstanceBuilder`.
#[derive(Debug, Clone)]
pub struct Instance {
    pub(crate) name: String,
    pub(crate) region: Option<geojson::Geometry>,
    pub(crate) capacity: f64,
    pub(crate) deliveries: Vec<Delivery>,
    pub(crate) hubs: HubSites,
    pub(crate) delivery_index: FxHashMap<String, usize>,
}

impl Instance {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> Option<&geojson::Geometry> {
        self.region.as_ref()
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Deliveries in arrival order.
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn delivery(&self, index: usize) -> &Delivery {
        &self.deliveries[index]
    }

    /// Arrival index of a delivery id.
    pub fn delivery_index(&self, id: &str) -> Option<usize> {
        self.delivery_index.get(id).copied()
    }

    pub fn hubs(&self) -> &HubSites {
        &self.hubs
    }

    /// Fixed depots, or the candidate sites of a hub placement instance.
    pub fn depots(&self) -> &[Point] {
        self.hubs.points()
    }

    /// Task implied by the instance alone. Incremental instances look like
    /// regular ones, the solution or the caller tells them apart.
    pub fn default_task(&self) -> TaskKind {
        match self.hubs {
            HubSites::Fixed(_) => TaskKind::Cvrp,
            HubSites::Candidates(_) => TaskKind::HubPlacement,
        }
    }

    pub fn total_demand(&self) -> f64 {
        self.deliveries.iter().map(Delivery::size).sum()
    }

    pub fn max_size(&self) -> f64 {
        self.deliveries
            .iter()
            .map(Delivery::size)
            .fold(0.0, f64::max)
    }
}
