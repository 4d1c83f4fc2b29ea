use fxhash::FxHashMap;
use lastmile_routing::{oracle::DistanceOracle, point::Point};
use tracing::debug;

use crate::problem::{
    delivery::Delivery,
    instance::{HubSites, Instance},
};

use super::error::GenerationError;

#[derive(Default)]
pub struct InstanceBuilder {
    name: Option<String>,
    region: Option<geojson::Geometry>,
    capacity: Option<f64>,
    deliveries: Vec<Delivery>,
    hubs: Option<HubSites>,
}

impl InstanceBuilder {
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut InstanceBuilder {
        self.name = Some(name.into());
        self
    }

    pub fn set_region(&mut self, region: geojson::Geometry) -> &mut InstanceBuilder {
        self.region = Some(region);
        self
    }

    pub fn set_capacity(&mut self, capacity: f64) -> &mut InstanceBuilder {
        self.capacity = Some(capacity);
        self
    }

    /// Deliveries arrive in the order they are added.
    pub fn add_delivery(
        &mut self,
        id: impl Into<String>,
        point: Point,
        size: f64,
    ) -> &mut InstanceBuilder {
        let arrival_index = self.deliveries.len();
        self.deliveries
            .push(Delivery::new(id, point, size, arrival_index));
        self
    }

    pub fn set_deliveries(&mut self, deliveries: Vec<Delivery>) -> &mut InstanceBuilder {
        self.deliveries = deliveries;
        self
    }

    pub fn set_origin(&mut self, origin: Point) -> &mut InstanceBuilder {
        self.hubs = Some(HubSites::Fixed(vec![origin]));
        self
    }

    pub fn set_depots(&mut self, depots: Vec<Point>) -> &mut InstanceBuilder {
        self.hubs = Some(HubSites::Fixed(depots));
        self
    }

    /// Turns the instance into a hub placement instance.
    pub fn set_hub_candidates(&mut self, candidates: Vec<Point>) -> &mut InstanceBuilder {
        self.hubs = Some(HubSites::Candidates(candidates));
        self
    }

    /// Pins every delivery and hub to its road network node before building, so
    /// later distance lookups never snap again.
    pub fn build_on_network(mut self, oracle: &DistanceOracle) -> Result<Instance, GenerationError> {
        for delivery in &mut self.deliveries {
            let point = oracle.snap(delivery.point())?;
            delivery.set_point(point);
        }

        self.hubs = match self.hubs.take() {
            Some(HubSites::Fixed(points)) => Some(HubSites::Fixed(snap_all(oracle, &points)?)),
            Some(HubSites::Candidates(points)) => {
                Some(HubSites::Candidates(snap_all(oracle, &points)?))
            }
            None => None,
        };

        self.build()
    }

    pub fn build(self) -> Result<Instance, GenerationError> {
        let capacity = self.capacity.unwrap_or(0.0);
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(GenerationError::InvalidCapacity(capacity));
        }

        let hubs = match self.hubs {
            Some(hubs) if !hubs.points().is_empty() => hubs,
            _ => return Err(GenerationError::NoDepot),
        };

        if let Some(hub) = hubs.points().iter().find(|hub| !hub.is_valid()) {
            return Err(GenerationError::InvalidPoint(*hub));
        }

        let mut deliveries = self.deliveries;
        let mut delivery_index = FxHashMap::default();

        for (arrival_index, delivery) in deliveries.iter_mut().enumerate() {
            if !delivery.point().is_valid() {
                return Err(GenerationError::InvalidPoint(*delivery.point()));
            }

            let size = delivery.size();
            if !size.is_finite() || size <= 0.0 {
                return Err(GenerationError::InvalidSize {
                    id: delivery.id().to_owned(),
                    size,
                });
            }

            if size > capacity {
                return Err(GenerationError::OversizedDemand {
                    id: delivery.id().to_owned(),
                    size,
                    capacity,
                });
            }

            if delivery_index
                .insert(delivery.id().to_owned(), arrival_index)
                .is_some()
            {
                return Err(GenerationError::DuplicateDelivery(delivery.id().to_owned()));
            }

            delivery.set_arrival_index(arrival_index);
        }

        let name = self.name.unwrap_or_default();
        debug!(
            name = %name,
            deliveries = deliveries.len(),
            hubs = hubs.points().len(),
            "Built instance"
        );

        Ok(Instance {
            name,
            region: self.region,
            capacity,
            deliveries,
            hubs,
            delivery_index,
        })
    }
}

fn snap_all(oracle: &DistanceOracle, points: &[Point]) -> Result<Vec<Point>, GenerationError> {
    points
        .iter()
        .map(|point| oracle.snap(point).map_err(GenerationError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{problem::task::TaskKind, test_utils::cycle_oracle};

    use super::*;

    fn valid_builder() -> InstanceBuilder {
        let mut builder = InstanceBuilder::default();
        builder
            .set_name("instance")
            .set_capacity(10.0)
            .set_origin(Point::new(0.0, 0.0))
            .add_delivery("a", Point::new(0.0, 0.01), 4.0)
            .add_delivery("b", Point::new(0.0, 0.02), 6.0);
        builder
    }

    #[test]
    fn test_build() {
        let instance = valid_builder().build().unwrap();

        assert_eq!(instance.name(), "instance");
        assert_eq!(instance.capacity(), 10.0);
        assert_eq!(instance.deliveries().len(), 2);
        assert_eq!(instance.delivery_index("b"), Some(1));
        assert_eq!(instance.delivery(1).arrival_index(), 1);
        assert_eq!(instance.default_task(), TaskKind::Cvrp);
        assert_eq!(instance.total_demand(), 10.0);
    }

    #[test]
    fn test_delivery_at_capacity_is_accepted() {
        let mut builder = valid_builder();
        builder.add_delivery("c", Point::new(0.0, 0.03), 10.0);

        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_oversized_demand() {
        let mut builder = valid_builder();
        builder.add_delivery("c", Point::new(0.0, 0.03), 10.000001);

        assert!(matches!(
            builder.build(),
            Err(GenerationError::OversizedDemand { id, .. }) if id == "c"
        ));
    }

    #[test]
    fn test_duplicate_delivery() {
        let mut builder = valid_builder();
        builder.add_delivery("a", Point::new(0.0, 0.03), 1.0);

        assert!(matches!(
            builder.build(),
            Err(GenerationError::DuplicateDelivery(id)) if id == "a"
        ));
    }

    #[test]
    fn test_requires_depot_and_capacity() {
        let mut builder = valid_builder();
        builder.set_depots(vec![]);
        assert!(matches!(builder.build(), Err(GenerationError::NoDepot)));

        let mut builder = valid_builder();
        builder.set_hub_candidates(vec![]);
        assert!(matches!(builder.build(), Err(GenerationError::NoDepot)));

        let mut builder = valid_builder();
        builder.set_capacity(0.0);
        assert!(matches!(
            builder.build(),
            Err(GenerationError::InvalidCapacity(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_size() {
        let mut builder = valid_builder();
        builder.add_delivery("c", Point::new(0.0, 0.03), 0.0);

        assert!(matches!(
            builder.build(),
            Err(GenerationError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_hub_candidates() {
        let mut builder = valid_builder();
        builder.set_hub_candidates(vec![Point::new(0.0, 0.0), Point::new(0.0, 0.02)]);
        let instance = builder.build().unwrap();

        assert_eq!(instance.default_task(), TaskKind::HubPlacement);
        assert!(matches!(instance.hubs(), HubSites::Candidates(points) if points.len() == 2));
    }

    #[test]
    fn test_build_on_network_pins_nodes() {
        let oracle = cycle_oracle();
        let instance = valid_builder().build_on_network(&oracle).unwrap();

        assert_eq!(instance.depots()[0].node, Some(0));
        assert_eq!(instance.delivery(0).point().node, Some(1));
        assert_eq!(instance.delivery(1).point().node, Some(2));
        assert_eq!(instance.delivery(1).point().lng, 0.02);
    }

    #[test]
    fn test_build_on_network_unresolved_point() {
        let oracle = cycle_oracle();
        let mut builder = valid_builder();
        builder.add_delivery("far", Point::new(10.0, 10.0), 1.0);

        assert!(matches!(
            builder.build_on_network(&oracle),
            Err(GenerationError::Routing(_))
        ));
    }
}
