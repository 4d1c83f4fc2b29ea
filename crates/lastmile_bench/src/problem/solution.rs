use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Point, task::TaskKind};

/// Routes submitted for one instance.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct Solution {
    /// Name of the instance this solution answers
    pub instance: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskKind>,

    /// Hubs chosen by a hub placement solution, defaults to the vehicle origins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hubs: Option<Vec<Point>>,

    pub vehicles: Vec<SolutionVehicle>,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct SolutionVehicle {
    /// Depot the route starts from and returns to
    pub origin: Point,

    /// Delivery ids in visiting order
    pub deliveries: Vec<String>,
}

impl Solution {
    pub fn new(instance: impl Into<String>, vehicles: Vec<SolutionVehicle>) -> Self {
        Solution {
            instance: instance.into(),
            task: None,
            hubs: None,
            vehicles,
        }
    }

    pub fn with_task(self, task: TaskKind) -> Self {
        Solution {
            task: Some(task),
            ..self
        }
    }

    pub fn with_hubs(self, hubs: Vec<Point>) -> Self {
        Solution {
            hubs: Some(hubs),
            ..self
        }
    }

    /// Vehicles with at least one delivery.
    pub fn num_vehicles(&self) -> usize {
        self.vehicles
            .iter()
            .filter(|vehicle| !vehicle.deliveries.is_empty())
            .count()
    }

    /// Hubs the solution uses: the declared ones, or else the distinct origins
    /// in order of first use.
    pub fn hub_set(&self) -> Vec<Point> {
        if let Some(hubs) = &self.hubs {
            return hubs.clone();
        }

        let mut hubs: Vec<Point> = vec![];
        for vehicle in &self.vehicles {
            if !hubs.iter().any(|hub| hub.same_location(&vehicle.origin)) {
                hubs.push(vehicle.origin);
            }
        }
        hubs
    }
}

impl SolutionVehicle {
    pub fn new(origin: Point, deliveries: Vec<String>) -> Self {
        SolutionVehicle { origin, deliveries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_set_defaults_to_origins() {
        let a = Point::new(1.0, 1.0);
        let b = Point::new(2.0, 2.0);
        let solution = Solution::new(
            "i",
            vec![
                SolutionVehicle::new(a, vec!["1".into()]),
                SolutionVehicle::new(b.with_node(3), vec![]),
                SolutionVehicle::new(a, vec!["2".into()]),
            ],
        );

        assert_eq!(solution.hub_set(), vec![a, b.with_node(3)]);
        assert_eq!(solution.num_vehicles(), 2);
        assert_eq!(solution.clone().with_hubs(vec![b]).hub_set(), vec![b]);
    }

    #[test]
    fn test_parse_solution() {
        let json = r#"{
            "instance": "cvrp-0-df-0",
            "vehicles": [
                { "origin": { "lat": -15.8, "lng": -47.9 }, "deliveries": ["a", "b"] }
            ]
        }"#;

        let solution: Solution = serde_json::from_str(json).unwrap();

        assert_eq!(solution.task, None);
        assert_eq!(solution.vehicles[0].deliveries, vec!["a", "b"]);
        assert_eq!(solution.vehicles[0].origin.node, None);
    }
}
