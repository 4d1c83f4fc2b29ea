use std::{
    fs::File,
    hash::Hasher,
    io::BufReader,
    path::Path,
};

use fxhash::{FxHashMap, FxHasher64};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    constants::DEFAULT_SPEED_KMH, error::RoutingError, graph::Graph, graph::GraphEdge,
    point::Point,
};

/// On-disk description of a street network snapshot.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Default)]
#[serde(deny_unknown_fields, rename = "RoadNetwork")]
pub struct RoadNetworkFile {
    /// Speed used by the time metric on edges without their own speed
    pub default_speed_kmh: Option<f64>,
    pub nodes: Vec<RoadNode>,
    pub edges: Vec<RoadEdge>,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct RoadNode {
    pub id: u64,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct RoadEdge {
    pub from: u64,
    pub to: u64,

    /// Length in meters, defaults to the haversine length between both ends
    pub distance: Option<f64>,

    /// One-way edges can only be traversed from `from` to `to`
    #[serde(default)]
    pub oneway: bool,

    pub speed_kmh: Option<f64>,
}

/// Immutable street graph. Nodes are indexed in ascending external id order so
/// that internal index comparisons follow node id order.
pub struct RoadNetwork {
    node_ids: Vec<u64>,
    node_index: FxHashMap<u64, usize>,
    coordinates: Vec<geo::Point>,
    edges: Vec<GraphEdge>,
    adjacency_list: Vec<Vec<usize>>,
    default_speed_kmh: f64,
    has_oneway_edges: bool,
    fingerprint: u64,
}

impl RoadNetwork {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RoadNetwork, RoutingError> {
        let file = File::open(path)?;
        let network_file: RoadNetworkFile = serde_json::from_reader(BufReader::new(file))?;
        RoadNetwork::from_network_file(network_file)
    }

    pub fn from_json(json: &str) -> Result<RoadNetwork, RoutingError> {
        let network_file: RoadNetworkFile = serde_json::from_str(json)?;
        RoadNetwork::from_network_file(network_file)
    }

    #[instrument(skip_all, level = "debug")]
    pub fn from_network_file(file: RoadNetworkFile) -> Result<RoadNetwork, RoutingError> {
        let mut nodes = file.nodes;
        nodes.sort_by_key(|node| node.id);

        if let Some(duplicate) = nodes.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(RoutingError::InvalidNetwork(format!(
                "duplicate node id {}",
                duplicate[0].id
            )));
        }

        if let Some(node) = nodes
            .iter()
            .find(|node| !Point::new(node.lat, node.lng).is_valid())
        {
            return Err(RoutingError::InvalidNetwork(format!(
                "node {} has invalid coordinates",
                node.id
            )));
        }

        let default_speed_kmh = file.default_speed_kmh.unwrap_or(DEFAULT_SPEED_KMH);
        if !default_speed_kmh.is_finite() || default_speed_kmh <= 0.0 {
            return Err(RoutingError::InvalidNetwork(format!(
                "default speed must be positive, got {}",
                default_speed_kmh
            )));
        }

        let node_ids: Vec<u64> = nodes.iter().map(|node| node.id).collect();
        let node_index: FxHashMap<u64, usize> = node_ids
            .iter()
            .enumerate()
            .map(|(index, &id)| (id, index))
            .collect();
        let coordinates: Vec<geo::Point> = nodes
            .iter()
            .map(|node| geo::Point::new(node.lng, node.lat))
            .collect();

        let mut network = RoadNetwork {
            adjacency_list: vec![vec![]; node_ids.len()],
            node_ids,
            node_index,
            coordinates,
            edges: Vec::with_capacity(file.edges.len()),
            default_speed_kmh,
            has_oneway_edges: false,
            fingerprint: 0,
        };

        for edge in &file.edges {
            network.add_edge(edge)?;
        }

        network.fingerprint = network.compute_fingerprint();

        info!(
            nodes = network.node_count(),
            edges = network.edge_count(),
            oneway = network.has_oneway_edges,
            "Loaded road network"
        );

        Ok(network)
    }

    fn add_edge(&mut self, road_edge: &RoadEdge) -> Result<(), RoutingError> {
        let start_node = self.require_node(road_edge.from)?;
        let end_node = self.require_node(road_edge.to)?;

        let distance = match road_edge.distance {
            Some(distance) => distance,
            None => Point::from(self.coordinates[start_node])
                .haversine_distance(&Point::from(self.coordinates[end_node])),
        };

        if !distance.is_finite() || distance < 0.0 {
            return Err(RoutingError::InvalidNetwork(format!(
                "edge {} -> {} has invalid length {}",
                road_edge.from, road_edge.to, distance
            )));
        }

        let edge_id = self.edges.len();
        self.edges.push(GraphEdge::new(
            edge_id,
            start_node,
            end_node,
            distance,
            road_edge.oneway,
            road_edge.speed_kmh,
        ));
        self.has_oneway_edges |= road_edge.oneway;

        self.adjacency_list[start_node].push(edge_id);
        if start_node != end_node {
            self.adjacency_list[end_node].push(edge_id);
        }

        Ok(())
    }

    fn require_node(&self, id: u64) -> Result<usize, RoutingError> {
        self.node_index(id).ok_or_else(|| {
            RoutingError::InvalidNetwork(format!("edge references unknown node {}", id))
        })
    }

    fn compute_fingerprint(&self) -> u64 {
        let mut hasher = FxHasher64::default();

        hasher.write_usize(self.node_ids.len());
        for (id, point) in self.node_ids.iter().zip(&self.coordinates) {
            hasher.write_u64(*id);
            hasher.write_u64(point.x().to_bits());
            hasher.write_u64(point.y().to_bits());
        }

        hasher.write_usize(self.edges.len());
        for edge in &self.edges {
            hasher.write_usize(edge.start_node());
            hasher.write_usize(edge.end_node());
            hasher.write_u64(edge.distance().to_bits());
            hasher.write_u8(edge.is_oneway() as u8);
            hasher.write_u64(edge.speed_kmh().unwrap_or(0.0).to_bits());
        }
        hasher.write_u64(self.default_speed_kmh.to_bits());

        hasher.finish()
    }

    /// Internal index of an external node id.
    pub fn node_index(&self, id: u64) -> Option<usize> {
        self.node_index.get(&id).copied()
    }

    /// External id of an internal node index.
    pub fn node_id(&self, index: usize) -> u64 {
        self.node_ids[index]
    }

    pub fn node_point(&self, index: usize) -> Point {
        Point::from(self.coordinates[index]).with_node(self.node_ids[index])
    }

    pub fn default_speed_kmh(&self) -> f64 {
        self.default_speed_kmh
    }

    /// Without one-way edges every shortest path can be walked backwards.
    pub fn is_symmetric(&self) -> bool {
        !self.has_oneway_edges
    }

    /// Stable hash of the whole snapshot, used to key persisted matrices.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

impl Graph for RoadNetwork {
    type EdgeIterator<'a> = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn node_edges_iter(&self, node: usize) -> Self::EdgeIterator<'_> {
        self.adjacency_list[node].iter().copied()
    }

    fn edge(&self, edge: usize) -> &GraphEdge {
        &self.edges[edge]
    }

    fn node_geometry(&self, node: usize) -> &geo::Point {
        &self.coordinates[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETWORK: &str = r#"
{
    "nodes": [
        { "id": 30, "lat": 0.0, "lng": 0.002 },
        { "id": 10, "lat": 0.0, "lng": 0.0 },
        { "id": 20, "lat": 0.0, "lng": 0.001 }
    ],
    "edges": [
        { "from": 10, "to": 20, "distance": 100.0 },
        { "from": 20, "to": 30, "oneway": true }
    ]
}
"#;

    #[test]
    fn test_nodes_are_sorted_by_id() {
        let network = RoadNetwork::from_json(NETWORK).unwrap();

        assert_eq!(network.node_count(), 3);
        assert_eq!(network.node_id(0), 10);
        assert_eq!(network.node_id(1), 20);
        assert_eq!(network.node_id(2), 30);
        assert_eq!(network.node_index(30), Some(2));
        assert_eq!(network.node_index(40), None);
    }

    #[test]
    fn test_edge_length_defaults_to_haversine() {
        let network = RoadNetwork::from_json(NETWORK).unwrap();

        assert_eq!(network.edge(0).distance(), 100.0);
        // 0.001 degree of longitude at the equator
        assert!((network.edge(1).distance() - 111.195).abs() < 0.01);
        assert!(!network.is_symmetric());
    }

    #[test]
    fn test_rejects_unknown_node() {
        let json = r#"{ "nodes": [{ "id": 1, "lat": 0.0, "lng": 0.0 }], "edges": [{ "from": 1, "to": 2 }] }"#;

        assert!(matches!(
            RoadNetwork::from_json(json),
            Err(RoutingError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_node() {
        let json = r#"{ "nodes": [{ "id": 1, "lat": 0.0, "lng": 0.0 }, { "id": 1, "lat": 1.0, "lng": 0.0 }], "edges": [] }"#;

        assert!(matches!(
            RoadNetwork::from_json(json),
            Err(RoutingError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_rejects_negative_length() {
        let json = r#"{ "nodes": [{ "id": 1, "lat": 0.0, "lng": 0.0 }, { "id": 2, "lat": 1.0, "lng": 0.0 }], "edges": [{ "from": 1, "to": 2, "distance": -1.0 }] }"#;

        assert!(matches!(
            RoadNetwork::from_json(json),
            Err(RoutingError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = RoadNetwork::from_json(NETWORK).unwrap();
        let b = RoadNetwork::from_json(NETWORK).unwrap();

        assert_eq!(a.fingerprint(), b.fingerprint());
    }
}
