use crate::edge_direction::EdgeDirection;

#[derive(Debug, Clone)]
pub struct GraphEdge {
    id: usize,
    start_node: usize,
    end_node: usize,
    /// Length in meters
    distance: f64,
    oneway: bool,
    speed_kmh: Option<f64>,
}

impl GraphEdge {
    pub fn new(
        id: usize,
        start_node: usize,
        end_node: usize,
        distance: f64,
        oneway: bool,
        speed_kmh: Option<f64>,
    ) -> Self {
        GraphEdge {
            id,
            start_node,
            end_node,
            distance,
            oneway,
            speed_kmh,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn start_node(&self) -> usize {
        self.start_node
    }

    pub fn end_node(&self) -> usize {
        self.end_node
    }

    pub fn is_oneway(&self) -> bool {
        self.oneway
    }

    pub fn speed_kmh(&self) -> Option<f64> {
        self.speed_kmh
    }

    pub fn adj_node(&self, node: usize) -> usize {
        if self.start_node == node {
            self.end_node
        } else {
            self.start_node
        }
    }
}

pub trait Graph {
    type EdgeIterator<'a>: Iterator<Item = usize>
    where
        Self: 'a;

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    fn node_edges_iter(&self, node: usize) -> Self::EdgeIterator<'_>;

    fn edge(&self, edge: usize) -> &GraphEdge;

    fn node_geometry(&self, node: usize) -> &geo::Point;

    fn edge_direction(&self, edge_id: usize, start: usize) -> EdgeDirection {
        let edge = self.edge(edge_id);

        if edge.start_node() == start {
            return EdgeDirection::Forward;
        }

        if edge.end_node() == start {
            return EdgeDirection::Backward;
        }

        panic!(
            "Node {} is neither the start nor the end of edge {}",
            start, edge_id
        )
    }
}
