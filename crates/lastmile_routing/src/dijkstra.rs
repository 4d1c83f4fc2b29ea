use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::constants::MAX_WEIGHT;
use crate::graph::Graph;
use crate::weighting::{Weight, Weighting};

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
struct HeapItem {
    node_id: usize,
    weight: Weight,
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &HeapItem) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flip both keys to make this a min-heap, lower node index first on ties
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.node_id.cmp(&self.node_id))
    }
}

/// Shortest weights from one source node to every node of the graph.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source: usize,
    weights: Vec<Weight>,
}

impl ShortestPathTree {
    pub fn source(&self) -> usize {
        self.source
    }

    /// `None` when `target` is not reachable from the source.
    pub fn weight(&self, target: usize) -> Option<Weight> {
        match self.weights[target] {
            MAX_WEIGHT => None,
            weight => Some(weight),
        }
    }

    pub fn reached_count(&self) -> usize {
        self.weights
            .iter()
            .filter(|&&weight| weight != MAX_WEIGHT)
            .count()
    }
}

/// One-to-all Dijkstra. Heap ties are broken on the node index and edges are
/// only relaxed on strict improvement, so repeated runs settle nodes in the
/// same order.
pub struct Dijkstra {
    heap: BinaryHeap<HeapItem>,
    weights: Vec<Weight>,
    settled: Vec<bool>,
}

impl Dijkstra {
    pub fn new(graph: &impl Graph) -> Self {
        let node_count = graph.node_count();
        Dijkstra {
            heap: BinaryHeap::with_capacity(1024),
            weights: vec![MAX_WEIGHT; node_count],
            settled: vec![false; node_count],
        }
    }

    fn reset(&mut self) {
        self.heap.clear();
        self.weights.fill(MAX_WEIGHT);
        self.settled.fill(false);
    }

    pub fn calc_tree(
        &mut self,
        graph: &impl Graph,
        weighting: &dyn Weighting,
        source: usize,
    ) -> ShortestPathTree {
        self.reset();

        self.weights[source] = 0;
        self.heap.push(HeapItem {
            node_id: source,
            weight: 0,
        });

        while let Some(HeapItem { node_id, weight }) = self.heap.pop() {
            // Node is already settled, skip
            if self.settled[node_id] {
                continue;
            }

            // Stale heap entry
            if weight > self.weights[node_id] {
                continue;
            }

            self.settled[node_id] = true;

            for edge_id in graph.node_edges_iter(node_id) {
                let edge = graph.edge(edge_id);
                let adj_node = edge.adj_node(node_id);

                if self.settled[adj_node] {
                    continue;
                }

                let direction = graph.edge_direction(edge_id, node_id);
                let edge_weight = weighting.calc_edge_weight(edge, direction);

                if edge_weight == MAX_WEIGHT {
                    continue;
                }

                let next_weight = weight.saturating_add(edge_weight);

                if next_weight < self.weights[adj_node] {
                    self.weights[adj_node] = next_weight;
                    self.heap.push(HeapItem {
                        weight: next_weight,
                        node_id: adj_node,
                    });
                }
            }
        }

        ShortestPathTree {
            source,
            weights: self.weights.clone(),
        }
    }
}
