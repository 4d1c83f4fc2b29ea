use std::sync::Arc;

use fxhash::FxHashMap;
use parking_lot::RwLock;
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{
    constants::DEFAULT_MAX_SNAP_DISTANCE_METERS,
    dijkstra::{Dijkstra, ShortestPathTree},
    error::RoutingError,
    location_index::LocationIndex,
    matrix::DistanceMatrix,
    point::Point,
    road_network::RoadNetwork,
    stopwatch::Stopwatch,
    weighting::{Metric, Weighting},
};

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy)]
#[serde(default)]
pub struct DistanceOracleParams {
    pub metric: Metric,

    /// Points without a node id further than this many meters from every
    /// network node do not resolve
    pub max_snap_distance: f64,
}

impl Default for DistanceOracleParams {
    fn default() -> Self {
        DistanceOracleParams {
            metric: Metric::Distance,
            max_snap_distance: DEFAULT_MAX_SNAP_DISTANCE_METERS,
        }
    }
}

/// Shortest travel distance (or time) between points on a road network.
///
/// One shortest path tree is computed per distinct source node and kept for
/// the lifetime of the oracle. Trees are only ever added to the memo, never
/// replaced, so every reader sees the same value for a source.
pub struct DistanceOracle {
    network: Arc<RoadNetwork>,
    index: LocationIndex,
    weighting: Box<dyn Weighting>,
    params: DistanceOracleParams,
    trees: RwLock<FxHashMap<usize, Arc<ShortestPathTree>>>,
}

impl DistanceOracle {
    pub fn new(network: Arc<RoadNetwork>, params: DistanceOracleParams) -> Self {
        let index = LocationIndex::build_from_graph(network.as_ref());
        let weighting = params.metric.weighting(network.default_speed_kmh());

        DistanceOracle {
            network,
            index,
            weighting,
            params,
            trees: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn metric(&self) -> Metric {
        self.params.metric
    }

    /// Number of memoised shortest path trees.
    pub fn cached_trees(&self) -> usize {
        self.trees.read().len()
    }

    /// Internal node index a point resolves to, either through its node id or by
    /// snapping its coordinates to the closest node.
    pub fn resolve(&self, point: &Point) -> Result<usize, RoutingError> {
        let node = match point.node {
            Some(id) => self.network.node_index(id),
            None => self
                .index
                .snap(point, self.params.max_snap_distance)
                .map(|snap| snap.node),
        };

        node.ok_or(RoutingError::UnresolvedPoint(*point))
    }

    /// Same coordinates, annotated with the id of the node the point resolves to.
    pub fn snap(&self, point: &Point) -> Result<Point, RoutingError> {
        let node = self.resolve(point)?;
        Ok(point.with_node(self.network.node_id(node)))
    }

    pub fn distance(&self, from: &Point, to: &Point) -> Result<f64, RoutingError> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;

        if source == target {
            return Ok(0.0);
        }

        let tree = self.tree(source);
        match tree.weight(target) {
            Some(weight) => Ok(self.weighting.weight_to_value(weight)),
            None => Err(self.unreachable(from, to)),
        }
    }

    /// Directed matrix over `points`, row `i` holding the distances from `points[i]`.
    #[instrument(skip_all, fields(points = points.len()), level = "debug")]
    pub fn matrix(&self, points: &[Point]) -> Result<DistanceMatrix, RoutingError> {
        let stopwatch = Stopwatch::new("distance matrix");

        let nodes = points
            .iter()
            .map(|point| self.resolve(point))
            .collect::<Result<Vec<usize>, RoutingError>>()?;

        self.compute_missing_trees(&nodes);

        let trees = self.trees.read();
        let size = points.len();
        let mut values = Vec::with_capacity(size * size);

        for (from, &source) in nodes.iter().enumerate() {
            // Every source was published above and the memo never shrinks
            let tree = &trees[&source];

            for (to, &target) in nodes.iter().enumerate() {
                if source == target {
                    values.push(0.0);
                    continue;
                }

                match tree.weight(target) {
                    Some(weight) => values.push(self.weighting.weight_to_value(weight)),
                    None => return Err(self.unreachable(&points[from], &points[to])),
                }
            }
        }

        stopwatch.report();

        Ok(DistanceMatrix::new(size, values))
    }

    /// Computes the trees of every point up front so that later `distance`
    /// calls are lookups.
    pub fn prepare(&self, points: &[Point]) -> Result<(), RoutingError> {
        let nodes = points
            .iter()
            .map(|point| self.resolve(point))
            .collect::<Result<Vec<usize>, RoutingError>>()?;

        self.compute_missing_trees(&nodes);

        Ok(())
    }

    fn tree(&self, source: usize) -> Arc<ShortestPathTree> {
        if let Some(tree) = self.trees.read().get(&source) {
            return tree.clone();
        }

        let mut dijkstra = Dijkstra::new(self.network.as_ref());
        let tree = dijkstra.calc_tree(self.network.as_ref(), self.weighting.as_ref(), source);

        self.trees
            .write()
            .entry(source)
            .or_insert_with(|| Arc::new(tree))
            .clone()
    }

    /// Runs the missing single source searches in parallel and publishes all
    /// of them at once.
    fn compute_missing_trees(&self, nodes: &[usize]) {
        let mut missing: Vec<usize> = {
            let trees = self.trees.read();
            nodes
                .iter()
                .copied()
                .filter(|node| !trees.contains_key(node))
                .collect()
        };
        missing.sort_unstable();
        missing.dedup();

        if missing.is_empty() {
            return;
        }

        debug!(sources = missing.len(), "Computing shortest path trees");

        let network = self.network.as_ref();
        let weighting = self.weighting.as_ref();
        let computed: Vec<ShortestPathTree> = missing
            .par_iter()
            .map_init(
                || Dijkstra::new(network),
                |dijkstra, &source| dijkstra.calc_tree(network, weighting, source),
            )
            .collect();

        let mut trees = self.trees.write();
        for tree in computed {
            trees
                .entry(tree.source())
                .or_insert_with(|| Arc::new(tree));
        }
    }

    fn unreachable(&self, from: &Point, to: &Point) -> RoutingError {
        warn!(%from, %to, "No path between points");
        RoutingError::UnreachablePoint {
            from: *from,
            to: *to,
        }
    }
}
