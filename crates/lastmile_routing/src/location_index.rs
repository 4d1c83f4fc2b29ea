use rstar::{RTree, primitives::GeomWithData};
use tracing::debug;

use crate::{constants::SNAP_CANDIDATES, graph::Graph, point::Point};

type LocationIndexObject = GeomWithData<[f64; 2], usize>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    pub node: usize,
    /// Haversine distance in meters between the query and the node
    pub distance: f64,
}

/// Spatial index over the network nodes, stored as `[lng, lat]`.
pub struct LocationIndex {
    tree: RTree<LocationIndexObject>,
}

impl LocationIndex {
    pub fn build_from_graph(graph: &impl Graph) -> LocationIndex {
        debug!("Building location index");

        let tree = RTree::bulk_load(
            (0..graph.node_count())
                .map(|node| {
                    let point = graph.node_geometry(node);
                    LocationIndexObject::new([point.x(), point.y()], node)
                })
                .collect(),
        );

        debug!("Finished building location index");

        LocationIndex { tree }
    }

    /// Closest node within `max_distance` meters. The R-tree works in degrees,
    /// so a handful of neighbours are re-ranked by haversine distance, ties going
    /// to the lowest node index.
    pub fn snap(&self, point: &Point, max_distance: f64) -> Option<Snap> {
        self.tree
            .nearest_neighbor_iter(&[point.lng, point.lat])
            .take(SNAP_CANDIDATES)
            .map(|candidate| {
                let [lng, lat] = *candidate.geom();
                Snap {
                    node: candidate.data,
                    distance: point.haversine_distance(&Point::new(lat, lng)),
                }
            })
            .min_by(|a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then_with(|| a.node.cmp(&b.node))
            })
            .filter(|snap| snap.distance <= max_distance)
    }
}
