use fxhash::FxHashMap;
use lastmile_routing::{error::RoutingError, point::Point};
use rand::{SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{
    problem::instance::Instance,
    simulation::{
        Placement,
        router::{IncrementalRouter, RouterView},
    },
};

use super::greedy::new_route;

const MAX_ITERATIONS: usize = 100;

fn squared_distance(a: &(f64, f64), b: &(f64, f64)) -> f64 {
    (a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)
}

fn nearest(centroids: &[(f64, f64)], point: &(f64, f64)) -> usize {
    centroids
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            squared_distance(a, point).total_cmp(&squared_distance(b, point))
        })
        .map(|(index, _)| index)
        .unwrap_or(0)
}

/// Lloyd's k-means on (lat, lng), seeded with `num_clusters` distinct points.
pub fn kmeans(points: &[(f64, f64)], num_clusters: usize, seed: u64) -> Vec<(f64, f64)> {
    let num_clusters = num_clusters.min(points.len());
    if num_clusters == 0 {
        return vec![];
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids: Vec<(f64, f64)> =
        rand::seq::index::sample(&mut rng, points.len(), num_clusters)
            .into_iter()
            .map(|index| points[index])
            .collect();
    let mut assignment = vec![usize::MAX; points.len()];

    for iteration in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (point, cluster) in points.iter().zip(assignment.iter_mut()) {
            let closest = nearest(&centroids, point);
            if *cluster != closest {
                *cluster = closest;
                changed = true;
            }
        }

        if !changed {
            debug!(iteration, "k-means converged");
            break;
        }

        let mut sums = vec![(0.0, 0.0, 0usize); num_clusters];
        for (point, &cluster) in points.iter().zip(&assignment) {
            sums[cluster].0 += point.0;
            sums[cluster].1 += point.1;
            sums[cluster].2 += 1;
        }

        // An empty cluster keeps its centroid
        for (centroid, &(lat, lng, count)) in centroids.iter_mut().zip(&sums) {
            if count > 0 {
                *centroid = (lat / count as f64, lng / count as f64);
            }
        }
    }

    centroids
}

/// Splits the region into zones learned from past instances and keeps one
/// open route per zone. An arriving delivery joins the route of its zone, a
/// zone whose route is full starts a new one.
pub struct ClusterRouter {
    centroids: Vec<(f64, f64)>,
    zone_routes: FxHashMap<usize, usize>,
}

impl ClusterRouter {
    pub fn new(centroids: Vec<(f64, f64)>) -> Self {
        ClusterRouter {
            centroids,
            zone_routes: FxHashMap::default(),
        }
    }

    /// Learns `num_clusters` zones from the deliveries of `history`.
    pub fn pretrain(history: &[Instance], num_clusters: usize, seed: u64) -> Self {
        let points: Vec<(f64, f64)> = history
            .iter()
            .flat_map(|instance| instance.deliveries())
            .map(|delivery| (delivery.point().lat, delivery.point().lng))
            .collect();

        debug!(
            points = points.len(),
            num_clusters, "Training delivery zones"
        );

        ClusterRouter::new(kmeans(&points, num_clusters, seed))
    }

    pub fn centroids(&self) -> &[(f64, f64)] {
        &self.centroids
    }

    fn zone(&self, point: &Point) -> usize {
        nearest(&self.centroids, &(point.lat, point.lng))
    }
}

impl IncrementalRouter for ClusterRouter {
    fn name(&self) -> &str {
        "cluster"
    }

    fn place(&mut self, view: &RouterView<'_>) -> Result<Placement, RoutingError> {
        let zone = self.zone(view.current().point());
        zone_placement(&mut self.zone_routes, zone, view)
    }
}

/// Appends the current delivery to the open route of `zone` when it fits,
/// otherwise opens a new route that becomes the zone's open route.
pub(crate) fn zone_placement(
    zone_routes: &mut FxHashMap<usize, usize>,
    zone: usize,
    view: &RouterView<'_>,
) -> Result<Placement, RoutingError> {
    // First delivery of a new instance
    if view.routes().is_empty() {
        zone_routes.clear();
    }

    if let Some(&route) = zone_routes.get(&zone) {
        if view.routes()[route].load() + view.current().size() <= view.capacity() {
            return Ok(Placement::Append { route });
        }
    }

    let (_, depot) = new_route(view)?;
    zone_routes.insert(zone, view.routes().len());

    Ok(Placement::NewRoute { depot })
}
