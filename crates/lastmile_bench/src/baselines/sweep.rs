use fxhash::FxHashMap;
use lastmile_routing::{error::RoutingError, point::Point};
use tracing::debug;

use crate::{
    problem::instance::Instance,
    simulation::{
        Placement,
        router::{IncrementalRouter, RouterView},
    },
};

use super::cluster::zone_placement;

/// Polar angle of `point` seen from `center`, in (-pi, pi].
fn angle(center: &Point, point: &Point) -> f64 {
    (point.lat - center.lat).atan2(point.lng - center.lng)
}

/// Cuts the plane around the depot into angular sectors holding the same
/// number of past deliveries, and keeps one open route per sector.
pub struct SweepRouter {
    /// Lower angle of every sector but the first, ascending
    boundaries: Vec<f64>,
    sector_routes: FxHashMap<usize, usize>,
}

impl SweepRouter {
    pub fn new(boundaries: Vec<f64>) -> Self {
        SweepRouter {
            boundaries,
            sector_routes: FxHashMap::default(),
        }
    }

    /// Learns `num_sectors` sectors from the deliveries of `history`, each
    /// seen from the first depot of its instance.
    pub fn pretrain(history: &[Instance], num_sectors: usize) -> Self {
        let mut angles: Vec<f64> = history
            .iter()
            .filter_map(|instance| instance.depots().first().map(|depot| (instance, depot)))
            .flat_map(|(instance, depot)| {
                instance
                    .deliveries()
                    .iter()
                    .map(move |delivery| angle(depot, delivery.point()))
            })
            .collect();
        angles.sort_by(f64::total_cmp);

        let mut boundaries: Vec<f64> = if angles.is_empty() {
            vec![]
        } else {
            (1..num_sectors)
                .map(|sector| angles[sector * angles.len() / num_sectors])
                .collect()
        };
        boundaries.dedup();

        debug!(
            deliveries = angles.len(),
            sectors = boundaries.len() + 1,
            "Training sweep sectors"
        );

        SweepRouter::new(boundaries)
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    fn sector(&self, center: &Point, point: &Point) -> usize {
        let angle = angle(center, point);
        self.boundaries.partition_point(|&boundary| boundary <= angle)
    }
}

impl IncrementalRouter for SweepRouter {
    fn name(&self) -> &str {
        "sweep"
    }

    fn place(&mut self, view: &RouterView<'_>) -> Result<Placement, RoutingError> {
        let sector = match view.depots().first() {
            Some(center) => self.sector(center, view.current().point()),
            None => 0,
        };

        zone_placement(&mut self.sector_routes, sector, view)
    }
}
