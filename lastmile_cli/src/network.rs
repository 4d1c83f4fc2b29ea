use std::{path::Path, sync::Arc};

use anyhow::Context;
use clap::ValueEnum;
use lastmile_routing::{
    cache::FileMatrixCache,
    graph::Graph,
    oracle::{DistanceOracle, DistanceOracleParams},
    road_network::RoadNetwork,
    weighting::Metric,
};
use tracing::{debug, info};

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum MetricArg {
    #[default]
    Distance,
    Time,
}

impl From<MetricArg> for Metric {
    fn from(metric: MetricArg) -> Self {
        match metric {
            MetricArg::Distance => Metric::Distance,
            MetricArg::Time => Metric::Time,
        }
    }
}

impl MetricArg {
    pub fn oracle_params(self) -> DistanceOracleParams {
        DistanceOracleParams {
            metric: self.into(),
            ..DistanceOracleParams::default()
        }
    }
}

pub fn load_oracle(
    path: &Path,
    params: DistanceOracleParams,
) -> Result<DistanceOracle, anyhow::Error> {
    let network = RoadNetwork::from_file(path)
        .with_context(|| format!("Failed to load road network {}", path.display()))?;

    info!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        "Loaded road network"
    );

    Ok(DistanceOracle::new(Arc::new(network), params))
}

/// Matrix cache of `LASTMILE_CACHE_FOLDER`, when set.
pub fn matrix_cache() -> Option<FileMatrixCache> {
    match FileMatrixCache::from_env() {
        Ok(cache) => Some(cache),
        Err(err) => {
            debug!("Matrix cache disabled: {}", err);
            None
        }
    }
}
