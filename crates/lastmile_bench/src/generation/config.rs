use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context;
use lastmile_routing::{oracle::DistanceOracle, oracle::DistanceOracleParams, point::Point};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::problem::instance::Instance;

use super::{
    demand_sampler::{DemandSampler, SamplerParams, SizeDistribution},
    error::GenerationError,
    instance_builder::InstanceBuilder,
    region::Region,
};

fn default_max_attempts_per_point() -> usize {
    SamplerParams::default().max_attempts_per_point
}

/// Batch generation settings. Relative paths are resolved against the folder
/// of the config file.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Instance names are `{name}-{index}`
    pub name: String,

    /// Region file with the boundary and the demand density
    pub region: PathBuf,

    /// Road network the instances are pinned to
    #[serde(default)]
    pub network: Option<PathBuf>,

    #[serde(default)]
    pub oracle: DistanceOracleParams,

    pub num_instances: usize,
    pub deliveries_per_instance: usize,
    pub capacity: f64,

    /// Seed of the whole batch, every instance derives its own from it
    pub seed: u64,

    #[serde(default)]
    pub sizes: SizeDistribution,

    #[serde(default)]
    pub origin: Option<Point>,

    #[serde(default)]
    pub hub_candidates: Option<Vec<Point>>,

    #[serde(default = "default_max_attempts_per_point")]
    pub max_attempts_per_point: usize,
}

impl GenerationConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config {}", path.display()))?;
        let mut config: GenerationConfig = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        if let Some(folder) = path.parent() {
            config.region = folder.join(&config.region);
            config.network = config.network.map(|network| folder.join(network));
        }

        Ok(config)
    }

    /// One seed per instance, drawn up front so that instance `i` does not
    /// depend on how the batch is scheduled.
    pub fn instance_seeds(&self) -> Vec<u64> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.num_instances).map(|_| rng.random()).collect()
    }

    pub fn instance_name(&self, index: usize) -> String {
        format!("{}-{}", self.name, index)
    }
}

/// Result of generating one instance of a batch.
pub struct GeneratedInstance {
    pub name: String,
    pub result: Result<Instance, GenerationError>,
}

/// Generates every instance of the batch in parallel. A failed instance is
/// logged and reported, the others are unaffected.
#[instrument(skip_all, fields(name = %config.name), level = "debug")]
pub fn generate_instances(
    config: &GenerationConfig,
    region: &Region,
    oracle: Option<&DistanceOracle>,
) -> Vec<GeneratedInstance> {
    let seeds = config.instance_seeds();

    let generated: Vec<GeneratedInstance> = seeds
        .par_iter()
        .enumerate()
        .map(|(index, &seed)| {
            let name = config.instance_name(index);
            let result = generate_instance(config, region, oracle, &name, seed);

            if let Err(err) = &result {
                warn!(%name, "Failed to generate instance: {}", err);
            }

            GeneratedInstance { name, result }
        })
        .collect();

    info!(
        generated = generated.iter().filter(|instance| instance.result.is_ok()).count(),
        failed = generated.iter().filter(|instance| instance.result.is_err()).count(),
        "Generated instances"
    );

    generated
}

pub fn generate_instance(
    config: &GenerationConfig,
    region: &Region,
    oracle: Option<&DistanceOracle>,
    name: &str,
    seed: u64,
) -> Result<Instance, GenerationError> {
    let sampler = DemandSampler::new(region)?;
    let params = SamplerParams {
        seed,
        id_prefix: name.to_owned(),
        sizes: config.sizes.clone(),
        max_attempts_per_point: config.max_attempts_per_point,
    };
    let deliveries = sampler.sample(&params, config.deliveries_per_instance)?;

    let mut builder = InstanceBuilder::default();
    builder
        .set_name(name)
        .set_region(region.boundary_geojson())
        .set_capacity(config.capacity)
        .set_deliveries(deliveries);

    match (&config.hub_candidates, config.origin) {
        (Some(candidates), _) => builder.set_hub_candidates(candidates.clone()),
        (None, Some(origin)) => builder.set_origin(origin),
        (None, None) => return Err(GenerationError::NoDepot),
    };

    match oracle {
        Some(oracle) => builder.build_on_network(oracle),
        None => builder.build(),
    }
}
