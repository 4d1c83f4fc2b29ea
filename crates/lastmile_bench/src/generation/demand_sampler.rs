use geo::{Contains, Intersects};
use lastmile_routing::point::Point;
use rand::{
    Rng, SeedableRng,
    distr::{Distribution, weighted::WeightedIndex},
    rngs::StdRng,
};
use rand_distr::LogNormal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::delivery::Delivery;

use super::{error::GenerationError, region::Region};

const DEFAULT_MAX_ATTEMPTS_PER_POINT: usize = 1000;

/// Parcel size model.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SizeDistribution {
    Constant { size: f64 },
    /// Uniform draw among historical parcel sizes
    Empirical { sizes: Vec<f64> },
    /// Log-normal sizes clamped to `[min, max]`
    LogNormal { mu: f64, sigma: f64, min: f64, max: f64 },
}

impl Default for SizeDistribution {
    fn default() -> Self {
        SizeDistribution::Constant { size: 1.0 }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

enum SizeSampler<'a> {
    Constant(f64),
    Empirical(&'a [f64]),
    LogNormal {
        distribution: LogNormal<f64>,
        min: f64,
        max: f64,
    },
}

impl SizeDistribution {
    fn sampler(&self) -> Result<SizeSampler<'_>, GenerationError> {
        match self {
            SizeDistribution::Constant { size } if is_positive(*size) => {
                Ok(SizeSampler::Constant(*size))
            }
            SizeDistribution::Empirical { sizes }
                if !sizes.is_empty() && sizes.iter().all(|size| is_positive(*size)) =>
            {
                Ok(SizeSampler::Empirical(sizes))
            }
            SizeDistribution::LogNormal {
                mu,
                sigma,
                min,
                max,
            } if is_positive(*min) && min <= max && max.is_finite() => {
                let distribution = LogNormal::new(*mu, *sigma)
                    .map_err(|err| GenerationError::InvalidDistribution(err.to_string()))?;

                Ok(SizeSampler::LogNormal {
                    distribution,
                    min: *min,
                    max: *max,
                })
            }
            _ => Err(GenerationError::InvalidDistribution(format!(
                "sizes must be positive and finite: {:?}",
                self
            ))),
        }
    }
}

impl SizeSampler<'_> {
    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match self {
            SizeSampler::Constant(size) => *size,
            SizeSampler::Empirical(sizes) => sizes[rng.random_range(0..sizes.len())],
            SizeSampler::LogNormal {
                distribution,
                min,
                max,
            } => distribution.sample(rng).clamp(*min, *max),
        }
    }
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(default)]
pub struct SamplerParams {
    pub seed: u64,

    /// Delivery ids are `{id_prefix}-{index:05}`
    pub id_prefix: String,
    pub sizes: SizeDistribution,

    /// Rejection sampling budget for a single location
    pub max_attempts_per_point: usize,
}

impl Default for SamplerParams {
    fn default() -> Self {
        SamplerParams {
            seed: 0,
            id_prefix: String::from("d"),
            sizes: SizeDistribution::default(),
            max_attempts_per_point: DEFAULT_MAX_ATTEMPTS_PER_POINT,
        }
    }
}

/// Draws delivery locations following the density cells of a region.
///
/// A cell is picked proportionally to its weight, then a point is drawn
/// uniformly inside the cell and kept only if it falls inside the boundary.
pub struct DemandSampler<'a> {
    region: &'a Region,
    cells: Vec<usize>,
    cell_index: WeightedIndex<f64>,
}

impl<'a> DemandSampler<'a> {
    pub fn new(region: &'a Region) -> Result<Self, GenerationError> {
        let cells: Vec<usize> = region
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.weight > 0.0 && region.boundary().intersects(&cell.bounds))
            .map(|(index, _)| index)
            .collect();

        if cells.is_empty() {
            return Err(GenerationError::EmptyRegion(region.name().to_owned()));
        }

        let cell_index = WeightedIndex::new(cells.iter().map(|&index| region.cells()[index].weight))
            .map_err(|_| GenerationError::EmptyRegion(region.name().to_owned()))?;

        Ok(DemandSampler {
            region,
            cells,
            cell_index,
        })
    }

    /// `count` deliveries in arrival order. The same params always give the same
    /// deliveries: locations and sizes come from one generator seeded with `params.seed`.
    pub fn sample(
        &self,
        params: &SamplerParams,
        count: usize,
    ) -> Result<Vec<Delivery>, GenerationError> {
        let sizes = params.sizes.sampler()?;
        let mut rng = StdRng::seed_from_u64(params.seed);

        (0..count)
            .map(|index| {
                let point = self.sample_point(&mut rng, params.max_attempts_per_point)?;
                let size = sizes.sample(&mut rng);

                Ok(Delivery::new(
                    format!("{}-{:05}", params.id_prefix, index),
                    point,
                    size,
                    index,
                ))
            })
            .collect()
    }

    fn sample_point(&self, rng: &mut StdRng, max_attempts: usize) -> Result<Point, GenerationError> {
        for _ in 0..max_attempts {
            let cell = &self.region.cells()[self.cells[self.cell_index.sample(rng)]];
            let min = cell.bounds.min();
            let max = cell.bounds.max();

            let lng = rng.random_range(min.x..=max.x);
            let lat = rng.random_range(min.y..=max.y);

            if self.region.boundary().contains(&geo::Point::new(lng, lat)) {
                return Ok(Point::new(lat, lng));
            }
        }

        Err(GenerationError::EmptyRegion(self.region.name().to_owned()))
    }
}
