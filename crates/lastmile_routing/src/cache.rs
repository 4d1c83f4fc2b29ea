use std::{
    fs::File,
    hash::{Hash, Hasher},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use fxhash::FxHasher64;
use tracing::{debug, warn};

use crate::{matrix::DistanceMatrix, oracle::DistanceOracle, point::Point, weighting::Metric};

pub const CACHE_FOLDER_ENV_VAR: &str = "LASTMILE_CACHE_FOLDER";

/// Persistent storage for distance matrices across process runs.
pub trait MatrixCache: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<DistanceMatrix>, anyhow::Error>;

    fn store(&self, key: &str, matrix: &DistanceMatrix) -> Result<(), anyhow::Error>;
}

pub struct FileMatrixCache {
    folder: PathBuf,
}

impl FileMatrixCache {
    pub fn new<P: AsRef<Path>>(folder: P) -> Result<Self, anyhow::Error> {
        let folder = folder.as_ref();

        if !folder.is_dir() {
            return Err(anyhow::anyhow!(
                "Path {} is not a directory",
                folder.display()
            ));
        }

        Ok(FileMatrixCache {
            folder: folder.to_path_buf(),
        })
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let cache_folder_path = std::env::var(CACHE_FOLDER_ENV_VAR)
            .with_context(|| format!("{} is not set", CACHE_FOLDER_ENV_VAR))?;

        FileMatrixCache::new(cache_folder_path)
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.folder.join(format!("{}.json", key))
    }
}

impl MatrixCache for FileMatrixCache {
    fn load(&self, key: &str) -> Result<Option<DistanceMatrix>, anyhow::Error> {
        let file_path = self.file_path(key);

        if !file_path.is_file() {
            return Ok(None);
        }

        let file = File::open(&file_path)?;
        let matrix: DistanceMatrix = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read cached matrix {}", file_path.display()))?;

        Ok(Some(matrix))
    }

    fn store(&self, key: &str, matrix: &DistanceMatrix) -> Result<(), anyhow::Error> {
        let file = File::create(self.file_path(key))?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        serde_json::to_writer(&mut writer, matrix)?;
        writer.flush()?;

        Ok(())
    }
}

fn hash_points<H: Hasher>(points: &[Point], hasher: &mut H) {
    points.len().hash(hasher);
    for point in points {
        hasher.write_u64(point.lat.to_bits());
        hasher.write_u64(point.lng.to_bits());
        point.node.hash(hasher);
    }
}

/// Cache key of a matrix: the points in order, the network snapshot and the metric.
pub fn matrix_key(points: &[Point], network_fingerprint: u64, metric: Metric) -> String {
    let mut hasher = FxHasher64::default();

    hash_points(points, &mut hasher);
    hasher.write_u64(network_fingerprint);
    metric.hash(&mut hasher);

    format!("{:016x}", hasher.finish())
}

/// Loads the matrix from `cache` or computes it with `oracle` and stores it.
/// An unreadable entry is recomputed and overwritten. A failed store is
/// logged, the computed matrix is still returned.
pub fn cached_matrix(
    oracle: &DistanceOracle,
    points: &[Point],
    cache: &dyn MatrixCache,
) -> Result<DistanceMatrix, anyhow::Error> {
    let key = matrix_key(points, oracle.network().fingerprint(), oracle.metric());

    match cache.load(&key) {
        Ok(Some(matrix)) if matrix.size() == points.len() => {
            debug!(%key, "Using cached distance matrix");
            return Ok(matrix);
        }
        Ok(Some(_)) => warn!(%key, "Ignoring cached distance matrix with a different size"),
        Ok(None) => {}
        Err(err) => warn!(%key, "Ignoring unreadable cached distance matrix: {:#}", err),
    }

    let matrix = oracle.matrix(points)?;

    if let Err(err) = cache.store(&key, &matrix) {
        warn!(%key, "Failed to cache distance matrix: {}", err);
    }

    Ok(matrix)
}
