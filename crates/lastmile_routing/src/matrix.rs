use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

/// Dense directed matrix, `values[from * size + to]`, in meters or seconds
/// depending on the metric it was built with.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(try_from = "MatrixFile")]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct MatrixFile {
    size: usize,
    values: Vec<f64>,
}

impl TryFrom<MatrixFile> for DistanceMatrix {
    type Error = RoutingError;

    fn try_from(file: MatrixFile) -> Result<Self, Self::Error> {
        if file.size.checked_mul(file.size) != Some(file.values.len()) {
            return Err(RoutingError::InvalidMatrix {
                size: file.size,
                values: file.values.len(),
            });
        }

        Ok(DistanceMatrix {
            size: file.size,
            values: file.values,
        })
    }
}

impl DistanceMatrix {
    pub fn new(size: usize, values: Vec<f64>) -> Self {
        assert_eq!(
            values.len(),
            size * size,
            "matrix values do not match its size"
        );
        DistanceMatrix { size, values }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let size = rows.len();
        DistanceMatrix::new(size, rows.into_iter().flatten().collect())
    }

    #[inline(always)]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.values[from * self.size + to]
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn row(&self, from: usize) -> &[f64] {
        &self.values[from * self.size..(from + 1) * self.size]
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Keeps the rows and columns of `indices`, in that order.
    pub fn submatrix(&self, indices: &[usize]) -> DistanceMatrix {
        let values = indices
            .iter()
            .flat_map(|&from| indices.iter().map(move |&to| self.get(from, to)))
            .collect();

        DistanceMatrix::new(indices.len(), values)
    }
}
