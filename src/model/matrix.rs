//! Named feature columns over aprender's dense `Matrix<f32>`

use crate::{Error, Result};
use aprender::primitives::Matrix;

/// Feature values with named columns
///
/// Values are stored as `f32`, the precision aprender's estimators work in.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: Matrix<f32>,
}

impl FeatureMatrix {
    /// Build a matrix from row-major data
    ///
    /// # Errors
    /// Returns error if there are no rows or columns, if
    /// `data.len() != n_rows * names.len()`, or if a value is not finite in `f32`
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(names: Vec<String>, n_rows: usize, data: Vec<f64>) -> Result<Self> {
        let n_cols = names.len();
        if n_rows == 0 || n_cols == 0 {
            return Err(Error::InvalidInput(format!(
                "Feature matrix needs at least one row and one column, got {n_rows} x {n_cols}"
            )));
        }
        if data.len() != n_rows * n_cols {
            return Err(Error::InvalidInput(format!(
                "Feature data has {} values, expected {n_rows} x {n_cols}",
                data.len()
            )));
        }

        let mut narrowed = Vec::with_capacity(data.len());
        for (pos, value) in data.into_iter().enumerate() {
            let single = value as f32;
            if !single.is_finite() {
                return Err(Error::InvalidData(format!(
                    "Non-finite value {value} in feature '{}' at row {}",
                    names[pos % n_cols],
                    pos / n_cols
                )));
            }
            narrowed.push(single);
        }

        let values = Matrix::from_vec(n_rows, n_cols, narrowed)
            .map_err(|e| Error::InvalidInput(format!("Cannot build feature matrix: {e}")))?;
        Ok(Self { names, values })
    }

    /// Build a matrix from equally long columns
    ///
    /// # Errors
    /// Returns error if column lengths differ, a column is empty, or a
    /// value is not finite
    pub fn from_columns(names: Vec<String>, columns: &[Vec<f64>]) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(Error::InvalidInput(format!(
                "{} column names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        let n_rows = columns.first().map_or(0, Vec::len);
        if let Some(bad) = columns.iter().position(|c| c.len() != n_rows) {
            return Err(Error::InvalidInput(format!(
                "Column '{}' has {} rows, expected {n_rows}",
                names[bad],
                columns[bad].len()
            )));
        }

        let mut data = Vec::with_capacity(n_rows * columns.len());
        for row in 0..n_rows {
            data.extend(columns.iter().map(|c| c[row]));
        }
        Self::new(names, n_rows, data)
    }

    /// Column names
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of rows
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.values.n_rows()
    }

    /// Number of columns
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.values.n_cols()
    }

    /// Value at `(row, col)`
    ///
    /// # Panics
    /// Panics if the position is out of bounds
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values.get(row, col)
    }

    /// Underlying aprender matrix
    #[must_use]
    pub const fn values(&self) -> &Matrix<f32> {
        &self.values
    }

    /// New matrix made of the given rows, in the given order
    ///
    /// # Errors
    /// Returns error if `indices` is empty or an index is out of bounds
    pub fn take_rows(&self, indices: &[usize]) -> Result<Self> {
        let n_rows = self.n_rows();
        let n_cols = self.n_cols();
        let mut data = Vec::with_capacity(indices.len() * n_cols);
        for &i in indices {
            if i >= n_rows {
                return Err(Error::InvalidInput(format!(
                    "Row index {i} out of bounds ({n_rows} rows)"
                )));
            }
            data.extend((0..n_cols).map(|j| f64::from(self.get(i, j))));
        }
        Self::new(self.names.clone(), indices.len(), data)
    }
}
