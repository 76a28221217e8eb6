//! Shuffled train/held-out partition of row indices

use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of a train/held-out partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    /// Rows used for fitting
    pub train: Vec<usize>,
    /// Rows used for evaluation
    pub test: Vec<usize>,
    /// Seed the shuffle was drawn from
    pub seed: u64,
}

/// Number of held-out rows for `n_rows` and a held-out fraction
///
/// `round(test_ratio * n_rows)`, clamped so both sides keep at least one row.
///
/// # Errors
/// Returns error if `test_ratio` is not strictly between 0 and 1 or fewer
/// than two rows are available
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn held_out_size(n_rows: usize, test_ratio: f64) -> Result<usize> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(Error::InvalidInput(format!(
            "split ratio must be in (0, 1), got {test_ratio}"
        )));
    }
    if n_rows < 2 {
        return Err(Error::InvalidInput(format!(
            "need at least 2 rows to split, got {n_rows}"
        )));
    }
    let n_test = (test_ratio * n_rows as f64).round() as usize;
    Ok(n_test.clamp(1, n_rows - 1))
}

/// Shuffle `0..n_rows` with `seed` and cut off the held-out rows
///
/// The same seed always yields the same partition.
///
/// # Errors
/// See [`held_out_size`]
pub fn train_test_split(n_rows: usize, test_ratio: f64, seed: u64) -> Result<TrainTestSplit> {
    let n_test = held_out_size(n_rows, test_ratio)?;

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train,
        test: indices,
        seed,
    })
}
