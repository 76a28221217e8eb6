//! Binary confusion matrix

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 2x2 confusion matrix over boolean labels
///
/// `counts[actual][predicted]`, index 0 = `false`, index 1 = `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    /// Tally predictions against ground truth
    ///
    /// # Errors
    /// Returns error if the slices differ in length
    pub fn from_predictions(actual: &[bool], predicted: &[bool]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(Error::InvalidInput(format!(
                "{} actual labels but {} predictions",
                actual.len(),
                predicted.len()
            )));
        }

        let mut counts = [[0; 2]; 2];
        for (&a, &p) in actual.iter().zip(predicted) {
            counts[usize::from(a)][usize::from(p)] += 1;
        }
        Ok(Self { counts })
    }

    /// Count of rows with the given actual and predicted labels
    #[must_use]
    pub const fn get(&self, actual: bool, predicted: bool) -> usize {
        self.counts[actual as usize][predicted as usize]
    }

    /// Raw counts, rows = actual, columns = predicted
    #[must_use]
    pub const fn counts(&self) -> [[usize; 2]; 2] {
        self.counts
    }

    /// Correct predictions for a class
    #[must_use]
    pub const fn true_positives(&self, class: bool) -> usize {
        self.get(class, class)
    }

    /// Rows predicted as `class` that were not
    #[must_use]
    pub const fn false_positives(&self, class: bool) -> usize {
        self.get(!class, class)
    }

    /// Rows of `class` predicted as the other class
    #[must_use]
    pub const fn false_negatives(&self, class: bool) -> usize {
        self.get(class, !class)
    }

    /// Rows whose actual label is `class`
    #[must_use]
    pub const fn support(&self, class: bool) -> usize {
        self.get(class, false) + self.get(class, true)
    }

    /// Rows predicted as `class`
    #[must_use]
    pub const fn predicted(&self, class: bool) -> usize {
        self.get(false, class) + self.get(true, class)
    }

    /// Total number of rows
    #[must_use]
    pub const fn total(&self) -> usize {
        self.support(false) + self.support(true)
    }

    /// Off-diagonal mass
    #[must_use]
    pub const fn misclassified(&self) -> usize {
        self.get(false, true) + self.get(true, false)
    }

    /// Fraction of correct predictions (0 when empty)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (total - self.misclassified()) as f64 / total as f64
    }
}

/// Bracketed integer grid: `[[tn fp]\n [fn tp]]`
impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .counts
            .iter()
            .flatten()
            .map(|c| c.to_string().len())
            .max()
            .unwrap_or(1);
        let [[tn, fp], [fn_, tp]] = self.counts;
        writeln!(f, "[[{tn:>width$} {fp:>width$}]")?;
        write!(f, " [{fn_:>width$} {tp:>width$}]]")
    }
}
