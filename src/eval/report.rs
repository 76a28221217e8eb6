//! Classification report (precision / recall / F1 / support per class)

use super::confusion::ConfusionMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Metrics of one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    /// Fraction of predictions of this class that were right
    pub precision: f64,
    /// Fraction of this class that was found
    pub recall: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
    /// Number of rows actually in this class
    pub support: usize,
}

/// Per-class metrics, accuracy, and averages for a binary classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Metrics of the `false` (no failure) class
    pub negative: ClassMetrics,
    /// Metrics of the `true` (failure) class
    pub positive: ClassMetrics,
    /// Fraction of correct predictions
    pub accuracy: f64,
    /// Unweighted mean over both classes
    pub macro_avg: ClassMetrics,
    /// Support-weighted mean over both classes
    pub weighted_avg: ClassMetrics,
}

/// Divide, reporting 0 when the denominator is empty
#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize, metric: &str, class: bool) -> f64 {
    if denominator == 0 {
        warn!(metric, class, "ill-defined metric (no samples); reporting 0.0");
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

impl ClassMetrics {
    fn for_class(cm: &ConfusionMatrix, class: bool) -> Self {
        let tp = cm.true_positives(class);
        let precision = ratio(tp, cm.predicted(class), "precision", class);
        let recall = ratio(tp, cm.support(class), "recall", class);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
            support: cm.support(class),
        }
    }
}

impl ClassificationReport {
    /// Build the report from a confusion matrix
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let negative = ClassMetrics::for_class(cm, false);
        let positive = ClassMetrics::for_class(cm, true);
        let total = cm.total();

        let macro_avg = ClassMetrics {
            precision: (negative.precision + positive.precision) / 2.0,
            recall: (negative.recall + positive.recall) / 2.0,
            f1: (negative.f1 + positive.f1) / 2.0,
            support: total,
        };

        let weighted = |pick: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                return 0.0;
            }
            (pick(&negative) * negative.support as f64 + pick(&positive) * positive.support as f64)
                / total as f64
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        };

        Self {
            negative,
            positive,
            accuracy: cm.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }

    /// Metrics of one class
    #[must_use]
    pub const fn class(&self, class: bool) -> &ClassMetrics {
        if class {
            &self.positive
        } else {
            &self.negative
        }
    }
}

const LABEL_WIDTH: usize = 12;

fn write_row(f: &mut fmt::Formatter<'_>, label: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{label:>LABEL_WIDTH$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
        m.precision, m.recall, m.f1, m.support
    )
}

/// Tabular layout: one row per class, then accuracy, macro and weighted averages
impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>LABEL_WIDTH$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        write_row(f, "False", &self.negative)?;
        write_row(f, "True", &self.positive)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>LABEL_WIDTH$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}
