//! Evaluation summary records
//!
//! One [`EvaluationRecord`] per evaluation scenario, serialised to JSON so a
//! run can be compared against later runs (and an entropy-seeded split can be
//! replayed from the recorded seed).

use crate::eval::{ClassificationReport, ConfusionMatrix};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Which evaluation produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Train and test on a split of the base sample
    SelfSplit,
    /// Train on the full base sample, test on the target sample
    CrossSample,
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfSplit => write!(f, "self-split"),
            Self::CrossSample => write!(f, "cross-sample"),
        }
    }
}

/// Outcome of one evaluation scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    scenario: Scenario,
    train_rows: usize,
    test_rows: usize,
    seed: Option<u64>,
    report: ClassificationReport,
    confusion: ConfusionMatrix,
    timestamp: DateTime<Utc>,
}

impl EvaluationRecord {
    /// Create a builder for a record.
    #[must_use]
    pub fn builder(scenario: Scenario, confusion: ConfusionMatrix) -> EvaluationRecordBuilder {
        EvaluationRecordBuilder::new(scenario, confusion)
    }

    /// Get the scenario.
    #[must_use]
    pub const fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Get the number of training rows.
    #[must_use]
    pub const fn train_rows(&self) -> usize {
        self.train_rows
    }

    /// Get the number of evaluated rows.
    #[must_use]
    pub const fn test_rows(&self) -> usize {
        self.test_rows
    }

    /// Get the split seed, if the scenario used one.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Get the classification report.
    #[must_use]
    pub const fn report(&self) -> &ClassificationReport {
        &self.report
    }

    /// Get the confusion matrix.
    #[must_use]
    pub const fn confusion(&self) -> &ConfusionMatrix {
        &self.confusion
    }

    /// Get the time the record was created.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Builder for `EvaluationRecord`.
#[derive(Debug)]
pub struct EvaluationRecordBuilder {
    scenario: Scenario,
    train_rows: usize,
    seed: Option<u64>,
    confusion: ConfusionMatrix,
    timestamp: DateTime<Utc>,
}

impl EvaluationRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(scenario: Scenario, confusion: ConfusionMatrix) -> Self {
        Self {
            scenario,
            train_rows: 0,
            seed: None,
            confusion,
            timestamp: Utc::now(),
        }
    }

    /// Set the number of training rows.
    #[must_use]
    pub const fn train_rows(mut self, rows: usize) -> Self {
        self.train_rows = rows;
        self
    }

    /// Set the split seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set a custom timestamp.
    #[must_use]
    pub const fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Build the `EvaluationRecord`; the report is derived from the confusion matrix.
    #[must_use]
    pub fn build(self) -> EvaluationRecord {
        EvaluationRecord {
            scenario: self.scenario,
            train_rows: self.train_rows,
            test_rows: self.confusion.total(),
            seed: self.seed,
            report: ClassificationReport::from_confusion(&self.confusion),
            confusion: self.confusion,
            timestamp: self.timestamp,
        }
    }
}

/// Write records as a pretty-printed JSON array
///
/// # Errors
/// Returns error if the file cannot be created or serialisation fails
pub fn write_summary<P: AsRef<Path>>(path: P, records: &[EvaluationRecord]) -> Result<()> {
    let writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

/// Read records written by [`write_summary`]
///
/// # Errors
/// Returns error if the file cannot be read or parsed
pub fn read_summary<P: AsRef<Path>>(path: P) -> Result<Vec<EvaluationRecord>> {
    let file = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}
