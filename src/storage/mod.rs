//! Storage backend for trial tables (Arrow, CSV in / CSV + Parquet out)
//!
//! **Read-Only Design**:
//! - A trial table is loaded once and never mutated afterwards
//! - All columns are non-nullable `Float64` in the fixed trial order
//! - Derived values (failure labels, feature matrices) are computed on
//!   demand and never written back into the table
//!
//! Toyota Way Principles:
//! - Poka-Yoke: the schema is fixed, so a malformed file fails at load time
//!   instead of surfacing later as a silently shifted column
//! - Genchi Genbutsu: column statistics are computed from the actual data

use crate::model::FeatureMatrix;
use crate::{Error, Result};
use arrow::array::{Array, Float64Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use trueno::Vector;

/// Column names of a trial record, in file order
pub const TRIAL_COLUMNS: [&str; 15] = [
    "Damage",
    "Ductility",
    "Creep_Rate",
    "Zeta_P",
    "A",
    "S_y",
    "Alpha",
    "C_f",
    "Sigma_B",
    "Sigma_SU",
    "Sigma_RT",
    "T_SU",
    "T_RT",
    "T_SO",
    "Sigma_SO",
];

/// Column the failure label is derived from
pub const DAMAGE_COLUMN: &str = "Damage";

/// Rows per Arrow batch when reading CSV
const CSV_BATCH_SIZE: usize = 1024;

/// Arrow schema of a trial table: 15 non-nullable `Float64` columns
#[must_use]
pub fn trial_schema() -> SchemaRef {
    Arc::new(Schema::new(
        TRIAL_COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Float64, false))
            .collect::<Vec<_>>(),
    ))
}

/// Failure label for a single damage value.
///
/// Inclusive: a trial exactly at the threshold counts as failed.
#[must_use]
pub fn is_failure(damage: f64, threshold: f64) -> bool {
    damage >= threshold
}

/// Summary statistics of one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
}

/// In-memory table of Monte Carlo trial records
#[derive(Debug, Clone)]
pub struct TrialTable {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl TrialTable {
    /// Create a table from existing batches
    ///
    /// Each batch is re-bound to the canonical trial schema.
    ///
    /// # Errors
    /// Returns error if a batch does not have the 15 trial columns as `Float64`,
    /// or contains nulls
    pub fn new(batches: Vec<RecordBatch>) -> Result<Self> {
        let schema = trial_schema();
        let batches = batches
            .into_iter()
            .map(|batch| conform_batch(&schema, &batch))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { schema, batches })
    }

    /// Load a table, choosing the reader from the file extension
    ///
    /// `.parquet` files go through [`load_parquet`](Self::load_parquet),
    /// everything else is read as headerless CSV.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or does not match the trial schema
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_parquet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

        if is_parquet {
            Self::load_parquet(path)
        } else {
            Self::load_csv(path)
        }
    }

    /// Load table from a headerless, comma-delimited CSV file
    ///
    /// Whitespace around fields is ignored, so `0.1, 2.5` reads as two numbers.
    ///
    /// # Errors
    /// Returns error if the file is missing, a line does not have exactly
    /// 15 fields, or a field is empty or non-numeric
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        use arrow::csv::ReaderBuilder;

        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::StorageError(format!("Failed to open CSV file {}: {e}", path.display()))
        })?;

        let schema = trial_schema();
        let reader = ReaderBuilder::new(Arc::clone(&schema))
            .with_header(false)
            .with_batch_size(CSV_BATCH_SIZE)
            .build(Cursor::new(trim_fields(&text)))
            .map_err(|e| Error::StorageError(format!("Failed to create CSV reader: {e}")))?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                Error::StorageError(format!("Failed to read {}: {e}", path.display()))
            })?;
            batches.push(batch);
        }

        let table = Self { schema, batches };
        debug!(path = %path.display(), rows = table.num_rows(), "loaded CSV trial table");
        Ok(table)
    }

    /// Load table from a Parquet snapshot
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed, or its schema
    /// is not the trial schema
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::StorageError(format!("Failed to open Parquet file {}: {e}", path.display()))
        })?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
            Error::StorageError(format!("Failed to parse Parquet file: {e}"))
        })?;

        let reader = builder.build().map_err(|e| {
            Error::StorageError(format!("Failed to create Parquet reader: {e}"))
        })?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                Error::StorageError(format!("Failed to read record batch: {e}"))
            })?;
            batches.push(batch);
        }

        let table = Self::new(batches)?;
        debug!(path = %path.display(), rows = table.num_rows(), "loaded Parquet trial table");
        Ok(table)
    }

    /// Write the table as headerless CSV in trial column order
    ///
    /// # Errors
    /// Returns error if the file cannot be created or written
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        use arrow::csv::WriterBuilder;

        let file = File::create(path.as_ref())?;
        let mut writer = WriterBuilder::new().with_header(false).build(file);
        for batch in &self.batches {
            writer.write(batch)?;
        }
        Ok(())
    }

    /// Write the table as a Parquet snapshot
    ///
    /// # Errors
    /// Returns error if the file cannot be created or written
    pub fn write_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        use parquet::arrow::ArrowWriter;

        let file = File::create(path.as_ref())?;
        let mut writer = ArrowWriter::try_new(file, Arc::clone(&self.schema), None)?;
        for batch in &self.batches {
            writer.write(batch)?;
        }
        writer.close()?;
        Ok(())
    }

    /// Get all record batches
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Get the table schema
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Total number of rows across all batches
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// True if the table holds no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Values of a named column, in row order
    ///
    /// # Errors
    /// Returns error if the column does not exist or contains nulls
    pub fn column_values(&self, name: &str) -> Result<Vec<f64>> {
        let index = self.schema.index_of(name).map_err(|_| {
            Error::SchemaMismatch(format!("Column '{name}' not found in trial table"))
        })?;

        let mut values = Vec::with_capacity(self.num_rows());
        for batch in &self.batches {
            let array = batch
                .column(index)
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| {
                    Error::SchemaMismatch(format!("Column '{name}' is not Float64"))
                })?;
            if array.null_count() > 0 {
                return Err(Error::InvalidData(format!(
                    "Column '{name}' has {} missing values",
                    array.null_count()
                )));
            }
            values.extend_from_slice(array.values());
        }
        Ok(values)
    }

    /// Failure label per row: `Damage >= threshold`
    ///
    /// # Errors
    /// Returns error if the damage column cannot be read
    pub fn failure_labels(&self, threshold: f64) -> Result<Vec<bool>> {
        Ok(self
            .column_values(DAMAGE_COLUMN)?
            .into_iter()
            .map(|damage| is_failure(damage, threshold))
            .collect())
    }

    /// Row-major feature matrix over the named columns
    ///
    /// # Errors
    /// Returns error if a column is absent, has missing values, or holds a
    /// non-finite number
    pub fn feature_matrix<S: AsRef<str>>(&self, columns: &[S]) -> Result<FeatureMatrix> {
        let names: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let values = names
            .iter()
            .map(|name| self.column_values(name))
            .collect::<Result<Vec<_>>>()?;
        FeatureMatrix::from_columns(names, &values)
    }

    /// Min, max and mean of a column (SIMD via trueno)
    ///
    /// The reductions run in `f32`: results carry about 7 significant
    /// digits, and magnitudes below `f32::MIN_POSITIVE` (about 1e-38) lose
    /// precision or flush to zero. Callers that bound data with these
    /// values must allow for that rounding.
    ///
    /// # Errors
    /// Returns error if the column is absent or the table is empty
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn column_stats(&self, name: &str) -> Result<ColumnStats> {
        let values = self.column_values(name)?;
        if values.is_empty() {
            return Err(Error::InvalidInput(format!(
                "Cannot compute statistics of empty column '{name}'"
            )));
        }

        let narrowed: Vec<f32> = values.iter().map(|v| *v as f32).collect();
        let vector = Vector::from_slice(&narrowed);
        let simd_err = |e| Error::Other(format!("SIMD aggregation over '{name}' failed: {e:?}"));

        let min = vector.min().map_err(simd_err)?;
        let max = vector.max().map_err(simd_err)?;
        let sum = vector.sum().map_err(simd_err)?;

        Ok(ColumnStats {
            min: f64::from(min),
            max: f64::from(max),
            mean: f64::from(sum) / values.len() as f64,
        })
    }
}

/// Strip whitespace around every comma-separated field, line by line
fn trim_fields(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let mut fields = line.split(',').map(str::trim);
        if let Some(first) = fields.next() {
            out.push_str(first);
        }
        for field in fields {
            out.push(',');
            out.push_str(field);
        }
        out.push('\n');
    }
    out
}

/// Re-bind a batch to the trial schema, checking names and types
fn conform_batch(schema: &SchemaRef, batch: &RecordBatch) -> Result<RecordBatch> {
    let actual = batch.schema();
    if actual.fields().len() != schema.fields().len() {
        return Err(Error::SchemaMismatch(format!(
            "expected {} columns, got {}",
            schema.fields().len(),
            actual.fields().len()
        )));
    }

    for (expected, found) in schema.fields().iter().zip(actual.fields().iter()) {
        if expected.name() != found.name() || expected.data_type() != found.data_type() {
            return Err(Error::SchemaMismatch(format!(
                "expected column '{}' ({}), got '{}' ({})",
                expected.name(),
                expected.data_type(),
                found.name(),
                found.data_type()
            )));
        }
    }

    RecordBatch::try_new(Arc::clone(schema), batch.columns().to_vec()).map_err(|e| {
        Error::InvalidData(format!("Batch does not fit the trial schema: {e}"))
    })
}
