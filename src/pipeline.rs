//! Classification run: load → visualize → evaluate-self → evaluate-cross
//!
//! Each stage takes its inputs as parameters and can be called on its own.
//! [`run`] chains them in order and stops at the first error.

use crate::config::{PipelineConfig, PlotConfig};
use crate::eval::{train_test_split, ConfusionMatrix};
use crate::model::LogisticModel;
use crate::plot::render_scatter;
use crate::storage::TrialTable;
use crate::summary::{EvaluationRecord, Scenario};
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

/// The two trial samples of a run
#[derive(Debug, Clone)]
pub struct Datasets {
    /// Training sample
    pub base: TrialTable,
    /// Out-of-sample evaluation sample
    pub target: TrialTable,
}

/// A fitted model and how it scored
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Classifier fitted for this scenario
    pub model: LogisticModel,
    /// Ground-truth labels of the evaluated rows
    pub actual: Vec<bool>,
    /// Predicted labels of the evaluated rows
    pub predicted: Vec<bool>,
    /// Report, confusion matrix, and run metadata
    pub record: EvaluationRecord,
}

impl Evaluation {
    /// Confusion matrix of this evaluation
    #[must_use]
    pub const fn confusion(&self) -> &ConfusionMatrix {
        self.record.confusion()
    }
}

/// Everything a full run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Loaded samples
    pub datasets: Datasets,
    /// Scatter plot path, if one was rendered
    pub plot: Option<PathBuf>,
    /// Split evaluation on the base sample
    pub self_evaluation: Evaluation,
    /// Base-trained model evaluated on the target sample
    pub cross_evaluation: Evaluation,
}

/// Load one trial table and log its shape
fn load_table(role: &str, path: &Path, threshold: f64) -> Result<TrialTable> {
    let table = TrialTable::load(path)?;
    let failures = table.failure_labels(threshold)?.iter().filter(|&&f| f).count();
    info!(
        role,
        path = %path.display(),
        rows = table.num_rows(),
        failures,
        "loaded trial sample"
    );
    if !table.is_empty() {
        let damage = table.column_stats(crate::storage::DAMAGE_COLUMN)?;
        info!(role, min = damage.min, max = damage.max, mean = damage.mean, "damage distribution");
    }
    Ok(table)
}

/// Stage 1: load the base and target samples
///
/// # Errors
/// Returns error if either file is missing or does not match the trial schema
pub fn load(config: &PipelineConfig) -> Result<Datasets> {
    let _span = info_span!("load").entered();
    Ok(Datasets {
        base: load_table("base", &config.base_path, config.failure_threshold)?,
        target: load_table("target", &config.target_path, config.failure_threshold)?,
    })
}

/// Stage 2: render the damage scatter plot of a table
///
/// Returns the written path, or `None` when plotting is disabled.
///
/// # Errors
/// Returns error if rendering fails
pub fn visualize(table: &TrialTable, plot: &PlotConfig) -> Result<Option<PathBuf>> {
    let _span = info_span!("visualize").entered();
    let Some(path) = &plot.path else {
        info!("scatter plot disabled");
        return Ok(None);
    };
    render_scatter(table, plot, path)?;
    Ok(Some(path.clone()))
}

/// Write both samples as Parquet snapshots into `dir`
///
/// Files are named `base_<stem>.parquet` and `target_<stem>.parquet` after
/// the configured input paths, so inputs sharing a file name never collide.
///
/// # Errors
/// Returns error if `dir` cannot be created or a snapshot cannot be written
pub fn export_parquet(
    datasets: &Datasets,
    config: &PipelineConfig,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let _span = info_span!("export_parquet").entered();
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(2);
    for (role, table, source) in [
        ("base", &datasets.base, &config.base_path),
        ("target", &datasets.target, &config.target_path),
    ] {
        let stem = source
            .file_stem()
            .map_or_else(|| "trials".into(), |s| s.to_string_lossy());
        let out = dir.join(format!("{role}_{stem}.parquet"));
        table.write_parquet(&out)?;
        info!(role, path = %out.display(), rows = table.num_rows(), "exported Parquet snapshot");
        written.push(out);
    }
    Ok(written)
}

/// Seed for the split: the configured one, or a fresh one from system entropy
#[must_use]
pub fn resolve_seed(config: &PipelineConfig) -> u64 {
    config.seed.unwrap_or_else(rand::random)
}

/// Stage 3: fit on a shuffled split of `base`, score on the held-out rows
///
/// # Errors
/// Returns error if features or labels cannot be extracted, the table is too
/// small to split, or fitting fails
pub fn evaluate_self(base: &TrialTable, config: &PipelineConfig, seed: u64) -> Result<Evaluation> {
    let _span = info_span!("evaluate_self", seed).entered();

    let x = base.feature_matrix(&config.feature_columns)?;
    let y = base.failure_labels(config.failure_threshold)?;
    let split = train_test_split(x.n_rows(), config.split_ratio, seed)?;
    info!(
        seed,
        train = split.train.len(),
        test = split.test.len(),
        "split base sample"
    );

    let x_train = x.take_rows(&split.train)?;
    let y_train: Vec<bool> = split.train.iter().map(|&i| y[i]).collect();
    let x_test = x.take_rows(&split.test)?;
    let actual: Vec<bool> = split.test.iter().map(|&i| y[i]).collect();

    let model = config.classifier.fit(&x_train, &y_train)?;
    let predicted = model.predict(&x_test)?;
    let confusion = ConfusionMatrix::from_predictions(&actual, &predicted)?;

    let record = EvaluationRecord::builder(Scenario::SelfSplit, confusion)
        .train_rows(split.train.len())
        .seed(seed)
        .build();
    info!(accuracy = record.report().accuracy, "self-split evaluation done");

    Ok(Evaluation {
        model,
        actual,
        predicted,
        record,
    })
}

/// Stage 4: fit on all of `base`, score on all of `target`
///
/// # Errors
/// Returns error if either table lacks the feature columns or fitting fails
pub fn evaluate_cross(
    base: &TrialTable,
    target: &TrialTable,
    config: &PipelineConfig,
) -> Result<Evaluation> {
    let _span = info_span!("evaluate_cross").entered();

    let x = base.feature_matrix(&config.feature_columns)?;
    let y = base.failure_labels(config.failure_threshold)?;
    let x_target = target.feature_matrix(&config.feature_columns)?;
    let actual = target.failure_labels(config.failure_threshold)?;

    let model = config.classifier.fit(&x, &y)?;
    let predicted = model.predict(&x_target)?;
    let confusion = ConfusionMatrix::from_predictions(&actual, &predicted)?;

    let record = EvaluationRecord::builder(Scenario::CrossSample, confusion)
        .train_rows(x.n_rows())
        .build();
    info!(
        train = x.n_rows(),
        test = x_target.n_rows(),
        accuracy = record.report().accuracy,
        "cross-sample evaluation done"
    );

    Ok(Evaluation {
        model,
        actual,
        predicted,
        record,
    })
}

/// Run all four stages in order
///
/// # Errors
/// Returns the first stage error
pub fn run(config: &PipelineConfig) -> Result<RunOutcome> {
    config.validate()?;
    let datasets = load(config)?;
    let plot = visualize(&datasets.base, &config.plot)?;
    let seed = resolve_seed(config);
    let self_evaluation = evaluate_self(&datasets.base, config, seed)?;
    let cross_evaluation = evaluate_cross(&datasets.base, &datasets.target, config)?;

    Ok(RunOutcome {
        datasets,
        plot,
        self_evaluation,
        cross_evaluation,
    })
}
