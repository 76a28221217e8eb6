//! Failure classifier for Monte Carlo creep-fatigue trials.
//!
//! Loads the base and target samples, renders the damage scatter plot, and
//! prints two classification reports followed by the cross-sample confusion
//! matrix. Reports go to stdout, logs to stderr (`RUST_LOG` controls level).
//!
//! Usage:
//!   mcs-classify
//!   mcs-classify --base MCS_1000_Tube_29_D_LHC.csv --target MCS_10000_Tube_29_D_LHC.csv
//!   mcs-classify --seed 42 --no-plot --report-json results.json

use anyhow::{Context, Result};
use clap::Parser;
use mcs_classify::config::{AxisLimits, PipelineConfig, PipelineConfigBuilder};
use mcs_classify::pipeline;
use mcs_classify::summary::write_summary;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "mcs-classify",
    version,
    about = "Predict creep-fatigue failure of Monte Carlo trials with logistic regression"
)]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base (training) sample, headerless CSV or Parquet
    #[arg(long)]
    base: Option<PathBuf>,

    /// Target (evaluation) sample, headerless CSV or Parquet
    #[arg(long)]
    target: Option<PathBuf>,

    /// Damage at or above which a trial counts as failed
    #[arg(long)]
    threshold: Option<f64>,

    /// Held-out fraction of the base sample in the self-split evaluation
    #[arg(long)]
    split_ratio: Option<f64>,

    /// Seed for the train/test shuffle (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Scatter plot output (SVG)
    #[arg(long, conflicts_with = "no_plot")]
    plot: Option<PathBuf>,

    /// Skip the scatter plot
    #[arg(long)]
    no_plot: bool,

    /// Scatter plot axis limits: row-count or data-range
    #[arg(long)]
    axis_limits: Option<AxisLimits>,

    /// Write both evaluations as JSON
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Write the loaded samples as Parquet snapshots into this directory
    #[arg(long)]
    export_parquet: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let base = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        let mut builder = PipelineConfigBuilder::from_config(base);
        if let Some(path) = self.base {
            builder = builder.base_path(path);
        }
        if let Some(path) = self.target {
            builder = builder.target_path(path);
        }
        if let Some(threshold) = self.threshold {
            builder = builder.failure_threshold(threshold);
        }
        if let Some(ratio) = self.split_ratio {
            builder = builder.split_ratio(ratio);
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if let Some(path) = self.plot {
            builder = builder.plot_path(path);
        }
        if self.no_plot {
            builder = builder.no_plot();
        }
        if let Some(limits) = self.axis_limits {
            builder = builder.axis_limits(limits);
        }
        Ok(builder.build()?)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let report_json = cli.report_json.clone();
    let export_parquet = cli.export_parquet.clone();
    let config = cli.into_config().context("invalid configuration")?;

    let outcome = pipeline::run(&config).context("classification run failed")?;

    if let Some(dir) = export_parquet {
        pipeline::export_parquet(&outcome.datasets, &config, &dir)
            .with_context(|| format!("exporting Parquet snapshots to {}", dir.display()))?;
    }
    if let Some(path) = &outcome.plot {
        eprintln!("Scatter plot written to {}", path.display());
    }

    println!("{}", outcome.self_evaluation.record.report());
    println!("{}", outcome.cross_evaluation.record.report());
    println!("{}", outcome.cross_evaluation.confusion());

    if let Some(path) = report_json {
        write_summary(
            &path,
            &[outcome.self_evaluation.record, outcome.cross_evaluation.record],
        )
        .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote evaluation summary");
    }

    Ok(())
}
