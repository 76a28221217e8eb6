//! End-to-end runs of the four pipeline stages

use mcs_classify::config::{AxisLimits, PipelineConfig};
use mcs_classify::pipeline::{self, load, visualize};
use mcs_classify::plot::{axis_ranges, scatter_points};
use mcs_classify::summary::{read_summary, write_summary, Scenario};
use mcs_classify::Error;
use std::fmt::Write as _;
use std::path::Path;

#[allow(clippy::cast_precision_loss)]
fn trial_row(i: usize) -> [f64; 15] {
    let fails = i % 3 == 0;
    let mut row = [1.5; 15];
    row[0] = if fails { 0.6 + (i % 4) as f64 * 0.1 } else { 0.1 };
    row[1] = if fails { 500.0 + (i % 90) as f64 } else { (i % 90) as f64 };
    row[2] = 10.0 + (i % 13) as f64;
    row
}

fn write_csv(path: &Path, n: usize) {
    let mut text = String::new();
    for i in 0..n {
        let line: Vec<String> = trial_row(i).iter().map(ToString::to_string).collect();
        writeln!(text, "{}", line.join(",")).unwrap();
    }
    std::fs::write(path, text).unwrap();
}

fn config_in(dir: &Path) -> PipelineConfig {
    let base = dir.join("base.csv");
    let target = dir.join("target.csv");
    write_csv(&base, 120);
    write_csv(&target, 600);
    PipelineConfig::builder()
        .base_path(base)
        .target_path(target)
        .plot_path(dir.join("scatter.svg"))
        .seed(2019)
        .build()
        .unwrap()
}

#[test]
fn test_full_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let outcome = pipeline::run(&config).unwrap();
    assert_eq!(outcome.datasets.base.num_rows(), 120);
    assert_eq!(outcome.datasets.target.num_rows(), 600);

    let plot = outcome.plot.expect("plot path");
    let svg = std::fs::read_to_string(plot).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Creep Ductility (low-high)"));

    assert_eq!(outcome.self_evaluation.record.scenario(), Scenario::SelfSplit);
    assert_eq!(outcome.self_evaluation.record.seed(), Some(2019));
    assert_eq!(outcome.self_evaluation.record.test_rows(), 24);
    assert_eq!(outcome.cross_evaluation.record.scenario(), Scenario::CrossSample);
    assert_eq!(outcome.cross_evaluation.confusion().total(), 600);

    let text = outcome.cross_evaluation.record.report().to_string();
    assert!(text.contains("precision"));
    assert!(text.contains("weighted avg"));
}

#[test]
fn test_summary_json_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let outcome = pipeline::run(&config).unwrap();

    let path = dir.path().join("summary.json");
    write_summary(
        &path,
        &[outcome.self_evaluation.record, outcome.cross_evaluation.record],
    )
    .unwrap();

    let records = read_summary(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].confusion().total(), 600);
}

#[test]
fn test_plot_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::builder()
        .base_path(dir.path().join("base.csv"))
        .no_plot()
        .build()
        .unwrap();
    write_csv(&config.base_path, 10);
    let base = mcs_classify::TrialTable::load(&config.base_path).unwrap();
    assert!(visualize(&base, &config.plot).unwrap().is_none());
}

#[test]
fn test_axis_limits_modes() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let datasets = load(&config).unwrap();

    let (x, y) = axis_ranges(&datasets.base, AxisLimits::RowCount).unwrap();
    assert_eq!(x, 0.0..120.0);
    assert_eq!(y, 0.0..120.0);

    let (x, y) = axis_ranges(&datasets.base, AxisLimits::DataRange).unwrap();
    assert!(x.start < 0.0 && x.end > 589.0);
    assert!(y.start < 10.0 && y.end > 22.0);

    let points = scatter_points(&datasets.base).unwrap();
    assert_eq!(points.len(), 120);
    assert!((points[1].radius - (0.1_f64 * 200.0).sqrt() / 2.0).abs() < 1e-12);
}

#[test]
fn test_data_range_covers_points_beyond_f32_precision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("narrow.csv");
    let mut text = String::new();
    for (ductility, rate) in [(1e6, 1e-40), (1e6 + 0.01, 5e-40), (1e6 + 0.03, 2e-39)] {
        writeln!(text, "0.2,{ductility},{rate},1,1,1,1,1,1,1,1,1,1,1,1").unwrap();
    }
    std::fs::write(&path, text).unwrap();
    let table = mcs_classify::TrialTable::load(&path).unwrap();

    let (x, y) = axis_ranges(&table, AxisLimits::DataRange).unwrap();
    for p in scatter_points(&table).unwrap() {
        assert!(x.contains(&p.x), "{} outside {x:?}", p.x);
        assert!(y.contains(&p.y), "{} outside {y:?}", p.y);
    }
}

#[test]
fn test_data_range_plot_renders() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.plot.axis_limits = AxisLimits::DataRange;
    let datasets = load(&config).unwrap();
    let path = visualize(&datasets.base, &config.plot).unwrap().unwrap();
    assert!(path.exists());
}

#[test]
fn test_parquet_export_keeps_same_named_samples_apart() {
    let dir = tempfile::tempdir().unwrap();
    let base_dir = dir.path().join("small");
    let target_dir = dir.path().join("large");
    std::fs::create_dir_all(&base_dir).unwrap();
    std::fs::create_dir_all(&target_dir).unwrap();
    write_csv(&base_dir.join("trials.csv"), 30);
    write_csv(&target_dir.join("trials.csv"), 90);

    let config = PipelineConfig::builder()
        .base_path(base_dir.join("trials.csv"))
        .target_path(target_dir.join("trials.csv"))
        .no_plot()
        .seed(5)
        .build()
        .unwrap();
    let outcome = pipeline::run(&config).unwrap();

    let out = dir.path().join("snapshots");
    let written = pipeline::export_parquet(&outcome.datasets, &config, &out).unwrap();
    assert_eq!(
        written,
        vec![out.join("base_trials.parquet"), out.join("target_trials.parquet")]
    );
    assert_eq!(mcs_classify::TrialTable::load(&written[0]).unwrap().num_rows(), 30);
    assert_eq!(mcs_classify::TrialTable::load(&written[1]).unwrap().num_rows(), 90);
}

#[test]
fn test_run_outcome_carries_every_stage() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let outcome = pipeline::run(&config).unwrap();

    // Stages run in order off one loaded copy of the samples
    assert_eq!(outcome.plot.as_deref(), config.plot.path.as_deref());
    assert_eq!(
        outcome.self_evaluation.record.train_rows() + outcome.self_evaluation.record.test_rows(),
        outcome.datasets.base.num_rows()
    );
    assert_eq!(
        outcome.cross_evaluation.record.test_rows(),
        outcome.datasets.target.num_rows()
    );
}

#[test]
fn test_run_rejects_invalid_classifier_before_loading() {
    let mut config = PipelineConfig::default();
    config.base_path = "absent.csv".into();
    config.classifier.max_iter = 0;
    assert!(matches!(pipeline::run(&config), Err(Error::ConfigError(_))));
}

#[test]
fn test_missing_target_fails_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.target_path = dir.path().join("absent.csv");
    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, Error::StorageError(_)));
}

#[test]
fn test_invalid_config_fails_before_loading() {
    let mut config = PipelineConfig::default();
    config.split_ratio = 0.0;
    assert!(matches!(pipeline::run(&config), Err(Error::ConfigError(_))));
}

#[test]
fn test_config_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"base_path": "b.csv", "split_ratio": 0.3, "classifier": {"learning_rate": 0.5}}"#,
    )
    .unwrap();

    let config = PipelineConfig::from_json_file(&path).unwrap();
    assert_eq!(config.base_path, Path::new("b.csv"));
    assert!((config.split_ratio - 0.3).abs() < f64::EPSILON);
    assert!((config.classifier.learning_rate - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.classifier.max_iter, 1000);
}

#[test]
fn test_config_json_rejected_by_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"feature_columns": ["Damage"]}"#).unwrap();
    assert!(matches!(
        PipelineConfig::from_json_file(&path),
        Err(Error::ConfigError(_))
    ));
}
