//! Scenario tests for the self-split and cross-sample evaluations

use mcs_classify::config::PipelineConfig;
use mcs_classify::pipeline::{evaluate_cross, evaluate_self};
use mcs_classify::storage::TrialTable;
use mcs_classify::Error;
use std::fmt::Write as _;
use std::path::Path;

/// Trials whose failure is decided by a wide gap in Ductility
///
/// Odd rows fail (Ductility 200..250, Damage 0.8), even rows survive
/// (Ductility 0..50, Damage 0.2). The other features carry no signal.
#[allow(clippy::cast_precision_loss)]
fn separable_row(i: usize) -> [f64; 15] {
    let fails = i % 2 == 1;
    let offset = (i % 50) as f64;
    let mut row = [1.0; 15];
    row[0] = if fails { 0.8 } else { 0.2 };
    row[1] = if fails { 200.0 + offset } else { offset };
    row[2] = (i % 7) as f64;
    row[4] = 1.0 + (i % 3) as f64 * 0.1;
    row[5] = 250.0 + (i % 5) as f64;
    row[6] = 0.5;
    row[7] = (i % 4) as f64 * 0.25;
    row
}

/// Ductility strictly increasing, no trial reaches the failure threshold
#[allow(clippy::cast_precision_loss)]
fn safe_row(i: usize) -> [f64; 15] {
    let mut row = [2.0; 15];
    row[0] = 0.01 + (i % 40) as f64 / 100.0;
    row[1] = i as f64;
    row[2] = (i % 11) as f64;
    row
}

fn write_csv(path: &Path, rows: impl Iterator<Item = [f64; 15]>) {
    let mut text = String::new();
    for row in rows {
        let line: Vec<String> = row.iter().map(ToString::to_string).collect();
        writeln!(text, "{}", line.join(",")).unwrap();
    }
    std::fs::write(path, text).unwrap();
}

fn table(dir: &Path, name: &str, rows: impl Iterator<Item = [f64; 15]>) -> TrialTable {
    let path = dir.join(name);
    write_csv(&path, rows);
    TrialTable::load_csv(&path).unwrap()
}

#[test]
fn test_self_split_sizes_and_accuracy() {
    let dir = tempfile::tempdir().unwrap();
    let base = table(dir.path(), "base.csv", (0..200).map(separable_row));
    let config = PipelineConfig::default();

    let eval = evaluate_self(&base, &config, 42).unwrap();
    assert_eq!(eval.record.train_rows(), 160);
    assert_eq!(eval.record.test_rows(), 40);
    assert_eq!(eval.record.seed(), Some(42));
    assert_eq!(eval.actual.len(), 40);
    assert_eq!(eval.predicted.len(), 40);
    assert_eq!(eval.confusion().misclassified(), 0);
    assert!((eval.record.report().accuracy - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_self_split_is_reproducible_with_seed() {
    let dir = tempfile::tempdir().unwrap();
    let base = table(dir.path(), "base.csv", (0..200).map(separable_row));
    let config = PipelineConfig::default();

    let a = evaluate_self(&base, &config, 7).unwrap();
    let b = evaluate_self(&base, &config, 7).unwrap();
    assert_eq!(a.actual, b.actual);
    assert_eq!(a.predicted, b.predicted);
    let x = base.feature_matrix(&config.feature_columns).unwrap();
    assert_eq!(
        a.model.predict_proba(&x).unwrap(),
        b.model.predict_proba(&x).unwrap()
    );
}

#[test]
fn test_single_class_base_predicts_no_failures() {
    let dir = tempfile::tempdir().unwrap();
    let base = table(dir.path(), "safe.csv", (0..100).map(safe_row));
    let config = PipelineConfig::default();

    for seed in [1, 2, 3] {
        let eval = evaluate_self(&base, &config, seed).unwrap();
        assert!(eval.predicted.iter().all(|p| !p));
        assert_eq!(eval.confusion().predicted(true), 0);
        assert_eq!(eval.record.report().positive.support, 0);
        assert!(eval.record.report().positive.precision.abs() < f64::EPSILON);
    }
}

#[test]
fn test_identical_samples_have_no_off_diagonal_mass() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("same.csv");
    write_csv(&path, (0..300).map(separable_row));
    let base = TrialTable::load_csv(&path).unwrap();
    let target = TrialTable::load_csv(&path).unwrap();

    let eval = evaluate_cross(&base, &target, &PipelineConfig::default()).unwrap();
    let cm = eval.confusion();
    assert_eq!(cm.misclassified(), 0);
    assert_eq!(cm.get(false, false) + cm.get(true, true), 300);
}

#[test]
fn test_cross_confusion_sums_to_target_rows() {
    let dir = tempfile::tempdir().unwrap();
    let base = table(dir.path(), "base.csv", (0..100).map(separable_row));
    let target = table(dir.path(), "target.csv", (0..1000).map(|i| separable_row(i * 3 + 1)));

    let eval = evaluate_cross(&base, &target, &PipelineConfig::default()).unwrap();
    assert_eq!(eval.confusion().total(), 1000);
    assert_eq!(eval.record.train_rows(), 100);
    assert_eq!(eval.record.test_rows(), 1000);
    assert!(eval.record.seed().is_none());
}

#[test]
fn test_threshold_changes_labels() {
    let dir = tempfile::tempdir().unwrap();
    let base = table(dir.path(), "base.csv", (0..100).map(separable_row));
    let config = PipelineConfig::builder().failure_threshold(0.9).build().unwrap();

    // Damage never reaches 0.9: every trial survives
    let eval = evaluate_cross(&base, &base, &config).unwrap();
    assert_eq!(eval.confusion().support(true), 0);
    assert_eq!(eval.confusion().predicted(true), 0);
}

#[test]
fn test_unknown_feature_is_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let base = table(dir.path(), "base.csv", (0..20).map(separable_row));
    let mut config = PipelineConfig::default();
    config.feature_columns.push("Hardness".to_string());

    let err = evaluate_cross(&base, &base, &config).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch(_)));
}

#[test]
fn test_table_too_small_to_split() {
    let dir = tempfile::tempdir().unwrap();
    let base = table(dir.path(), "one.csv", (0..1).map(separable_row));
    let err = evaluate_self(&base, &PipelineConfig::default(), 0).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}
