//! Pipeline configuration
//!
//! Every constant of the classification run lives here: input paths,
//! failure threshold, feature columns, held-out fraction, split seed, and
//! plot options. Missing keys in a JSON config file fall back to
//! [`PipelineConfig::default`].

use crate::model::LogisticRegression;
use crate::storage::{DAMAGE_COLUMN, TRIAL_COLUMNS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default base (training) sample
pub const DEFAULT_BASE_PATH: &str = "MCS_1000_Tube_29_D_LHC.csv";

/// Default target (out-of-sample) sample
pub const DEFAULT_TARGET_PATH: &str = "MCS_10000_Tube_29_D_LHC.csv";

/// Damage at or above which a trial counts as failed
pub const DEFAULT_FAILURE_THRESHOLD: f64 = 0.5;

/// Fraction of the base sample held out in the self-evaluation
pub const DEFAULT_SPLIT_RATIO: f64 = 0.2;

/// Default scatter plot output
pub const DEFAULT_PLOT_PATH: &str = "damage_scatter.svg";

/// Input columns the classifier sees
pub const DEFAULT_FEATURE_COLUMNS: [&str; 6] =
    ["Ductility", "Creep_Rate", "A", "S_y", "Alpha", "C_f"];

/// How scatter plot axis limits are chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisLimits {
    /// `[0, row_count]` on both axes
    #[default]
    RowCount,
    /// Padded min/max of the plotted columns
    DataRange,
}

impl std::str::FromStr for AxisLimits {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "row-count" | "rows" => Ok(Self::RowCount),
            "data-range" | "data" => Ok(Self::DataRange),
            _ => Err(format!(
                "Unknown axis limits: {s}. Valid values: row-count, data-range"
            )),
        }
    }
}

/// Scatter plot options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// SVG output path, `None` disables the plot
    pub path: Option<PathBuf>,
    /// Axis limit mode
    pub axis_limits: AxisLimits,
    /// Image size in pixels
    pub size: (u32, u32),
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from(DEFAULT_PLOT_PATH)),
            axis_limits: AxisLimits::RowCount,
            size: (1000, 600),
        }
    }
}

/// Configuration of a full classification run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base (training) sample
    pub base_path: PathBuf,
    /// Target (out-of-sample) sample
    pub target_path: PathBuf,
    /// Failure label threshold on `Damage`
    pub failure_threshold: f64,
    /// Classifier input columns
    pub feature_columns: Vec<String>,
    /// Held-out fraction of the self-evaluation
    pub split_ratio: f64,
    /// Split seed, `None` draws one from system entropy
    pub seed: Option<u64>,
    /// Classifier hyperparameters
    pub classifier: LogisticRegression,
    /// Scatter plot options
    pub plot: PlotConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            target_path: PathBuf::from(DEFAULT_TARGET_PATH),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            feature_columns: DEFAULT_FEATURE_COLUMNS.iter().map(ToString::to_string).collect(),
            split_ratio: DEFAULT_SPLIT_RATIO,
            seed: None,
            classifier: LogisticRegression::default(),
            plot: PlotConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a builder starting from the defaults
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Read a JSON config file; absent keys keep their defaults
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed, or fails validation
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration before any data is touched
    ///
    /// # Errors
    /// Returns error if the threshold is not finite, the split ratio is not
    /// in (0, 1), or the feature list is empty, has duplicates, names an
    /// unknown column, or includes `Damage`
    pub fn validate(&self) -> Result<()> {
        if !self.failure_threshold.is_finite() {
            return Err(Error::ConfigError(format!(
                "failure_threshold must be finite, got {}",
                self.failure_threshold
            )));
        }
        if !(self.split_ratio > 0.0 && self.split_ratio < 1.0) {
            return Err(Error::ConfigError(format!(
                "split_ratio must be in (0, 1), got {}",
                self.split_ratio
            )));
        }
        if self.feature_columns.is_empty() {
            return Err(Error::ConfigError("feature_columns is empty".to_string()));
        }
        for (i, column) in self.feature_columns.iter().enumerate() {
            if column == DAMAGE_COLUMN {
                return Err(Error::ConfigError(format!(
                    "'{DAMAGE_COLUMN}' defines the label and cannot be a feature"
                )));
            }
            if !TRIAL_COLUMNS.contains(&column.as_str()) {
                return Err(Error::ConfigError(format!(
                    "unknown feature column '{column}'"
                )));
            }
            if self.feature_columns[..i].contains(column) {
                return Err(Error::ConfigError(format!(
                    "feature column '{column}' listed twice"
                )));
            }
        }
        self.classifier
            .validate()
            .map_err(|e| Error::ConfigError(format!("classifier: {e}")))?;
        let (width, height) = self.plot.size;
        if width == 0 || height == 0 {
            return Err(Error::ConfigError(format!(
                "plot size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(())
    }
}

/// Builder for `PipelineConfig`.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Start from an existing configuration
    #[must_use]
    pub const fn from_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Set the base sample path
    #[must_use]
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.base_path = path.into();
        self
    }

    /// Set the target sample path
    #[must_use]
    pub fn target_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.target_path = path.into();
        self
    }

    /// Set the failure threshold
    #[must_use]
    pub const fn failure_threshold(mut self, threshold: f64) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    /// Set the feature columns
    #[must_use]
    pub fn feature_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.config.feature_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the held-out fraction
    #[must_use]
    pub const fn split_ratio(mut self, ratio: f64) -> Self {
        self.config.split_ratio = ratio;
        self
    }

    /// Fix the split seed
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the classifier hyperparameters
    #[must_use]
    pub const fn classifier(mut self, classifier: LogisticRegression) -> Self {
        self.config.classifier = classifier;
        self
    }

    /// Set the plot output path
    #[must_use]
    pub fn plot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.plot.path = Some(path.into());
        self
    }

    /// Disable the scatter plot
    #[must_use]
    pub fn no_plot(mut self) -> Self {
        self.config.plot.path = None;
        self
    }

    /// Set the plot axis limit mode
    #[must_use]
    pub const fn axis_limits(mut self, limits: AxisLimits) -> Self {
        self.config.plot.axis_limits = limits;
        self
    }

    /// Validate and build the `PipelineConfig`.
    ///
    /// # Errors
    /// See [`PipelineConfig::validate`]
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
