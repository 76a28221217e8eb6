//! Binary logistic regression on top of aprender
//!
//! Features are standardised to zero mean and unit variance before they
//! reach aprender's gradient-descent solver. Trial inputs span many orders
//! of magnitude (creep rates near zero next to ductilities in the
//! hundreds), and a single learning rate cannot serve both scales. The
//! scaling learned on the training rows is stored in the model and applied
//! again at prediction time.

use super::FeatureMatrix;
use crate::{Error, Result};
use aprender::prelude::LogisticRegression as Solver;
use aprender::primitives::Matrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Logistic-regression hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegression {
    /// Gradient-descent step size
    pub learning_rate: f32,
    /// Iteration cap
    pub max_iter: usize,
    /// Convergence tolerance
    pub tol: f32,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

/// Per-column standardisation learned from training rows
#[derive(Debug, Clone, PartialEq)]
struct Standardizer {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl Standardizer {
    #[allow(clippy::cast_precision_loss)]
    fn fit(x: &FeatureMatrix) -> Self {
        let n = x.n_rows() as f64;
        let (means, scales) = (0..x.n_cols())
            .map(|j| {
                let column = (0..x.n_rows()).map(|i| f64::from(x.get(i, j)));
                let mean = column.clone().sum::<f64>() / n;
                let variance = column.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                // A constant column carries no signal; leave it centred at zero
                let scale = if variance > 0.0 { variance.sqrt() } else { 1.0 };
                (mean, scale)
            })
            .unzip();
        Self { means, scales }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn transform(&self, x: &FeatureMatrix) -> Result<Matrix<f32>> {
        let mut data = Vec::with_capacity(x.n_rows() * x.n_cols());
        for i in 0..x.n_rows() {
            for (j, (mean, scale)) in self.means.iter().zip(&self.scales).enumerate() {
                data.push(((f64::from(x.get(i, j)) - mean) / scale) as f32);
            }
        }
        Matrix::from_vec(x.n_rows(), x.n_cols(), data)
            .map_err(|e| Error::InvalidInput(format!("Cannot scale features: {e}")))
    }
}

#[derive(Clone)]
enum Decision {
    Linear {
        scaling: Standardizer,
        solver: Arc<Solver>,
    },
    Constant(bool),
}

/// A trained binary classifier
#[derive(Clone)]
pub struct LogisticModel {
    features: Vec<String>,
    decision: Decision,
}

impl fmt::Debug for LogisticModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("LogisticModel");
        s.field("features", &self.features);
        match &self.decision {
            Decision::Linear { scaling, .. } => s
                .field("means", &scaling.means)
                .field("scales", &scaling.scales),
            Decision::Constant(class) => s.field("constant", class),
        };
        s.finish()
    }
}

impl LogisticRegression {
    /// Hyperparameters with learning rate 0.1, 1000 iterations, tolerance `1e-4`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gradient-descent step size
    #[must_use]
    pub const fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the iteration cap
    #[must_use]
    pub const fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance
    #[must_use]
    pub const fn with_tolerance(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// Check the hyperparameters
    ///
    /// # Errors
    /// Returns error if the learning rate is not positive, the iteration
    /// cap is zero, or the tolerance is negative
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidInput(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidInput("max_iter must be at least 1".to_string()));
        }
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "tol must be non-negative, got {}",
                self.tol
            )));
        }
        Ok(())
    }

    /// Fit a classifier to features `x` and labels `y`
    ///
    /// Labels holding a single class give a model that always predicts
    /// that class.
    ///
    /// # Errors
    /// Returns error if `y` has a different length than `x`, the
    /// hyperparameters are invalid, or the solver rejects the data
    pub fn fit(&self, x: &FeatureMatrix, y: &[bool]) -> Result<LogisticModel> {
        self.validate()?;
        if x.n_rows() != y.len() {
            return Err(Error::InvalidInput(format!(
                "{} feature rows but {} labels",
                x.n_rows(),
                y.len()
            )));
        }

        let positives = y.iter().filter(|&&label| label).count();
        if positives == 0 || positives == y.len() {
            let class = positives > 0;
            warn!(
                class,
                rows = y.len(),
                "training labels contain a single class; fitting a constant classifier"
            );
            return Ok(LogisticModel {
                features: x.names().to_vec(),
                decision: Decision::Constant(class),
            });
        }

        let scaling = Standardizer::fit(x);
        let scaled = scaling.transform(x)?;
        let labels: Vec<usize> = y.iter().map(|&label| usize::from(label)).collect();

        let mut solver = Solver::new()
            .with_learning_rate(self.learning_rate)
            .with_max_iter(self.max_iter)
            .with_tolerance(self.tol);
        solver
            .fit(&scaled, &labels)
            .map_err(|e| Error::FitFailed(e.to_string()))?;
        debug!(
            rows = x.n_rows(),
            features = x.n_cols(),
            positives,
            "fitted logistic regression"
        );

        Ok(LogisticModel {
            features: x.names().to_vec(),
            decision: Decision::Linear {
                scaling,
                solver: Arc::new(solver),
            },
        })
    }
}

impl LogisticModel {
    /// Feature columns the model was trained on, in order
    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// The class a single-class training set fixed, if any
    #[must_use]
    pub fn constant_class(&self) -> Option<bool> {
        match self.decision {
            Decision::Constant(class) => Some(class),
            Decision::Linear { .. } => None,
        }
    }

    /// Probability of the positive (failure) class for each row
    ///
    /// # Errors
    /// Returns error if `x` does not have the training feature columns or
    /// the solver returns non-finite probabilities
    pub fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        self.check_features(x)?;
        match &self.decision {
            Decision::Constant(class) => {
                let p = if *class { 1.0 } else { 0.0 };
                Ok(vec![p; x.n_rows()])
            }
            Decision::Linear { scaling, solver } => {
                let scaled = scaling.transform(x)?;
                let proba = solver.predict_proba(&scaled);
                let proba: Vec<f64> = proba.as_slice().iter().map(|&p| f64::from(p)).collect();
                if let Some(bad) = proba.iter().position(|p| !p.is_finite()) {
                    return Err(Error::FitFailed(format!(
                        "non-finite probability at row {bad}"
                    )));
                }
                Ok(proba)
            }
        }
    }

    /// Predicted label per row: `true` where `P(true) > 0.5`
    ///
    /// # Errors
    /// Returns error if `x` does not have the training feature columns
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<bool>> {
        Ok(self.predict_proba(x)?.into_iter().map(|p| p > 0.5).collect())
    }

    fn check_features(&self, x: &FeatureMatrix) -> Result<()> {
        if x.names() == self.features.as_slice() {
            return Ok(());
        }
        Err(Error::SchemaMismatch(format!(
            "model trained on {:?}, got {:?}",
            self.features,
            x.names()
        )))
    }
}
