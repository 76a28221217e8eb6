//! Binary failure classifier
//!
//! - [`FeatureMatrix`]: named feature columns over an aprender `Matrix<f32>`
//! - [`LogisticRegression`]: hyperparameters, [`fit`](LogisticRegression::fit)
//!   returns a [`LogisticModel`]
//!
//! ## Usage
//!
//! ```rust
//! use mcs_classify::model::{FeatureMatrix, LogisticRegression};
//!
//! let x = FeatureMatrix::new(
//!     vec!["Ductility".to_string()],
//!     4,
//!     vec![1.0, 2.0, 8.0, 9.0],
//! )?;
//! let y = [false, false, true, true];
//!
//! let model = LogisticRegression::new().fit(&x, &y)?;
//! assert_eq!(model.predict(&x)?, y);
//! # Ok::<(), mcs_classify::Error>(())
//! ```

mod logistic;
mod matrix;

pub use logistic::{LogisticModel, LogisticRegression};
pub use matrix::FeatureMatrix;
