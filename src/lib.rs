//! # mcs-classify: Failure Classification of Monte Carlo Creep-Fatigue Trials
//!
//! **Version**: 0.1.0
//!
//! Loads Monte Carlo trial samples of a creep-fatigue damage model ("Tube 29")
//! into Arrow tables, labels each trial as failed when `Damage >= 0.5`, and
//! trains a logistic-regression classifier on six input parameters to predict
//! failure. Two evaluations are reported:
//!
//! 1. **Self-split**: 80/20 shuffled split of the base sample
//! 2. **Cross-sample**: fit on the whole base sample, score on the larger
//!    target sample
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Poka-Yoke**: fixed 15-column schema, malformed files fail at load
//! - **Jidoka**: no default substitution for missing or non-numeric values
//! - **Genchi Genbutsu**: the split seed is always recorded so a run can be
//!   replayed exactly
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mcs_classify::config::PipelineConfig;
//! use mcs_classify::pipeline;
//!
//! let config = PipelineConfig::builder()
//!     .base_path("MCS_1000_Tube_29_D_LHC.csv")
//!     .target_path("MCS_10000_Tube_29_D_LHC.csv")
//!     .seed(42)
//!     .no_plot()
//!     .build()?;
//!
//! let outcome = pipeline::run(&config)?;
//! println!("{}", outcome.self_evaluation.record.report());
//! println!("{}", outcome.cross_evaluation.record.report());
//! println!("{}", outcome.cross_evaluation.confusion());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod eval;
pub mod model;
pub mod pipeline;
pub mod plot;
pub mod storage;
pub mod summary;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use storage::TrialTable;
