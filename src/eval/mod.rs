//! Evaluation of the failure classifier
//!
//! - [`train_test_split`]: seeded shuffle of row indices
//! - [`ConfusionMatrix`]: actual x predicted counts
//! - [`ClassificationReport`]: precision, recall, F1, and support per class

mod confusion;
mod report;
mod split;

pub use confusion::ConfusionMatrix;
pub use report::{ClassMetrics, ClassificationReport};
pub use split::{held_out_size, train_test_split, TrainTestSplit};
