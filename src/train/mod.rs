//! Training orchestration
//!
//! Two structurally identical trainers drive the epoch loop: shuffle the
//! training split, run the training phase in batches, run the validation
//! phase in original order, append the epoch's accumulator results to the
//! history, print a one-line summary, and optionally run the early-stopping
//! check. After the final epoch the recorded history is handed to the
//! caller-supplied reporting hook.

mod classification;
mod config;
mod early_stopping;
mod history;
mod regression;
mod report;

pub use classification::ClassificationTrainer;
pub use config::{FitSummary, TrainConfig};
pub use early_stopping::{EarlyStopping, BEST_CHECKPOINT};
pub use history::History;
pub use regression::RegressionTrainer;
pub use report::{ConsoleChart, NullReport, TrainingReport};
