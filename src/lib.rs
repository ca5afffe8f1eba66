//! # Adiestrar: Epoch/Batch Training Harness
//!
//! Adiestrar orchestrates gradient-based training around an opaque model:
//! epoch/batch looping, running-metric accumulation, early stopping,
//! checkpoint save/load, and reporting of loss/accuracy curves. The
//! numerical engine (forward pass, backpropagation, parameter update) sits
//! behind collaborator traits supplied by the caller.
//!
//! ## Architecture
//!
//! - **model**: `Model` trait and serializable parameter state
//! - **loss**: loss functions (MSE, categorical cross-entropy)
//! - **optim**: optimizers (SGD with momentum)
//! - **metrics**: running accumulators (mean, categorical accuracy)
//! - **data**: batch driver and on-disk image tensor store
//! - **io**: checkpoint persistence (JSON)
//! - **train**: classification and regression trainers

pub mod data;
pub mod io;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod optim;
pub mod train;

pub mod error;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{Model, ModelState};
pub use train::{ClassificationTrainer, FitSummary, RegressionTrainer, TrainConfig};
