//! Training configuration and run summary

/// Training configuration
#[derive(Clone, Debug)]
pub struct TrainConfig {
    /// Number of epochs to run
    pub epochs: usize,

    /// Samples per batch
    pub batch_size: usize,

    /// Consecutive non-improving epochs tolerated before stopping
    pub patience: usize,

    /// Whether the early-stopping check runs at each epoch end
    pub early_stopping: bool,

    /// Drop the trailing batch smaller than `batch_size` instead of
    /// visiting it
    pub drop_last: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            batch_size: 32,
            patience: 4,
            early_stopping: false,
            drop_last: false,
        }
    }
}

impl TrainConfig {
    /// Create a new training configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the epoch count
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enable early stopping with the given patience budget
    pub fn with_early_stopping(mut self, patience: usize) -> Self {
        self.early_stopping = true;
        self.patience = patience;
        self
    }

    /// Drop trailing partial batches (floor-division batching)
    pub fn with_drop_last(mut self) -> Self {
        self.drop_last = true;
        self
    }
}

/// Result of a training run
#[derive(Debug, Clone)]
pub struct FitSummary {
    /// Epochs completed
    pub epochs_run: usize,
    /// Validation loss of the last completed epoch
    pub final_val_loss: f32,
    /// Best validation loss observed
    pub best_val_loss: f32,
    /// Whether the early-stopping check halted the run
    pub stopped_early: bool,
}
