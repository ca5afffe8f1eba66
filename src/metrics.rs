//! Running metric accumulators
//!
//! Each accumulator combines per-batch values into a single summary since
//! its last `reset`. The trainers reset them at every epoch boundary.

use crate::loss::argmax_rows;
use ndarray::Array2;

/// Running arithmetic mean of scalar values
#[derive(Debug, Clone, Default)]
pub struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one value into the mean
    pub fn update(&mut self, value: f32) {
        self.sum += f64::from(value);
        self.count += 1;
    }

    /// Mean of all values since the last reset; 0.0 when empty
    pub fn result(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            (self.sum / self.count as f64) as f32
        }
    }

    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }

    /// Number of values folded in since the last reset
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Running match-rate between argmax of predictions and argmax of one-hot
/// targets
#[derive(Debug, Clone, Default)]
pub struct CategoricalAccuracy {
    matches: usize,
    total: usize,
}

impl CategoricalAccuracy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one batch of (targets, predictions) rows into the match-rate
    pub fn update(&mut self, targets: &Array2<f32>, predictions: &Array2<f32>) {
        assert_eq!(
            targets.dim(),
            predictions.dim(),
            "Targets and predictions must have the same shape"
        );
        let want = argmax_rows(targets);
        let got = argmax_rows(predictions);
        self.matches += want.iter().zip(got.iter()).filter(|(w, g)| w == g).count();
        self.total += targets.nrows();
    }

    /// Fraction of samples whose predicted class matched; 0.0 when empty
    pub fn result(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.matches as f32 / self.total as f32
        }
    }

    pub fn reset(&mut self) {
        self.matches = 0;
        self.total = 0;
    }
}
