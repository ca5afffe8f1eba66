//! Loss functions
//!
//! All losses take `(targets, predictions)` in that order and reduce to a
//! single scalar over the batch. `grad_predictions` returns the gradient of
//! that scalar with respect to every prediction entry, which the trainer
//! hands to [`Model::backward`](crate::Model::backward).

use ndarray::{Array1, Array2, Axis};

/// Trait for loss functions
pub trait Loss {
    /// Scalar loss over the batch
    fn compute(&self, targets: &Array2<f32>, predictions: &Array2<f32>) -> f32;

    /// Gradient of the batch loss with respect to the predictions
    fn grad_predictions(&self, targets: &Array2<f32>, predictions: &Array2<f32>) -> Array2<f32>;

    /// Name of the loss function
    fn name(&self) -> &str;
}

fn assert_same_shape(targets: &Array2<f32>, predictions: &Array2<f32>) {
    assert_eq!(
        targets.dim(),
        predictions.dim(),
        "Targets and predictions must have the same shape"
    );
}

/// Mean Squared Error Loss
///
/// L = mean((predictions - targets)²) over every entry in the batch.
pub struct MeanSquaredError;

impl Loss for MeanSquaredError {
    fn compute(&self, targets: &Array2<f32>, predictions: &Array2<f32>) -> f32 {
        assert_same_shape(targets, predictions);
        let diff = predictions - targets;
        (&diff * &diff).mean().unwrap_or(0.0)
    }

    fn grad_predictions(&self, targets: &Array2<f32>, predictions: &Array2<f32>) -> Array2<f32> {
        assert_same_shape(targets, predictions);
        // d(MSE)/d(pred) = 2 * (pred - target) / n
        let n = predictions.len() as f32;
        (predictions - targets) * (2.0 / n)
    }

    fn name(&self) -> &str {
        "MSE"
    }
}

/// Categorical Cross-Entropy Loss (for one-hot classification)
///
/// L = mean over rows of -sum(targets * log(softmax(predictions)))
pub struct CategoricalCrossEntropy;

impl CategoricalCrossEntropy {
    /// Row-wise softmax: exp(x_i - max) / sum(exp(x_j - max))
    pub(crate) fn softmax_rows(logits: &Array2<f32>) -> Array2<f32> {
        let mut probs = logits.clone();
        for mut row in probs.rows_mut() {
            let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
            row.mapv_inplace(|v| (v - max).exp());
            let sum: f32 = row.sum();
            row.mapv_inplace(|v| v / sum);
        }
        probs
    }
}

impl Loss for CategoricalCrossEntropy {
    fn compute(&self, targets: &Array2<f32>, predictions: &Array2<f32>) -> f32 {
        assert_same_shape(targets, predictions);
        let probs = Self::softmax_rows(predictions);
        let rows = targets.nrows().max(1) as f32;

        let ce: f32 = targets
            .iter()
            .zip(probs.iter())
            .map(|(&t, &p)| -t * (p + 1e-10).ln())
            .sum();
        ce / rows
    }

    fn grad_predictions(&self, targets: &Array2<f32>, predictions: &Array2<f32>) -> Array2<f32> {
        assert_same_shape(targets, predictions);
        // d(CE)/d(logits) = (softmax(logits) - targets) / rows
        let rows = targets.nrows().max(1) as f32;
        (Self::softmax_rows(predictions) - targets) / rows
    }

    fn name(&self) -> &str {
        "CategoricalCrossEntropy"
    }
}

/// Argmax of each row, used by the accuracy metric
pub(crate) fn argmax_rows(values: &Array2<f32>) -> Array1<usize> {
    values.map_axis(Axis(1), |row| {
        row.iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |(bi, bv), (i, &v)| {
                if v > bv {
                    (i, v)
                } else {
                    (bi, bv)
                }
            })
            .0
    })
}
