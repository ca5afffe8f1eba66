//! Optimizer trait

use ndarray::Array1;

/// Trait for optimization algorithms
///
/// `apply` consumes one gradient per parameter, in parameter order, and
/// updates the parameters in place. Gradients come from
/// [`Model::backward`](crate::Model::backward); the trainer guarantees the
/// two slices line up.
pub trait Optimizer {
    /// Apply one update step
    fn apply(&mut self, grads: &[Array1<f32>], params: &mut [&mut Array1<f32>]);

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);
}
