//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use ndarray::Array1;

/// SGD optimizer with optional momentum
pub struct SGD {
    lr: f32,
    momentum: f32,
    velocities: Vec<Option<Array1<f32>>>,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self {
            lr,
            momentum,
            velocities: Vec::new(),
        }
    }

    /// Initialize velocities if needed
    fn ensure_velocities(&mut self, n: usize) {
        if self.velocities.is_empty() {
            self.velocities = (0..n).map(|_| None).collect();
        }
    }
}

impl Default for SGD {
    /// Plain SGD at lr 0.1
    fn default() -> Self {
        Self::new(0.1, 0.0)
    }
}

impl Optimizer for SGD {
    fn apply(&mut self, grads: &[Array1<f32>], params: &mut [&mut Array1<f32>]) {
        assert_eq!(
            grads.len(),
            params.len(),
            "One gradient per parameter required"
        );
        self.ensure_velocities(params.len());

        for (i, (param, grad)) in params.iter_mut().zip(grads).enumerate() {
            if self.momentum > 0.0 {
                // v = momentum * v - lr * grad
                let velocity = if let Some(v) = &self.velocities[i] {
                    v * self.momentum - grad * self.lr
                } else {
                    grad * (-self.lr)
                };

                **param = &**param + &velocity;
                self.velocities[i] = Some(velocity);
            } else {
                // Simple SGD: param -= lr * grad
                **param = &**param - &(grad * self.lr);
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_sgd_step_moves_against_gradient() {
        let mut sgd = SGD::new(0.1, 0.0);
        let mut param = array![1.0, 2.0];
        let grads = vec![array![1.0, -1.0]];

        sgd.apply(&grads, &mut [&mut param]);

        assert_relative_eq!(param[0], 0.9, epsilon = 1e-6);
        assert_relative_eq!(param[1], 2.1, epsilon = 1e-6);
    }

    #[test]
    fn test_sgd_momentum_accumulates() {
        let mut sgd = SGD::new(0.1, 0.9);
        let mut param = array![0.0];
        let grads = vec![array![1.0]];

        sgd.apply(&grads, &mut [&mut param]);
        let after_first = param[0];
        sgd.apply(&grads, &mut [&mut param]);

        // Second step is larger: v2 = 0.9 * v1 - lr * g
        assert_relative_eq!(after_first, -0.1, epsilon = 1e-6);
        assert_relative_eq!(param[0], -0.1 - 0.19, epsilon = 1e-6);
    }

    #[test]
    fn test_sgd_set_lr() {
        let mut sgd = SGD::new(0.1, 0.0);
        sgd.set_lr(0.01);
        assert_relative_eq!(sgd.lr(), 0.01);
    }

    #[test]
    #[should_panic(expected = "One gradient per parameter")]
    fn test_sgd_mismatched_lengths() {
        let mut sgd = SGD::new(0.1, 0.0);
        let mut param = array![1.0];
        sgd.apply(&[], &mut [&mut param]);
    }
}
