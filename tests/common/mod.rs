//! Shared test fixture: a single dense layer with analytic gradients

// Not every test binary uses every helper
#![allow(dead_code)]

use adiestrar::model::{Model, ModelState};
use adiestrar::{Error, Result};
use ndarray::{Array1, Array2, ArrayD, ArrayView2, Axis};
use std::cell::Cell;

/// Linear layer `y = x W^T + b` over inputs flattened to `(n, input_dim)`.
///
/// Weight is stored flat in row-major `(output_dim, input_dim)` order so the
/// harness sees exactly two parameter arrays.
pub struct DenseModel {
    pub input_dim: usize,
    pub output_dim: usize,
    weight: Array1<f32>,
    bias: Array1<f32>,
    forward_calls: Cell<usize>,
}

impl DenseModel {
    /// Deterministic non-zero initialization
    pub fn new(input_dim: usize, output_dim: usize) -> Self {
        let weight = Array1::from_shape_fn(input_dim * output_dim, |i| {
            ((i % 7) as f32 - 3.0) * 0.1
        });
        Self {
            input_dim,
            output_dim,
            weight,
            bias: Array1::zeros(output_dim),
            forward_calls: Cell::new(0),
        }
    }

    pub fn with_weights(mut self, weight: Vec<f32>, bias: Vec<f32>) -> Self {
        assert_eq!(weight.len(), self.input_dim * self.output_dim);
        assert_eq!(bias.len(), self.output_dim);
        self.weight = Array1::from(weight);
        self.bias = Array1::from(bias);
        self
    }

    /// Number of forward passes issued so far
    pub fn forward_calls(&self) -> usize {
        self.forward_calls.get()
    }

    fn architecture(&self) -> String {
        format!("dense-{}x{}", self.output_dim, self.input_dim)
    }

    fn flatten<'a>(&self, inputs: &'a ArrayD<f32>) -> ArrayView2<'a, f32> {
        let n = inputs.len_of(Axis(0));
        let d = if n == 0 { 0 } else { inputs.len() / n };
        assert_eq!(d, self.input_dim, "input batch does not flatten to input_dim");
        inputs
            .view()
            .into_shape((n, d))
            .expect("contiguous input batch")
    }

    fn weight_matrix(&self) -> ArrayView2<'_, f32> {
        self.weight
            .view()
            .into_shape((self.output_dim, self.input_dim))
            .expect("contiguous weight")
    }
}

impl Model for DenseModel {
    fn forward(&self, inputs: &ArrayD<f32>) -> Array2<f32> {
        self.forward_calls.set(self.forward_calls.get() + 1);
        let x = self.flatten(inputs);
        let mut preds = x.dot(&self.weight_matrix().t());
        preds += &self.bias;
        preds
    }

    fn backward(&self, inputs: &ArrayD<f32>, grad_predictions: &Array2<f32>) -> Vec<Array1<f32>> {
        let x = self.flatten(inputs);
        // dL/dW = G^T X, dL/db = column sums of G
        let grad_w = grad_predictions.t().dot(&x);
        let grad_b = grad_predictions.sum_axis(Axis(0));
        vec![
            Array1::from_iter(grad_w.iter().copied()),
            grad_b,
        ]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Array1<f32>> {
        vec![&mut self.weight, &mut self.bias]
    }

    fn state(&self) -> ModelState {
        let mut state = ModelState::new(self.architecture());
        state.push(
            "weight",
            vec![self.output_dim, self.input_dim],
            self.weight.as_slice().unwrap(),
        );
        state.push("bias", vec![self.output_dim], self.bias.as_slice().unwrap());
        state
    }

    fn load_state(&mut self, state: ModelState) -> Result<()> {
        if state.architecture != self.architecture() {
            return Err(Error::InvalidParameter(format!(
                "checkpoint architecture `{}` does not match `{}`",
                state.architecture,
                self.architecture()
            )));
        }
        let parts = state.unflatten()?;
        if parts.len() != 2 {
            return Err(Error::InvalidParameter(format!(
                "expected 2 parameters, got {}",
                parts.len()
            )));
        }
        self.weight = Array1::from(parts[0].1.to_vec());
        self.bias = Array1::from(parts[1].1.to_vec());
        Ok(())
    }
}
