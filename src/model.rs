//! Model collaborator trait and serializable parameter state

use crate::{Error, Result};
use ndarray::{Array1, Array2, ArrayD};
use serde::{Deserialize, Serialize};

/// Opaque trainable function mapping an input batch to prediction rows.
///
/// The harness never looks inside a model: forward evaluation,
/// backpropagation, and parameter layout are the implementor's business.
/// The only contracts are that `backward` returns one gradient per entry
/// of `parameters_mut`, in the same order, and that `state` /
/// `load_state` round-trip the full parameter set.
pub trait Model {
    /// Forward pass over a batch. Returns one prediction row per sample.
    fn forward(&self, inputs: &ArrayD<f32>) -> Array2<f32>;

    /// Backpropagate through the model: given the batch inputs and the
    /// gradient of the loss with respect to the predictions, return the
    /// gradient of the loss with respect to every trainable parameter.
    fn backward(&self, inputs: &ArrayD<f32>, grad_predictions: &Array2<f32>) -> Vec<Array1<f32>>;

    /// Trainable parameters, flattened, in a stable order. Mutated only by
    /// an optimizer during a step.
    fn parameters_mut(&mut self) -> Vec<&mut Array1<f32>>;

    /// Snapshot the current parameters for checkpointing.
    fn state(&self) -> ModelState;

    /// Replace the current parameters in place from a snapshot.
    fn load_state(&mut self, state: ModelState) -> Result<()>;
}

/// Shape and name of one serialized parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    pub shape: Vec<usize>,
}

/// Serializable model parameter state
///
/// Parameters are stored as a flat `data` buffer with per-parameter
/// shape/name records, concatenated in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelState {
    /// Architecture identifier, checked on load
    pub architecture: String,

    /// Parameter information, in order
    pub parameters: Vec<ParameterInfo>,

    /// Flattened parameter data
    pub data: Vec<f32>,
}

impl ModelState {
    /// Create an empty state for the given architecture
    pub fn new(architecture: impl Into<String>) -> Self {
        Self {
            architecture: architecture.into(),
            parameters: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Append one parameter's values
    pub fn push(&mut self, name: impl Into<String>, shape: Vec<usize>, values: &[f32]) {
        debug_assert_eq!(shape.iter().product::<usize>(), values.len());
        self.parameters.push(ParameterInfo {
            name: name.into(),
            shape,
        });
        self.data.extend_from_slice(values);
    }

    /// Split the flat buffer back into per-parameter slices, in order.
    ///
    /// Fails if the buffer length does not match the recorded shapes.
    pub fn unflatten(&self) -> Result<Vec<(&ParameterInfo, &[f32])>> {
        let mut offset = 0;
        let mut out = Vec::with_capacity(self.parameters.len());
        for info in &self.parameters {
            let size: usize = info.shape.iter().product();
            if offset + size > self.data.len() {
                return Err(Error::Serialization(format!(
                    "parameter `{}` extends past the data buffer ({} > {})",
                    info.name,
                    offset + size,
                    self.data.len()
                )));
            }
            out.push((info, &self.data[offset..offset + size]));
            offset += size;
        }
        if offset != self.data.len() {
            return Err(Error::Serialization(format!(
                "trailing data in parameter buffer ({} of {} consumed)",
                offset,
                self.data.len()
            )));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_push_and_unflatten() {
        let mut state = ModelState::new("linear");
        state.push("weight", vec![2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        state.push("bias", vec![2], &[0.1, 0.2]);

        let parts = state.unflatten().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0.name, "weight");
        assert_eq!(parts[0].1.len(), 6);
        assert_eq!(parts[1].0.name, "bias");
        assert_eq!(parts[1].1, &[0.1, 0.2]);
    }

    #[test]
    fn test_state_truncated_buffer() {
        let mut state = ModelState::new("linear");
        state.push("weight", vec![4], &[1.0, 2.0, 3.0, 4.0]);
        state.data.truncate(2);

        assert!(state.unflatten().is_err());
    }

    #[test]
    fn test_state_trailing_data() {
        let mut state = ModelState::new("linear");
        state.push("weight", vec![2], &[1.0, 2.0]);
        state.data.push(9.0);

        assert!(state.unflatten().is_err());
    }

    #[test]
    fn test_state_json_round_trip() {
        let mut state = ModelState::new("probe");
        state.push("w", vec![3], &[1.0, -2.0, 0.5]);

        let json = serde_json::to_string(&state).unwrap();
        let back: ModelState = serde_json::from_str(&json).unwrap();

        assert_eq!(back.architecture, "probe");
        assert_eq!(back.data, state.data);
        assert_eq!(back.parameters.len(), 1);
    }
}
