//! ---
//! cetk_section: "12-forecasting"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Rolling forecast engine and model runtime."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Inference-only runtime for the stacked LSTM energy regressor.
//!
//! Weights use the Keras layout: kernels are `input × 4·units`, gate blocks
//! are ordered input, forget, cell, output, and the recurrent activation is
//! the logistic sigmoid.

use std::{fs, path::Path};

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ForecastError, Result};

/// A model mapping a `(timesteps, features)` window to one scalar.
pub trait SequenceModel: Send + Sync {
    fn input_shape(&self) -> (usize, usize);

    fn predict(&self, window: &DMatrix<f64>) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Tanh,
    Sigmoid,
}

impl Activation {
    fn apply(self, value: f64) -> f64 {
        match self {
            Activation::Linear => value,
            Activation::Relu => value.max(0.0),
            Activation::Tanh => value.tanh(),
            Activation::Sigmoid => sigmoid(value),
        }
    }
}

/// Persisted form of the regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub window_months: usize,
    pub features: usize,
    pub lstm: Vec<LstmLayerArtifact>,
    #[serde(default)]
    pub dense: Vec<DenseLayerArtifact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmLayerArtifact {
    pub units: usize,
    pub kernel: Vec<Vec<f64>>,
    pub recurrent_kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayerArtifact {
    pub activation: Activation,
    pub kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

#[derive(Debug, Clone)]
struct LstmLayer {
    units: usize,
    kernel: DMatrix<f64>,
    recurrent: DMatrix<f64>,
    bias: DVector<f64>,
}

impl LstmLayer {
    /// Runs the layer over `inputs` and returns the hidden state at every step.
    fn forward(&self, inputs: &[DVector<f64>]) -> Vec<DVector<f64>> {
        let units = self.units;
        let mut hidden = DVector::<f64>::zeros(units);
        let mut cell = DVector::<f64>::zeros(units);
        let mut outputs = Vec::with_capacity(inputs.len());

        for input in inputs {
            let z = self.kernel.tr_mul(input) + self.recurrent.tr_mul(&hidden) + &self.bias;
            let input_gate = z.rows(0, units).map(sigmoid);
            let forget_gate = z.rows(units, units).map(sigmoid);
            let candidate = z.rows(2 * units, units).map(f64::tanh);
            let output_gate = z.rows(3 * units, units).map(sigmoid);

            cell = forget_gate.component_mul(&cell) + input_gate.component_mul(&candidate);
            hidden = output_gate.component_mul(&cell.map(f64::tanh));
            outputs.push(hidden.clone());
        }
        outputs
    }
}

#[derive(Debug, Clone)]
struct DenseLayer {
    activation: Activation,
    kernel: DMatrix<f64>,
    bias: DVector<f64>,
}

impl DenseLayer {
    fn forward(&self, input: &DVector<f64>) -> DVector<f64> {
        (self.kernel.tr_mul(input) + &self.bias).map(|value| self.activation.apply(value))
    }
}

/// Stacked LSTM followed by dense layers, ending in a single output unit.
#[derive(Debug, Clone)]
pub struct LstmRegressor {
    window_months: usize,
    features: usize,
    lstm: Vec<LstmLayer>,
    dense: Vec<DenseLayer>,
}

impl LstmRegressor {
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&data)?;
        let model = Self::try_from(artifact)?;
        debug!(
            path = %path.display(),
            lstm_layers = model.lstm.len(),
            dense_layers = model.dense.len(),
            "LSTM regressor loaded"
        );
        Ok(model)
    }
}

impl TryFrom<ModelArtifact> for LstmRegressor {
    type Error = ForecastError;

    fn try_from(artifact: ModelArtifact) -> Result<Self> {
        if artifact.lstm.is_empty() {
            return Err(ForecastError::ModelUnavailable(
                "model artifact has no LSTM layers".to_owned(),
            ));
        }

        let mut width = artifact.features;
        let mut lstm = Vec::with_capacity(artifact.lstm.len());
        for (index, layer) in artifact.lstm.into_iter().enumerate() {
            let gates = 4 * layer.units;
            let component = "lstm layer";
            let kernel = matrix(component, &layer.kernel, width, gates)?;
            let recurrent = matrix(component, &layer.recurrent_kernel, layer.units, gates)?;
            let bias = vector(component, layer.bias, gates)?;
            debug!(index, units = layer.units, "lstm layer shaped");
            width = layer.units;
            lstm.push(LstmLayer {
                units: layer.units,
                kernel,
                recurrent,
                bias,
            });
        }

        let mut dense = Vec::with_capacity(artifact.dense.len());
        for layer in artifact.dense {
            let outputs = layer.bias.len();
            let kernel = matrix("dense layer", &layer.kernel, width, outputs)?;
            let bias = vector("dense layer", layer.bias, outputs)?;
            width = outputs;
            dense.push(DenseLayer {
                activation: layer.activation,
                kernel,
                bias,
            });
        }

        if width != 1 {
            return Err(ForecastError::shape("model output", "1 unit", format!("{width} units")));
        }

        Ok(Self {
            window_months: artifact.window_months,
            features: artifact.features,
            lstm,
            dense,
        })
    }
}

impl SequenceModel for LstmRegressor {
    fn input_shape(&self) -> (usize, usize) {
        (self.window_months, self.features)
    }

    fn predict(&self, window: &DMatrix<f64>) -> Result<f64> {
        if window.shape() != self.input_shape() {
            return Err(ForecastError::shape(
                "model input",
                format!("{:?}", self.input_shape()),
                format!("{:?}", window.shape()),
            ));
        }

        let mut sequence: Vec<DVector<f64>> = window
            .row_iter()
            .map(|row| row.transpose())
            .collect();
        for layer in &self.lstm {
            sequence = layer.forward(&sequence);
        }
        let mut activations = sequence
            .pop()
            .ok_or_else(|| ForecastError::shape("model input", "at least 1 timestep", 0))?;
        for layer in &self.dense {
            activations = layer.forward(&activations);
        }
        Ok(activations[0])
    }
}

fn sigmoid(value: f64) -> f64 {
    1.0 / (1.0 + (-value).exp())
}

fn matrix(
    component: &'static str,
    rows: &[Vec<f64>],
    expected_rows: usize,
    expected_cols: usize,
) -> Result<DMatrix<f64>> {
    if rows.len() != expected_rows || rows.iter().any(|row| row.len() != expected_cols) {
        let actual_cols = rows.first().map(Vec::len).unwrap_or(0);
        return Err(ForecastError::shape(
            component,
            format!("{expected_rows}x{expected_cols}"),
            format!("{}x{}", rows.len(), actual_cols),
        ));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(DMatrix::from_row_slice(expected_rows, expected_cols, &flat))
}

fn vector(component: &'static str, values: Vec<f64>, expected: usize) -> Result<DVector<f64>> {
    if values.len() != expected {
        return Err(ForecastError::shape(
            component,
            format!("{expected} bias terms"),
            values.len(),
        ));
    }
    Ok(DVector::from_vec(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_lstm(features: usize, units: usize) -> LstmLayerArtifact {
        LstmLayerArtifact {
            units,
            kernel: vec![vec![0.0; 4 * units]; features],
            recurrent_kernel: vec![vec![0.0; 4 * units]; units],
            bias: vec![0.0; 4 * units],
        }
    }

    fn constant_artifact(output: f64) -> ModelArtifact {
        ModelArtifact {
            window_months: 12,
            features: 2,
            lstm: vec![zero_lstm(2, 3), zero_lstm(3, 2)],
            dense: vec![DenseLayerArtifact {
                activation: Activation::Linear,
                kernel: vec![vec![0.0]; 2],
                bias: vec![output],
            }],
        }
    }

    #[test]
    fn zero_weights_yield_dense_bias() {
        let model = LstmRegressor::try_from(constant_artifact(0.5)).unwrap();
        let window = DMatrix::from_element(12, 2, 0.3);
        assert_eq!(model.predict(&window).unwrap(), 0.5);
        assert_eq!(model.input_shape(), (12, 2));
    }

    #[test]
    fn single_cell_matches_hand_computation() {
        // One unit, one feature, every gate weight 1 and bias 0.
        let artifact = ModelArtifact {
            window_months: 1,
            features: 1,
            lstm: vec![LstmLayerArtifact {
                units: 1,
                kernel: vec![vec![1.0; 4]],
                recurrent_kernel: vec![vec![1.0; 4]],
                bias: vec![0.0; 4],
            }],
            dense: Vec::new(),
        };
        let model = LstmRegressor::try_from(artifact).unwrap();
        let x: f64 = 0.5;
        let cell = sigmoid(x) * x.tanh();
        let expected = sigmoid(x) * cell.tanh();
        let predicted = model.predict(&DMatrix::from_element(1, 1, x)).unwrap();
        assert!((predicted - expected).abs() < 1e-12);
    }

    #[test]
    fn recurrence_carries_state_between_steps() {
        let artifact = ModelArtifact {
            window_months: 2,
            features: 1,
            lstm: vec![LstmLayerArtifact {
                units: 1,
                kernel: vec![vec![1.0; 4]],
                recurrent_kernel: vec![vec![0.0; 4]],
                bias: vec![0.0; 4],
            }],
            dense: Vec::new(),
        };
        let model = LstmRegressor::try_from(artifact).unwrap();
        let early = model
            .predict(&DMatrix::from_column_slice(2, 1, &[1.0, 0.0]))
            .unwrap();
        let none = model
            .predict(&DMatrix::from_column_slice(2, 1, &[0.0, 0.0]))
            .unwrap();
        assert!(early > none);
    }

    #[test]
    fn relu_clips_negative_outputs() {
        let mut artifact = constant_artifact(-2.0);
        artifact.dense[0].activation = Activation::Relu;
        let model = LstmRegressor::try_from(artifact).unwrap();
        assert_eq!(model.predict(&DMatrix::zeros(12, 2)).unwrap(), 0.0);
    }

    #[test]
    fn malformed_artifacts_are_rejected() {
        let mut wrong_kernel = constant_artifact(0.0);
        wrong_kernel.lstm[0].kernel.pop();
        assert!(matches!(
            LstmRegressor::try_from(wrong_kernel),
            Err(ForecastError::ShapeMismatch { .. })
        ));

        let mut wide_output = constant_artifact(0.0);
        wide_output.dense[0].kernel = vec![vec![0.0, 0.0]; 2];
        wide_output.dense[0].bias = vec![0.0, 0.0];
        assert!(LstmRegressor::try_from(wide_output).is_err());

        let empty = ModelArtifact {
            lstm: Vec::new(),
            ..constant_artifact(0.0)
        };
        assert!(matches!(
            LstmRegressor::try_from(empty),
            Err(ForecastError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn wrong_window_shape_is_rejected() {
        let model = LstmRegressor::try_from(constant_artifact(0.0)).unwrap();
        assert!(matches!(
            model.predict(&DMatrix::zeros(11, 2)),
            Err(ForecastError::ShapeMismatch { .. })
        ));
    }
}
