//! ---
//! cetk_section: "12-forecasting"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Rolling forecast engine and model runtime."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Per-feature linear scalers fitted offline alongside the model.

use std::{fs, path::Path};

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::errors::{ForecastError, Result};

pub trait Normalizer: Send + Sync {
    /// Number of columns the scaler was fitted on.
    fn features(&self) -> usize;

    /// Scales each column of `window` independently. No clamping.
    fn transform(&self, window: &DMatrix<f64>) -> Result<DMatrix<f64>>;

    /// Maps one normalized scalar back to the fitted units.
    fn inverse_transform(&self, value: f64) -> Result<f64>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    /// `x * scale + min`
    MinMax { scale: Vec<f64>, min: Vec<f64> },
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
}

impl FittedScaler {
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let scaler: FittedScaler = serde_json::from_str(&data)?;
        scaler.check()?;
        Ok(scaler)
    }

    /// Lengths agree and every scale is usable in both directions.
    pub fn check(&self) -> Result<()> {
        let (scale, offset) = self.parts();
        if scale.is_empty() || scale.len() != offset.len() {
            return Err(ForecastError::shape(
                "scaler",
                format!("{} offsets", scale.len()),
                offset.len(),
            ));
        }
        if scale.iter().chain(offset).any(|value| !value.is_finite()) {
            return Err(ForecastError::ModelUnavailable(
                "scaler contains non-finite parameters".to_owned(),
            ));
        }
        if scale.iter().any(|value| *value == 0.0) {
            return Err(ForecastError::ModelUnavailable(
                "scaler has a zero scale".to_owned(),
            ));
        }
        Ok(())
    }

    fn parts(&self) -> (&[f64], &[f64]) {
        match self {
            FittedScaler::MinMax { scale, min } => (scale.as_slice(), min.as_slice()),
            FittedScaler::Standard { mean, scale } => (scale.as_slice(), mean.as_slice()),
        }
    }

    fn forward(&self, feature: usize, value: f64) -> f64 {
        match self {
            FittedScaler::MinMax { scale, min } => value * scale[feature] + min[feature],
            FittedScaler::Standard { mean, scale } => (value - mean[feature]) / scale[feature],
        }
    }

    fn backward(&self, feature: usize, value: f64) -> f64 {
        match self {
            FittedScaler::MinMax { scale, min } => (value - min[feature]) / scale[feature],
            FittedScaler::Standard { mean, scale } => value * scale[feature] + mean[feature],
        }
    }
}

impl Normalizer for FittedScaler {
    fn features(&self) -> usize {
        self.parts().0.len()
    }

    fn transform(&self, window: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if window.ncols() != self.features() {
            return Err(ForecastError::shape(
                "input scaler",
                format!("{} columns", self.features()),
                format!("{} columns", window.ncols()),
            ));
        }
        Ok(DMatrix::from_fn(window.nrows(), window.ncols(), |row, col| {
            self.forward(col, window[(row, col)])
        }))
    }

    fn inverse_transform(&self, value: f64) -> Result<f64> {
        if self.features() != 1 {
            return Err(ForecastError::shape(
                "output scaler",
                "1 feature",
                format!("{} features", self.features()),
            ));
        }
        Ok(self.backward(0, value))
    }
}
