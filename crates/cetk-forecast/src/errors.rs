//! ---
//! cetk_section: "12-forecasting"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Rolling forecast engine and model runtime."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use cetk_sim::ClimateError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("forecast model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("forecast horizon {0} months is outside the supported range 3..=24")]
    InvalidHorizon(usize),
    #[error("capacity {0} MW must be finite and non-negative")]
    InvalidCapacity(f64),
    #[error("shape mismatch in {component}: expected {expected}, got {actual}")]
    ShapeMismatch {
        component: &'static str,
        expected: String,
        actual: String,
    },
    #[error("model produced a non-finite prediction at step {step}")]
    NonFinitePrediction { step: usize },
    #[error(transparent)]
    Climate(#[from] ClimateError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl ForecastError {
    pub(crate) fn shape(
        component: &'static str,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        ForecastError::ShapeMismatch {
            component,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
