//! ---
//! cetk_section: "12-forecasting"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Rolling forecast engine and model runtime."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use cetk_sim::WINDOW_MONTHS;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    errors::{ForecastError, Result},
    model::{LstmRegressor, SequenceModel},
    normalizer::{FittedScaler, Normalizer},
};

/// Climate features per month: temperature and rainfall.
pub const CLIMATE_FEATURES: usize = 2;

/// Locations of the persisted model and its two scalers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelArtifacts {
    pub model: PathBuf,
    pub input_scaler: PathBuf,
    pub output_scaler: PathBuf,
}

impl ModelArtifacts {
    pub fn new(
        model: impl Into<PathBuf>,
        input_scaler: impl Into<PathBuf>,
        output_scaler: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model: model.into(),
            input_scaler: input_scaler.into(),
            output_scaler: output_scaler.into(),
        }
    }

    /// Conventional file names inside one directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(
            dir.join("energy_predictor.json"),
            dir.join("scaler_x.json"),
            dir.join("scaler_y.json"),
        )
    }
}

/// The model and both scalers, shape-checked against each other.
pub struct ForecastResources {
    model: Box<dyn SequenceModel>,
    input: Box<dyn Normalizer>,
    output: Box<dyn Normalizer>,
}

impl fmt::Debug for ForecastResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastResources")
            .field("input_shape", &self.model.input_shape())
            .field("input_features", &self.input.features())
            .field("output_features", &self.output.features())
            .finish()
    }
}

impl ForecastResources {
    pub fn new(
        model: Box<dyn SequenceModel>,
        input: Box<dyn Normalizer>,
        output: Box<dyn Normalizer>,
    ) -> Result<Self> {
        let expected = (WINDOW_MONTHS, CLIMATE_FEATURES);
        if model.input_shape() != expected {
            return Err(ForecastError::shape(
                "model input",
                format!("{expected:?}"),
                format!("{:?}", model.input_shape()),
            ));
        }
        if input.features() != CLIMATE_FEATURES {
            return Err(ForecastError::shape(
                "input scaler",
                format!("{CLIMATE_FEATURES} features"),
                input.features(),
            ));
        }
        if output.features() != 1 {
            return Err(ForecastError::shape(
                "output scaler",
                "1 feature",
                output.features(),
            ));
        }
        Ok(Self {
            model,
            input,
            output,
        })
    }

    /// Loads all three artifacts. Any failure is reported as `ModelUnavailable`.
    pub fn load(artifacts: &ModelArtifacts) -> Result<Self> {
        let model = LstmRegressor::from_path(&artifacts.model)
            .map_err(|err| unavailable(&artifacts.model, err))?;
        let input = FittedScaler::from_path(&artifacts.input_scaler)
            .map_err(|err| unavailable(&artifacts.input_scaler, err))?;
        let output = FittedScaler::from_path(&artifacts.output_scaler)
            .map_err(|err| unavailable(&artifacts.output_scaler, err))?;
        let resources = Self::new(Box::new(model), Box::new(input), Box::new(output))
            .map_err(|err| ForecastError::ModelUnavailable(err.to_string()))?;
        info!(model = %artifacts.model.display(), "forecast model loaded");
        Ok(resources)
    }

    pub fn model(&self) -> &dyn SequenceModel {
        self.model.as_ref()
    }

    pub fn input_normalizer(&self) -> &dyn Normalizer {
        self.input.as_ref()
    }

    pub fn output_normalizer(&self) -> &dyn Normalizer {
        self.output.as_ref()
    }
}

fn unavailable(path: &Path, err: ForecastError) -> ForecastError {
    warn!(path = %path.display(), error = %err, "forecast artifact failed to load");
    match err {
        ForecastError::ModelUnavailable(reason) => {
            ForecastError::ModelUnavailable(format!("{}: {reason}", path.display()))
        }
        other => ForecastError::ModelUnavailable(format!("{}: {other}", path.display())),
    }
}

/// Load-once holder for [`ForecastResources`].
///
/// The first successful load is kept for the lifetime of the cache; later
/// calls reuse it whatever artifacts they name. A failed load stores nothing,
/// so the next call retries.
#[derive(Debug, Default)]
pub struct ResourceCache {
    cell: OnceCell<Arc<ForecastResources>>,
}

impl ResourceCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get_or_load(&self, artifacts: &ModelArtifacts) -> Result<Arc<ForecastResources>> {
        self.get_or_try_init(|| ForecastResources::load(artifacts))
    }

    pub fn get_or_try_init<F>(&self, init: F) -> Result<Arc<ForecastResources>>
    where
        F: FnOnce() -> Result<ForecastResources>,
    {
        self.cell
            .get_or_try_init(|| init().map(Arc::new))
            .map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

static SHARED: ResourceCache = ResourceCache::new();

/// Process-wide cache used by the CLI and the session layer.
pub fn shared_resources(artifacts: &ModelArtifacts) -> Result<Arc<ForecastResources>> {
    SHARED.get_or_load(artifacts)
}
