//! ---
//! cetk_section: "12-forecasting"
//! cetk_subsection: "bootstrap"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Forecast crate exports and convenience entry points."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Rolling multi-month energy forecasts.
//!
//! A pre-trained sequence model sees a 12-month climate window and predicts the
//! reference system's monthly energy. [`RollingForecastEngine`] rescales each
//! prediction to a site's capacity and slides the window forward through a
//! [`cetk_sim::ClimateProjection`].

pub mod engine;
pub mod errors;
pub mod export;
pub mod model;
pub mod normalizer;
pub mod resources;
pub mod series;

pub use engine::{
    CapacityProfile, RollingForecastEngine, CONFIDENCE_LOWER_FACTOR, CONFIDENCE_UPPER_FACTOR,
    HOURS_PER_MONTH, REFERENCE_MONTHLY_MWH,
};
pub use errors::{ForecastError, Result};
pub use export::{ForecastExporter, ForecastFiles, ForecastRecord, ForecastReport, MODEL_NAME};
pub use model::{LstmRegressor, SequenceModel};
pub use normalizer::{FittedScaler, Normalizer};
pub use resources::{
    shared_resources, ForecastResources, ModelArtifacts, ResourceCache, CLIMATE_FEATURES,
};
pub use series::{ForecastSeries, ForecastStep, SourceBreakdown, SourceRatio, HOUSEHOLD_ANNUAL_MWH};

use cetk_sim::{ClimateScenarioGenerator, ClimateWindow, ScenarioRequest};

/// Generates the climate projection for `request` and rolls the model over it.
///
/// `observed` replaces the synthetic seed window when present.
pub fn forecast(
    resources: &ForecastResources,
    profile: &CapacityProfile,
    generator: &ClimateScenarioGenerator,
    request: &ScenarioRequest,
    observed: Option<ClimateWindow>,
) -> Result<ForecastSeries> {
    let mut projection = generator.generate(request);
    if let Some(window) = observed {
        projection = projection.with_seed_window(window);
    }
    RollingForecastEngine::from_resources(resources).run(profile, &projection)
}
