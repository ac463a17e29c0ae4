//! ---
//! cetk_section: "11-climate-simulation"
//! cetk_subsection: "bootstrap"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Climate simulation module exports and shared types."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Monthly climate scenarios for the forecasting pipeline.
//!
//! The generator turns a start month, horizon and scenario tag into a seed
//! window plus a forward sequence of jittered monthly climate points. An
//! observed history can stand in for the synthetic seed window.

pub mod climate;
pub mod errors;
pub mod generator;
pub mod observations;
pub mod scenario;

pub use climate::{ClimateMonthlyPoint, ClimateNormals, ClimateWindow, Month, WINDOW_MONTHS};
pub use errors::{ClimateError, Result};
pub use generator::{
    ClimateProjection, ClimateScenarioGenerator, Horizon, ProjectedMonth, ScenarioRequest,
    DEFAULT_JITTER_SEED, MAX_HORIZON_MONTHS, MIN_HORIZON_MONTHS,
};
pub use observations::ObservedClimate;
pub use scenario::{ClimateScenario, ScenarioMultiplier};
