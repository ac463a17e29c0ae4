//! ---
//! cetk_section: "11-climate-simulation"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Climate scenario generation and monthly climate types."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use rand::prelude::*;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::climate::{ClimateMonthlyPoint, ClimateNormals, ClimateWindow, Month};
use crate::errors::{ClimateError, Result};
use crate::scenario::ClimateScenario;

pub const MIN_HORIZON_MONTHS: usize = 3;
pub const MAX_HORIZON_MONTHS: usize = 24;
pub const DEFAULT_JITTER_SEED: u64 = 42;

const TEMPERATURE_JITTER_SD: f64 = 0.05;
const RAINFALL_JITTER_SD: f64 = 0.10;

/// Number of forecast months, always within `3..=24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Horizon(usize);

impl Horizon {
    pub fn new(months: usize) -> Result<Self> {
        if (MIN_HORIZON_MONTHS..=MAX_HORIZON_MONTHS).contains(&months) {
            Ok(Self(months))
        } else {
            Err(ClimateError::InvalidHorizon(months))
        }
    }

    pub fn months(self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for Horizon {
    type Error = ClimateError;

    fn try_from(months: usize) -> Result<Self> {
        Self::new(months)
    }
}

impl From<Horizon> for usize {
    fn from(horizon: Horizon) -> Self {
        horizon.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub start_month: Month,
    pub horizon: Horizon,
    pub scenario: ClimateScenario,
}

impl ScenarioRequest {
    pub fn new(start_month: Month, horizon_months: usize, scenario: ClimateScenario) -> Result<Self> {
        Ok(Self {
            start_month,
            horizon: Horizon::new(horizon_months)?,
            scenario,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedMonth {
    /// `"<Mon> Y<k>"`, with `k` starting at 1 and incrementing each January.
    pub label: String,
    pub month: Month,
    pub year: usize,
    pub point: ClimateMonthlyPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateProjection {
    pub scenario: ClimateScenario,
    pub start_month: Month,
    pub seed_window: ClimateWindow,
    pub months: Vec<ProjectedMonth>,
}

impl ClimateProjection {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.months.iter().map(|month| month.label.as_str())
    }

    pub fn points(&self) -> impl Iterator<Item = ClimateMonthlyPoint> + '_ {
        self.months.iter().map(|month| month.point)
    }

    /// Replaces the synthetic seed with an observed window.
    pub fn with_seed_window(mut self, window: ClimateWindow) -> Self {
        self.seed_window = window;
        self
    }
}

/// Produces forward monthly climate sequences from a normals table.
///
/// Step `i` draws its jitter from an RNG seeded with `base_seed + i`, so a
/// given request always yields the same projection.
#[derive(Debug, Clone)]
pub struct ClimateScenarioGenerator {
    normals: ClimateNormals,
    base_seed: u64,
    temperature_jitter: Normal<f64>,
    rainfall_jitter: Normal<f64>,
}

impl Default for ClimateScenarioGenerator {
    fn default() -> Self {
        Self::new(ClimateNormals::default(), DEFAULT_JITTER_SEED)
    }
}

impl ClimateScenarioGenerator {
    pub fn new(normals: ClimateNormals, base_seed: u64) -> Self {
        Self {
            normals,
            base_seed,
            temperature_jitter: Normal::new(1.0, TEMPERATURE_JITTER_SD)
                .expect("sigma must be positive"),
            rainfall_jitter: Normal::new(1.0, RAINFALL_JITTER_SD).expect("sigma must be positive"),
        }
    }

    pub fn normals(&self) -> &ClimateNormals {
        &self.normals
    }

    pub fn generate(&self, request: &ScenarioRequest) -> ClimateProjection {
        let multiplier = request.scenario.multiplier();
        let months = (0..request.horizon.months())
            .map(|step| {
                let (month, crossings) = request.start_month.advance(step);
                let scaled = multiplier.apply(self.normals.get(month));
                let mut rng = StdRng::seed_from_u64(self.base_seed.wrapping_add(step as u64));
                let temperature = self.temperature_jitter.sample(&mut rng);
                let rainfall = self.rainfall_jitter.sample(&mut rng);
                ProjectedMonth {
                    label: format!("{month} Y{}", crossings + 1),
                    month,
                    year: crossings + 1,
                    point: ClimateMonthlyPoint::new(
                        scaled.temperature_c * temperature,
                        scaled.rainfall_mm * rainfall,
                    ),
                }
            })
            .collect::<Vec<_>>();

        debug!(
            scenario = %request.scenario,
            start = %request.start_month,
            months = months.len(),
            "climate projection generated"
        );

        ClimateProjection {
            scenario: request.scenario,
            start_month: request.start_month,
            seed_window: self.normals.seed_window(request.start_month),
            months,
        }
    }
}
