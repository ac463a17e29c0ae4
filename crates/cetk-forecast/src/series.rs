//! ---
//! cetk_section: "12-forecasting"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Rolling forecast engine and model runtime."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use cetk_sim::{ClimateMonthlyPoint, ClimateScenario};
use serde::{Deserialize, Serialize};

/// Annual household consumption used to express energy as homes supplied.
pub const HOUSEHOLD_ANNUAL_MWH: f64 = 7.2;

/// Fixed share of output attributed to each source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceRatio {
    pub waterfall: f64,
    pub geothermal: f64,
}

impl SourceRatio {
    /// `source / total`, or an even split when the total is zero.
    pub fn from_power(waterfall_mw: f64, geothermal_mw: f64, total_mw: f64) -> Self {
        if total_mw > 0.0 {
            Self {
                waterfall: waterfall_mw / total_mw,
                geothermal: geothermal_mw / total_mw,
            }
        } else {
            Self {
                waterfall: 0.5,
                geothermal: 0.5,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceBreakdown {
    pub waterfall_mwh: f64,
    pub geothermal_mwh: f64,
    pub waterfall_mw: f64,
    pub geothermal_mw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastStep {
    pub month_label: String,
    pub climate_input: ClimateMonthlyPoint,
    pub predicted_energy_mwh: f64,
    pub power_mw: f64,
    pub confidence_lower_mwh: f64,
    pub confidence_upper_mwh: f64,
    pub breakdown: SourceBreakdown,
}

impl ForecastStep {
    pub fn households(&self) -> u64 {
        households(self.predicted_energy_mwh)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub location: String,
    pub climate_scenario: ClimateScenario,
    pub capacity_mw: f64,
    pub source_ratio: SourceRatio,
    pub steps: Vec<ForecastStep>,
    pub total_annual_mwh: f64,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn average_power_mw(&self) -> f64 {
        mean(self.steps.iter().map(|step| step.power_mw))
    }

    pub fn average_monthly_mwh(&self) -> f64 {
        mean(self.steps.iter().map(|step| step.predicted_energy_mwh))
    }

    /// Step with the highest power; the earliest wins a tie.
    pub fn peak_step(&self) -> Option<&ForecastStep> {
        self.steps.iter().fold(None, |best, step| match best {
            Some(current) if current.power_mw >= step.power_mw => Some(current),
            _ => Some(step),
        })
    }

    /// Households the whole forecast period's energy would supply.
    pub fn households_powered(&self) -> u64 {
        households(self.total_annual_mwh)
    }

    /// Percentage difference from a static annual estimate, 0 when it is 0.
    pub fn difference_from_baseline_pct(&self, baseline_annual_mwh: f64) -> f64 {
        if baseline_annual_mwh > 0.0 {
            (self.total_annual_mwh - baseline_annual_mwh) / baseline_annual_mwh * 100.0
        } else {
            0.0
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn households(mwh: f64) -> u64 {
    let value = (mwh * 1000.0 / HOUSEHOLD_ANNUAL_MWH).floor();
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}
