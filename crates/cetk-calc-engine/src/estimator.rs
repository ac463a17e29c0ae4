//! ---
//! cetk_section: "08-energy-models"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Renewable potential estimation routines for community planning."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Closed-form power and annual energy estimates for the supported sources.
//!
//! Every function here is pure. Missing or invalid readings never fail: a
//! source that is not viable simply contributes zero.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{
    GeothermalReading, Location, PipeRecommendation, SiteParameters, WaterfallReading,
    GEO_FLUID_FLOW_KG_S, GRAVITY_M_S2, HOURS_PER_YEAR, HOUSEHOLD_ANNUAL_MWH,
    SURFACE_TEMPERATURE_C, WASTE_RECOVERY_FRACTION, WATER_DENSITY_KG_M3,
    WATER_SPECIFIC_HEAT_KJ_KG_C,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceEstimate {
    pub power_mw: f64,
    pub annual_energy_mwh: f64,
    pub households: u64,
}

impl SourceEstimate {
    fn from_power(power_mw: f64, capacity_factor: f64) -> Self {
        let annual_energy_mwh = power_mw * HOURS_PER_YEAR * capacity_factor;
        Self {
            power_mw,
            annual_energy_mwh,
            households: households_powered(annual_energy_mwh),
        }
    }
}

/// Geothermal output together with the intermediate thermal figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeothermalEstimate {
    pub thermal_power_kw: f64,
    #[serde(flatten)]
    pub output: SourceEstimate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    pub location: Location,
    pub waterfall: SourceEstimate,
    pub geothermal: GeothermalEstimate,
    pub has_waterfall: bool,
    pub has_geothermal: bool,
    #[serde(default)]
    pub pipe: Option<PipeRecommendation>,
    pub waste_recovered_mwh: f64,
    pub waste_households: u64,
    pub total_power_mw: f64,
    pub total_annual_mwh: f64,
    pub households_powered: u64,
}

impl EnergyEstimate {
    pub fn has_viable_source(&self) -> bool {
        self.has_waterfall || self.has_geothermal
    }

    /// Share of static power attributable to the waterfall and geothermal sources.
    ///
    /// Falls back to an even split when the site has no power at all.
    pub fn source_ratio(&self) -> (f64, f64) {
        source_ratio(
            self.waterfall.power_mw,
            self.geothermal.output.power_mw,
            self.total_power_mw,
        )
    }
}

/// Computes the full estimate for a site.
pub fn estimate(site: &SiteParameters) -> EnergyEstimate {
    let has_waterfall = site.waterfall.is_viable();
    let has_geothermal = site.geothermal.is_viable();

    let waterfall = if has_waterfall {
        SourceEstimate::from_power(waterfall_power_mw(&site.waterfall), 1.0)
    } else {
        SourceEstimate::default()
    };
    let geothermal = if has_geothermal {
        geothermal_estimate(&site.geothermal)
    } else {
        GeothermalEstimate::default()
    };
    let pipe = has_geothermal
        .then(|| PipeRecommendation::for_temperature(site.geothermal.temperature_c));

    let waste_recovered_mwh =
        waste_recovery_mwh(waterfall.annual_energy_mwh, geothermal.output.annual_energy_mwh);
    let total_power_mw = waterfall.power_mw + geothermal.output.power_mw;
    let total_annual_mwh = waterfall.annual_energy_mwh
        + geothermal.output.annual_energy_mwh
        + waste_recovered_mwh;

    debug!(
        location = %site.location.name,
        waterfall_mw = waterfall.power_mw,
        geothermal_mw = geothermal.output.power_mw,
        total_annual_mwh,
        "site estimate computed"
    );

    EnergyEstimate {
        location: site.location.clone(),
        waterfall,
        geothermal,
        has_waterfall,
        has_geothermal,
        pipe,
        waste_recovered_mwh,
        waste_households: households_powered(waste_recovered_mwh),
        total_power_mw,
        total_annual_mwh,
        households_powered: households_powered(total_annual_mwh),
    }
}

/// `P = ρ·g·Q·H·η / 1e6`, zero unless both flow and head are present.
pub fn waterfall_power_mw(reading: &WaterfallReading) -> f64 {
    if !reading.is_viable() {
        return 0.0;
    }
    WATER_DENSITY_KG_M3
        * GRAVITY_M_S2
        * reading.flow_rate_m3s
        * reading.height_m
        * reading.turbine_efficiency
        / 1_000_000.0
}

/// Thermal power extracted by the fixed-flow loop, in kW.
pub fn geothermal_thermal_power_kw(temperature_c: f64) -> f64 {
    GEO_FLUID_FLOW_KG_S * WATER_SPECIFIC_HEAT_KJ_KG_C * (temperature_c - SURFACE_TEMPERATURE_C)
}

pub fn geothermal_power_mw(reading: &GeothermalReading) -> f64 {
    if !reading.is_viable() {
        return 0.0;
    }
    geothermal_thermal_power_kw(reading.temperature_c) * reading.conversion_efficiency / 1000.0
}

pub fn geothermal_estimate(reading: &GeothermalReading) -> GeothermalEstimate {
    if !reading.is_viable() {
        return GeothermalEstimate::default();
    }
    GeothermalEstimate {
        thermal_power_kw: geothermal_thermal_power_kw(reading.temperature_c),
        output: SourceEstimate::from_power(geothermal_power_mw(reading), reading.capacity_factor),
    }
}

pub fn waste_recovery_mwh(waterfall_annual_mwh: f64, geothermal_annual_mwh: f64) -> f64 {
    WASTE_RECOVERY_FRACTION * (waterfall_annual_mwh + geothermal_annual_mwh)
}

/// Households supplied by an annual energy figure, assuming 7.2 MWh per household.
pub fn households_powered(annual_mwh: f64) -> u64 {
    let households = (annual_mwh * 1000.0 / HOUSEHOLD_ANNUAL_MWH).floor();
    if households.is_finite() && households > 0.0 {
        households as u64
    } else {
        0
    }
}

/// Static partition of total power between waterfall and geothermal.
pub fn source_ratio(waterfall_mw: f64, geothermal_mw: f64, total_mw: f64) -> (f64, f64) {
    if total_mw > 0.0 {
        (waterfall_mw / total_mw, geothermal_mw / total_mw)
    } else {
        (0.5, 0.5)
    }
}
