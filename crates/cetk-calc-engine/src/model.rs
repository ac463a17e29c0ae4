//! ---
//! cetk_section: "08-energy-models"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Renewable potential estimation routines for community planning."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::errors::{CalcEngineError, Result};

pub const WATER_DENSITY_KG_M3: f64 = 1000.0;
pub const GRAVITY_M_S2: f64 = 9.81;
/// Working-fluid flow rate assumed for every geothermal loop.
pub const GEO_FLUID_FLOW_KG_S: f64 = 50.0;
pub const WATER_SPECIFIC_HEAT_KJ_KG_C: f64 = 4.18;
pub const SURFACE_TEMPERATURE_C: f64 = 25.0;
pub const GEOTHERMAL_MIN_TEMPERATURE_C: f64 = 50.0;
pub const HOURS_PER_YEAR: f64 = 24.0 * 365.0;
pub const HOUSEHOLD_ANNUAL_MWH: f64 = 7.2;
pub const WASTE_RECOVERY_FRACTION: f64 = 0.05;

pub const DEFAULT_LATITUDE: f64 = 23.8103;
pub const DEFAULT_LONGITUDE: f64 = 90.4125;
pub const DEFAULT_TURBINE_EFFICIENCY: f64 = 0.9;
pub const DEFAULT_GEO_EFFICIENCY: f64 = 0.15;
pub const DEFAULT_CAPACITY_FACTOR: f64 = 0.85;
pub const DEFAULT_DEPTH_KM: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            name: "My Location".to_owned(),
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
        }
    }
}

impl Location {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CalcEngineError::MissingLocationName);
        }
        check_range("latitude", self.latitude, -90.0, 90.0)?;
        check_range("longitude", self.longitude, -180.0, 180.0)?;
        Ok(())
    }

    /// File-name friendly form of the location name.
    pub fn slug(&self) -> String {
        cetk_common::file_slug(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterfallReading {
    #[serde(default)]
    pub flow_rate_m3s: f64,
    #[serde(default)]
    pub height_m: f64,
    #[serde(default = "default_turbine_efficiency")]
    pub turbine_efficiency: f64,
}

impl Default for WaterfallReading {
    fn default() -> Self {
        Self {
            flow_rate_m3s: 0.0,
            height_m: 0.0,
            turbine_efficiency: DEFAULT_TURBINE_EFFICIENCY,
        }
    }
}

impl WaterfallReading {
    /// Both flow and head must be present for a turbine to produce anything.
    pub fn is_viable(&self) -> bool {
        is_positive(self.flow_rate_m3s) && is_positive(self.height_m)
    }

    pub fn validate(&self) -> Result<()> {
        check_range("turbine_efficiency", self.turbine_efficiency, 0.5, 0.95)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeothermalReading {
    #[serde(default)]
    pub temperature_c: f64,
    #[serde(default = "default_depth_km")]
    pub depth_km: f64,
    #[serde(default = "default_geo_efficiency")]
    pub conversion_efficiency: f64,
    #[serde(default = "default_capacity_factor")]
    pub capacity_factor: f64,
}

impl Default for GeothermalReading {
    fn default() -> Self {
        Self {
            temperature_c: 0.0,
            depth_km: DEFAULT_DEPTH_KM,
            conversion_efficiency: DEFAULT_GEO_EFFICIENCY,
            capacity_factor: DEFAULT_CAPACITY_FACTOR,
        }
    }
}

impl GeothermalReading {
    pub fn is_viable(&self) -> bool {
        self.temperature_c.is_finite() && self.temperature_c >= GEOTHERMAL_MIN_TEMPERATURE_C
    }

    pub fn validate(&self) -> Result<()> {
        check_range("depth_km", self.depth_km, 0.5, 10.0)?;
        check_range(
            "conversion_efficiency",
            self.conversion_efficiency,
            0.10,
            0.25,
        )?;
        check_range("capacity_factor", self.capacity_factor, 0.5, 0.95)?;
        Ok(())
    }

    /// Temperature rise per kilometre implied by the reading, relative to the surface.
    pub fn gradient_c_per_km(&self) -> f64 {
        if self.depth_km > 0.0 {
            (self.temperature_c - SURFACE_TEMPERATURE_C) / self.depth_km
        } else {
            0.0
        }
    }
}

/// Full parameter set for one candidate site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteParameters {
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub waterfall: WaterfallReading,
    #[serde(default)]
    pub geothermal: GeothermalReading,
}

impl SiteParameters {
    /// Rejects inputs the caller must re-collect. Missing source data is not an error here.
    pub fn validate(&self) -> Result<()> {
        self.location.validate()?;
        self.waterfall.validate()?;
        self.geothermal.validate()?;
        Ok(())
    }

    pub fn has_viable_source(&self) -> bool {
        self.waterfall.is_viable() || self.geothermal.is_viable()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipeMaterial {
    StainlessSteel,
    Inconel,
    CeramicComposite,
}

impl PipeMaterial {
    pub fn for_temperature(temperature_c: f64) -> Self {
        if temperature_c < 300.0 {
            PipeMaterial::StainlessSteel
        } else if temperature_c < 600.0 {
            PipeMaterial::Inconel
        } else {
            PipeMaterial::CeramicComposite
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PipeMaterial::StainlessSteel => "Stainless Steel / Incoloy",
            PipeMaterial::Inconel => "Inconel alloys / Nickel-chromium",
            PipeMaterial::CeramicComposite => "Ceramic composites / SiC / Titanium alloys",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            PipeMaterial::StainlessSteel => "Stainless Steel",
            PipeMaterial::Inconel => "Inconel alloys",
            PipeMaterial::CeramicComposite => "Ceramic composites",
        }
    }

    /// Cost multiplier relative to a stainless steel installation.
    pub fn relative_cost(&self) -> f64 {
        match self {
            PipeMaterial::StainlessSteel => 1.0,
            PipeMaterial::Inconel => 2.5,
            PipeMaterial::CeramicComposite => 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeRecommendation {
    pub material: PipeMaterial,
    pub description: String,
    pub relative_cost: f64,
}

impl PipeRecommendation {
    pub fn for_temperature(temperature_c: f64) -> Self {
        let material = PipeMaterial::for_temperature(temperature_c);
        Self {
            material,
            description: material.description().to_owned(),
            relative_cost: material.relative_cost(),
        }
    }
}

fn default_turbine_efficiency() -> f64 {
    DEFAULT_TURBINE_EFFICIENCY
}

fn default_geo_efficiency() -> f64 {
    DEFAULT_GEO_EFFICIENCY
}

fn default_capacity_factor() -> f64 {
    DEFAULT_CAPACITY_FACTOR
}

fn default_depth_km() -> f64 {
    DEFAULT_DEPTH_KM
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub(crate) fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(CalcEngineError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_material_tiers() {
        assert_eq!(PipeMaterial::for_temperature(200.0), PipeMaterial::StainlessSteel);
        assert_eq!(PipeMaterial::for_temperature(300.0), PipeMaterial::Inconel);
        assert_eq!(PipeMaterial::for_temperature(599.9), PipeMaterial::Inconel);
        assert_eq!(PipeMaterial::for_temperature(600.0), PipeMaterial::CeramicComposite);
        assert_eq!(PipeMaterial::CeramicComposite.relative_cost(), 5.0);
    }

    #[test]
    fn viability_requires_flow_and_height() {
        let mut reading = WaterfallReading {
            flow_rate_m3s: 10.0,
            height_m: 0.0,
            ..WaterfallReading::default()
        };
        assert!(!reading.is_viable());
        reading.height_m = 50.0;
        assert!(reading.is_viable());
        reading.flow_rate_m3s = f64::NAN;
        assert!(!reading.is_viable());
    }

    #[test]
    fn geothermal_threshold_is_inclusive() {
        let mut reading = GeothermalReading {
            temperature_c: 49.9,
            ..GeothermalReading::default()
        };
        assert!(!reading.is_viable());
        reading.temperature_c = 50.0;
        assert!(reading.is_viable());
    }

    #[test]
    fn location_validation() {
        let mut location = Location::default();
        assert!(location.validate().is_ok());
        location.latitude = 91.0;
        assert!(matches!(
            location.validate(),
            Err(CalcEngineError::OutOfRange { field: "latitude", .. })
        ));
        location.latitude = 0.0;
        location.name = "   ".into();
        assert!(matches!(
            location.validate(),
            Err(CalcEngineError::MissingLocationName)
        ));
    }

    #[test]
    fn slug_replaces_spaces() {
        let location = Location {
            name: "Chittagong Hills".into(),
            ..Location::default()
        };
        assert_eq!(location.slug(), "Chittagong_Hills");
    }

    #[test]
    fn site_deserializes_with_defaults() {
        let site: SiteParameters =
            serde_json::from_str(r#"{"waterfall": {"flow_rate_m3s": 10.0, "height_m": 50.0}}"#)
                .unwrap();
        assert_eq!(site.waterfall.turbine_efficiency, DEFAULT_TURBINE_EFFICIENCY);
        assert_eq!(site.geothermal.depth_km, DEFAULT_DEPTH_KM);
        assert_eq!(site.location.name, "My Location");
        assert!(site.has_viable_source());
    }
}
