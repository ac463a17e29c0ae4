//! ---
//! cetk_section: "08-energy-models"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Renewable potential estimation routines for community planning."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Derived views over an [`EnergyEstimate`]: sensitivity sweeps, placement
//! advice, equivalence with other renewables, revenue and generation mix.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::estimator::{geothermal_power_mw, waterfall_power_mw, EnergyEstimate};
use crate::model::{GeothermalReading, SiteParameters, HOURS_PER_YEAR, SURFACE_TEMPERATURE_C};

pub const SENSITIVITY_POINTS: usize = 50;
pub const ELECTRICITY_PRICE_USD_PER_MWH: f64 = 80.0;
pub const SOLAR_CAPACITY_FACTOR: f64 = 0.20;
pub const WIND_CAPACITY_FACTOR: f64 = 0.35;

const SWEEP_TEMPERATURE_C: (f64, f64) = (150.0, 400.0);
const SWEEP_DEPTH_KM: (f64, f64) = (1.0, 10.0);
const FALLBACK_FLOW_M3S: f64 = 10.0;
const FALLBACK_HEIGHT_M: f64 = 50.0;
const FALLBACK_TEMPERATURE_C: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SensitivityParameter {
    FlowRate,
    Height,
    Temperature,
    Depth,
}

impl SensitivityParameter {
    pub fn unit(&self) -> &'static str {
        match self {
            SensitivityParameter::FlowRate => "m³/s",
            SensitivityParameter::Height => "m",
            SensitivityParameter::Temperature => "°C",
            SensitivityParameter::Depth => "km",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub input: f64,
    pub power_mw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityCurve {
    pub parameter: SensitivityParameter,
    /// Operating point of the site itself.
    pub baseline: SensitivityPoint,
    pub points: Vec<SensitivityPoint>,
}

/// Sweeps one input across its range while holding every other input fixed.
///
/// Sites missing the swept source fall back to a nominal operating point so
/// the curve still shows the shape of the response.
pub fn sensitivity(site: &SiteParameters, parameter: SensitivityParameter) -> SensitivityCurve {
    let waterfall = site.waterfall;
    let base_flow = or_fallback(waterfall.flow_rate_m3s, FALLBACK_FLOW_M3S);
    let base_height = or_fallback(waterfall.height_m, FALLBACK_HEIGHT_M);
    let geothermal = GeothermalReading {
        temperature_c: or_fallback(site.geothermal.temperature_c, FALLBACK_TEMPERATURE_C),
        ..site.geothermal
    };

    let with_waterfall = |flow: f64, height: f64| {
        let mut reading = waterfall;
        reading.flow_rate_m3s = flow;
        reading.height_m = height;
        waterfall_power_mw(&reading)
    };
    let with_temperature = |temperature_c: f64| {
        geothermal_power_mw(&GeothermalReading {
            temperature_c,
            ..geothermal
        })
    };

    let (baseline, points) = match parameter {
        SensitivityParameter::FlowRate => (
            point(base_flow, with_waterfall(base_flow, base_height)),
            linspace(base_flow * 0.5, base_flow * 1.5, SENSITIVITY_POINTS)
                .map(|flow| point(flow, with_waterfall(flow, base_height)))
                .collect(),
        ),
        SensitivityParameter::Height => (
            point(base_height, with_waterfall(base_flow, base_height)),
            linspace(base_height * 0.5, base_height * 1.5, SENSITIVITY_POINTS)
                .map(|height| point(height, with_waterfall(base_flow, height)))
                .collect(),
        ),
        SensitivityParameter::Temperature => (
            point(
                geothermal.temperature_c,
                with_temperature(geothermal.temperature_c),
            ),
            linspace(SWEEP_TEMPERATURE_C.0, SWEEP_TEMPERATURE_C.1, SENSITIVITY_POINTS)
                .map(|temperature| point(temperature, with_temperature(temperature)))
                .collect(),
        ),
        SensitivityParameter::Depth => {
            let gradient = geothermal.gradient_c_per_km();
            (
                point(
                    geothermal.depth_km,
                    with_temperature(geothermal.temperature_c),
                ),
                linspace(SWEEP_DEPTH_KM.0, SWEEP_DEPTH_KM.1, SENSITIVITY_POINTS)
                    .map(|depth| {
                        point(
                            depth,
                            with_temperature(SURFACE_TEMPERATURE_C + gradient * depth),
                        )
                    })
                    .collect(),
            )
        }
    };

    SensitivityCurve {
        parameter,
        baseline,
        points,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum AdviceLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub level: AdviceLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemRecommendation {
    pub system: String,
    pub installation: Vec<String>,
    pub advisories: Vec<Advisory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecommendations {
    pub waterfall: Option<SystemRecommendation>,
    pub geothermal: Option<SystemRecommendation>,
}

pub fn placement_recommendations(
    site: &SiteParameters,
    estimate: &EnergyEstimate,
) -> PlacementRecommendations {
    let waterfall = estimate.has_waterfall.then(|| {
        let height = site.waterfall.height_m;
        let mut advisories = Vec::new();
        if height > 100.0 {
            advisories.push(advisory(
                AdviceLevel::Warning,
                "Very high waterfall - consider multiple turbine stages",
            ));
        } else if height < 20.0 {
            advisories.push(advisory(
                AdviceLevel::Info,
                "Low head turbine recommended (Kaplan or Francis type)",
            ));
        }
        SystemRecommendation {
            system: "Waterfall Turbine System".to_owned(),
            installation: [
                "Install turbines at the base of waterfall",
                "Use adjustable blade systems for flow variation",
                "Implement automated flow monitoring",
                "Add modular blade replacement capability",
            ]
            .iter()
            .map(|line| (*line).to_owned())
            .collect(),
            advisories,
        }
    });

    let geothermal = estimate.has_geothermal.then(|| {
        let temperature = site.geothermal.temperature_c;
        let material = estimate
            .pipe
            .as_ref()
            .map(|pipe| pipe.description.clone())
            .unwrap_or_else(|| "N/A".to_owned());
        let mut advisories = Vec::new();
        if temperature > 300.0 {
            advisories.push(advisory(
                AdviceLevel::Warning,
                "High temperature - enhanced safety protocols required",
            ));
        }
        if temperature < 150.0 {
            advisories.push(advisory(
                AdviceLevel::Info,
                "Consider binary cycle system for low-temp geothermal",
            ));
        }
        SystemRecommendation {
            system: "Geothermal System".to_owned(),
            installation: vec![
                format!("Drill to {} km depth", site.geothermal.depth_km),
                format!("Use {material}"),
                "Implement closed-loop heat exchanger".to_owned(),
                "Add monitoring for pipe stress and temperature".to_owned(),
            ],
            advisories,
        }
    });

    PlacementRecommendations {
        waterfall,
        geothermal,
    }
}

/// Nameplate capacity other renewables would need to match the annual output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenewableComparison {
    pub site_power_mw: f64,
    pub solar_equivalent_mw: f64,
    pub wind_equivalent_mw: f64,
}

pub fn renewable_comparison(estimate: &EnergyEstimate) -> RenewableComparison {
    RenewableComparison {
        site_power_mw: estimate.total_power_mw,
        solar_equivalent_mw: estimate.total_annual_mwh / (HOURS_PER_YEAR * SOLAR_CAPACITY_FACTOR),
        wind_equivalent_mw: estimate.total_annual_mwh / (HOURS_PER_YEAR * WIND_CAPACITY_FACTOR),
    }
}

pub fn annual_revenue_usd(estimate: &EnergyEstimate) -> f64 {
    estimate.total_annual_mwh * ELECTRICITY_PRICE_USD_PER_MWH
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PotentialTier {
    Green,
    Orange,
    Red,
}

impl PotentialTier {
    pub fn for_power(total_power_mw: f64) -> Self {
        if total_power_mw > 5.0 {
            PotentialTier::Green
        } else if total_power_mw > 2.0 {
            PotentialTier::Orange
        } else {
            PotentialTier::Red
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixEntry {
    pub source: String,
    pub power_mw: f64,
}

/// Power share per source; waste recovery is expressed as its average power.
pub fn generation_mix(estimate: &EnergyEstimate) -> Vec<MixEntry> {
    let mut mix = Vec::with_capacity(3);
    if estimate.has_waterfall {
        mix.push(mix_entry("Waterfall", estimate.waterfall.power_mw));
    }
    if estimate.has_geothermal {
        mix.push(mix_entry("Geothermal", estimate.geothermal.output.power_mw));
    }
    if estimate.waste_recovered_mwh > 0.0 {
        mix.push(mix_entry(
            "Waste Recovery",
            estimate.waste_recovered_mwh / HOURS_PER_YEAR,
        ));
    }
    mix
}

/// Everything the analysis views produce for one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAnalysis {
    pub tier: PotentialTier,
    pub annual_revenue_usd: f64,
    pub comparison: RenewableComparison,
    pub mix: Vec<MixEntry>,
    pub recommendations: PlacementRecommendations,
    pub sensitivity: Vec<SensitivityCurve>,
}

pub fn analyze(site: &SiteParameters, estimate: &EnergyEstimate) -> SiteAnalysis {
    let mut parameters = Vec::new();
    if estimate.has_waterfall {
        parameters.extend([SensitivityParameter::FlowRate, SensitivityParameter::Height]);
    }
    if estimate.has_geothermal {
        parameters.extend([SensitivityParameter::Temperature, SensitivityParameter::Depth]);
    }

    SiteAnalysis {
        tier: PotentialTier::for_power(estimate.total_power_mw),
        annual_revenue_usd: annual_revenue_usd(estimate),
        comparison: renewable_comparison(estimate),
        mix: generation_mix(estimate),
        recommendations: placement_recommendations(site, estimate),
        sensitivity: parameters
            .into_iter()
            .map(|parameter| sensitivity(site, parameter))
            .collect(),
    }
}

fn linspace(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |index| {
        if index + 1 == count {
            end
        } else {
            start + step * index as f64
        }
    })
}

fn or_fallback(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn point(input: f64, power_mw: f64) -> SensitivityPoint {
    SensitivityPoint { input, power_mw }
}

fn advisory(level: AdviceLevel, message: &str) -> Advisory {
    Advisory {
        level,
        message: message.to_owned(),
    }
}

fn mix_entry(source: &str, power_mw: f64) -> MixEntry {
    MixEntry {
        source: source.to_owned(),
        power_mw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::estimate;
    use crate::model::WaterfallReading;

    fn reference_site() -> SiteParameters {
        SiteParameters {
            waterfall: WaterfallReading {
                flow_rate_m3s: 10.0,
                height_m: 50.0,
                turbine_efficiency: 0.9,
            },
            geothermal: GeothermalReading {
                temperature_c: 200.0,
                depth_km: 3.5,
                ..GeothermalReading::default()
            },
            ..SiteParameters::default()
        }
    }

    #[test]
    fn linspace_hits_both_ends() {
        let values: Vec<f64> = linspace(1.0, 10.0, 50).collect();
        assert_eq!(values.len(), 50);
        assert_eq!(values[0], 1.0);
        assert_eq!(values[49], 10.0);
        assert!(values.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn flow_sweep_brackets_the_site() {
        let site = reference_site();
        let curve = sensitivity(&site, SensitivityParameter::FlowRate);
        assert_eq!(curve.points.len(), SENSITIVITY_POINTS);
        assert_eq!(curve.points[0].input, 5.0);
        assert_eq!(curve.points[49].input, 15.0);
        assert!((curve.baseline.power_mw - 4.4145).abs() < 1e-9);
        assert!(curve
            .points
            .windows(2)
            .all(|pair| pair[1].power_mw > pair[0].power_mw));
    }

    #[test]
    fn depth_sweep_follows_site_gradient() {
        let site = reference_site();
        let curve = sensitivity(&site, SensitivityParameter::Depth);
        let at_site_depth = 25.0 + site.geothermal.gradient_c_per_km() * 3.5;
        assert!((at_site_depth - 200.0).abs() < 1e-9);
        let last = curve.points.last().unwrap();
        assert_eq!(last.input, 10.0);
        assert!(last.power_mw > curve.baseline.power_mw);
    }

    #[test]
    fn temperature_sweep_uses_fixed_range() {
        let curve = sensitivity(&reference_site(), SensitivityParameter::Temperature);
        assert_eq!(curve.points[0].input, 150.0);
        assert_eq!(curve.points[49].input, 400.0);
    }

    #[test]
    fn recommendations_follow_thresholds() {
        let mut site = reference_site();
        site.waterfall.height_m = 15.0;
        site.geothermal.temperature_c = 320.0;
        let estimate = estimate(&site);
        let advice = placement_recommendations(&site, &estimate);

        let waterfall = advice.waterfall.unwrap();
        assert_eq!(waterfall.advisories.len(), 1);
        assert!(waterfall.advisories[0].message.contains("Kaplan or Francis"));

        let geothermal = advice.geothermal.unwrap();
        assert!(geothermal.installation[1].contains("Inconel"));
        assert_eq!(geothermal.advisories[0].level, AdviceLevel::Warning);
    }

    #[test]
    fn recommendations_skip_missing_sources() {
        let mut site = reference_site();
        site.geothermal.temperature_c = 0.0;
        let advice = placement_recommendations(&site, &estimate(&site));
        assert!(advice.waterfall.is_some());
        assert!(advice.geothermal.is_none());
    }

    #[test]
    fn tiers_revenue_and_comparison() {
        let estimate = estimate(&reference_site());
        assert_eq!(PotentialTier::for_power(estimate.total_power_mw), PotentialTier::Green);
        assert_eq!(PotentialTier::for_power(2.5), PotentialTier::Orange);
        assert_eq!(PotentialTier::for_power(2.0), PotentialTier::Red);

        let revenue = annual_revenue_usd(&estimate);
        assert!((revenue - estimate.total_annual_mwh * 80.0).abs() < 1e-6);

        let comparison = renewable_comparison(&estimate);
        assert!(comparison.solar_equivalent_mw > comparison.wind_equivalent_mw);
        assert!(
            (comparison.solar_equivalent_mw * 0.20 - comparison.wind_equivalent_mw * 0.35).abs()
                < 1e-9
        );
    }

    #[test]
    fn mix_includes_waste_as_average_power() {
        let estimate = estimate(&reference_site());
        let mix = generation_mix(&estimate);
        assert_eq!(mix.len(), 3);
        assert_eq!(mix[2].source, "Waste Recovery");
        assert!((mix[2].power_mw - estimate.waste_recovered_mwh / 8760.0).abs() < 1e-12);
    }

    #[test]
    fn analyze_sweeps_only_present_sources() {
        let mut site = reference_site();
        site.waterfall.height_m = 0.0;
        let analysis = analyze(&site, &estimate(&site));
        let parameters: Vec<_> = analysis.sensitivity.iter().map(|c| c.parameter).collect();
        assert_eq!(
            parameters,
            vec![SensitivityParameter::Temperature, SensitivityParameter::Depth]
        );
    }
}
