//! ---
//! cetk_section: "08-energy-models"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Renewable potential estimation routines for community planning."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Plausibility review of site parameters before they are estimated.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::model::SiteParameters;

pub const EXTREME_HEIGHT_M: f64 = 500.0;
pub const EXTREME_FLOW_M3S: f64 = 1000.0;
pub const EXTREME_TEMPERATURE_C: f64 = 600.0;
pub const DEEP_DRILLING_KM: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Valid,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

pub fn validate_site(site: &SiteParameters) -> ValidationReport {
    let mut findings = Vec::new();
    let flow = site.waterfall.flow_rate_m3s;
    let height = site.waterfall.height_m;
    let temperature = site.geothermal.temperature_c;

    if site.location.name.trim().is_empty() {
        findings.push(Finding::new(Severity::Error, "Location name is required"));
    }

    if site.waterfall.is_viable() {
        findings.push(Finding::new(Severity::Valid, "Waterfall data complete"));
    } else if flow > 0.0 || height > 0.0 {
        findings.push(Finding::new(
            Severity::Warning,
            "Incomplete waterfall data - both height and flow required",
        ));
    }
    if height > EXTREME_HEIGHT_M {
        findings.push(Finding::new(
            Severity::Warning,
            format!("Waterfall height ({height}m) is extremely high - verify accuracy"),
        ));
    }
    if flow > EXTREME_FLOW_M3S {
        findings.push(Finding::new(
            Severity::Warning,
            format!("Flow rate ({flow} m³/s) is extremely high - verify accuracy"),
        ));
    }

    if site.geothermal.is_viable() {
        findings.push(Finding::new(
            Severity::Valid,
            "Geothermal temperature viable for generation",
        ));
    } else if temperature > 0.0 {
        findings.push(Finding::new(
            Severity::Warning,
            format!(
                "Geothermal temperature ({temperature}°C) below 50°C - too low for efficient generation"
            ),
        ));
    }
    if temperature > EXTREME_TEMPERATURE_C {
        findings.push(Finding::new(
            Severity::Warning,
            format!("Temperature ({temperature}°C) exceeds 600°C - requires specialized equipment"),
        ));
    }
    if site.geothermal.depth_km > DEEP_DRILLING_KM {
        findings.push(Finding::new(
            Severity::Warning,
            format!(
                "Drilling depth ({} km) is very deep - expect high costs",
                site.geothermal.depth_km
            ),
        ));
    }

    if !site.has_viable_source() {
        findings.push(Finding::new(
            Severity::Error,
            "No viable energy source. Provide either waterfall data or geothermal data with temperature ≥ 50°C",
        ));
    }

    ValidationReport { findings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeothermalReading, WaterfallReading};

    fn site(flow: f64, height: f64, temperature: f64, depth: f64) -> SiteParameters {
        SiteParameters {
            waterfall: WaterfallReading {
                flow_rate_m3s: flow,
                height_m: height,
                ..WaterfallReading::default()
            },
            geothermal: GeothermalReading {
                temperature_c: temperature,
                depth_km: depth,
                ..GeothermalReading::default()
            },
            ..SiteParameters::default()
        }
    }

    #[test]
    fn complete_site_has_only_valid_findings() {
        let report = validate_site(&site(10.0, 50.0, 200.0, 3.0));
        assert_eq!(report.findings.len(), 2);
        assert!(report
            .findings
            .iter()
            .all(|finding| finding.severity == Severity::Valid));
        assert!(!report.has_errors());
    }

    #[test]
    fn incomplete_waterfall_warns_and_flags_missing_source() {
        let report = validate_site(&site(10.0, 0.0, 0.0, 3.0));
        assert_eq!(report.warnings().count(), 1);
        assert!(report
            .errors()
            .any(|finding| finding.message.starts_with("No viable energy source")));
    }

    #[test]
    fn extreme_values_are_flagged() {
        let report = validate_site(&site(1500.0, 600.0, 650.0, 8.0));
        let warnings: Vec<_> = report.warnings().map(|f| f.message.as_str()).collect();
        assert!(warnings.iter().any(|m| m.contains("Waterfall height (600m)")));
        assert!(warnings.iter().any(|m| m.contains("Flow rate (1500 m³/s)")));
        assert!(warnings.iter().any(|m| m.contains("exceeds 600°C")));
        assert!(warnings.iter().any(|m| m.contains("Drilling depth (8 km)")));
    }

    #[test]
    fn low_temperature_warns() {
        let report = validate_site(&site(10.0, 50.0, 45.0, 3.0));
        assert!(report
            .warnings()
            .any(|finding| finding.message.contains("below 50°C")));
        assert!(!report.has_errors());
    }

    #[test]
    fn missing_name_is_an_error() {
        let mut blank = site(10.0, 50.0, 0.0, 3.0);
        blank.location.name = String::new();
        let report = validate_site(&blank);
        assert!(report
            .errors()
            .any(|finding| finding.message == "Location name is required"));
    }

    #[test]
    fn severity_renders_uppercase() {
        assert_eq!(Severity::Warning.to_string(), "WARNING");
        assert_eq!(
            serde_json::to_string(&Severity::Valid).unwrap(),
            "\"VALID\""
        );
    }
}
