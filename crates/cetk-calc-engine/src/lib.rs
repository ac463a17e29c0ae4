//! ---
//! cetk_section: "08-energy-models"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Renewable potential estimation routines for community planning."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
pub mod analysis;
pub mod batch;
pub mod errors;
pub mod estimator;
pub mod io;
pub mod model;
pub mod reports;
pub mod validation;

use std::path::Path;

use tracing::info;

use crate::{
    analysis::SiteAnalysis,
    reports::{ExportedFiles, ReportExporter},
    validation::ValidationReport,
};

pub use errors::{CalcEngineError, Result};
pub use estimator::{estimate, EnergyEstimate, SourceEstimate};
pub use model::{GeothermalReading, Location, PipeMaterial, SiteParameters, WaterfallReading};

/// Estimate plus the derived analysis for one site.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SiteSummary {
    pub validation: ValidationReport,
    pub estimate: EnergyEstimate,
    pub analysis: SiteAnalysis,
}

impl SiteSummary {
    pub fn exporter(&self) -> ReportExporter<'_> {
        ReportExporter::new(&self.estimate)
    }
}

/// Validates, estimates and analyses a site.
///
/// Fails when [`SiteParameters::validate`] rejects the input (missing name,
/// coordinates or efficiencies out of range). A site with no viable source
/// yields a zero estimate, with the gap reported as an error finding in the
/// validation report.
pub fn analyze_site(site: &SiteParameters) -> Result<SiteSummary> {
    site.validate()?;
    let validation = validation::validate_site(site);

    info!(location = %site.location.name, "Estimating site potential...");
    let estimate = estimate(site);
    let analysis = analysis::analyze(site, &estimate);

    Ok(SiteSummary {
        validation,
        estimate,
        analysis,
    })
}

/// Runs [`analyze_site`] and writes the estimate reports.
/// When `output_dir` is `None`, the default `reports/` directory is used.
pub fn analyze_site_with_export(
    site: &SiteParameters,
    output_dir: Option<&Path>,
) -> Result<(SiteSummary, ExportedFiles)> {
    let summary = analyze_site(site)?;
    let output_dir = output_dir.unwrap_or_else(|| Path::new("reports"));
    let files = summary.exporter().export_all(output_dir)?;
    Ok((summary, files))
}
