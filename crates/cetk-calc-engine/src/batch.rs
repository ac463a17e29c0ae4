//! ---
//! cetk_section: "08-energy-models"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Renewable potential estimation routines for community planning."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Multi-site estimation from a CSV table of candidate locations.

use std::{
    fs,
    io::{Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    errors::Result,
    estimator::estimate,
    model::{GeothermalReading, Location, SiteParameters, WaterfallReading, DEFAULT_DEPTH_KM},
};

/// One input row. Every column except the name is optional and defaults to zero
/// (depth defaults to 3 km).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSite {
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub waterfall_height_m: f64,
    #[serde(default)]
    pub waterfall_flow_m3s: f64,
    #[serde(default)]
    pub geo_temp_c: f64,
    #[serde(default = "default_depth")]
    pub depth_km: f64,
}

impl BatchSite {
    /// Site parameters with the default efficiencies applied.
    pub fn to_site(&self, index: usize) -> SiteParameters {
        let name = self
            .location_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Location {}", index + 1));
        SiteParameters {
            location: Location {
                name,
                latitude: self.latitude,
                longitude: self.longitude,
            },
            waterfall: WaterfallReading {
                flow_rate_m3s: self.waterfall_flow_m3s,
                height_m: self.waterfall_height_m,
                ..WaterfallReading::default()
            },
            geothermal: GeothermalReading {
                temperature_c: self.geo_temp_c,
                depth_km: self.depth_km,
                ..GeothermalReading::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Waterfall_MW")]
    pub waterfall_mw: f64,
    #[serde(rename = "Geothermal_MW")]
    pub geothermal_mw: f64,
    #[serde(rename = "Total_Annual_MWh")]
    pub total_annual_mwh: f64,
    #[serde(rename = "Households")]
    pub households: u64,
    #[serde(rename = "Pipe_Material")]
    pub pipe_material: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub locations: usize,
    pub combined_power_mw: f64,
    pub total_annual_mwh: f64,
    pub total_households: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<BatchResult>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for result in &self.results {
            writer.serialize(result)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_csv_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.write_csv(fs::File::create(path)?)?;
        info!(path = %path.display(), rows = self.results.len(), "batch results written");
        Ok(())
    }
}

pub fn read_sites<R: Read>(reader: R) -> Result<Vec<BatchSite>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut sites = Vec::new();
    for row in reader.deserialize() {
        sites.push(row?);
    }
    Ok(sites)
}

pub fn read_sites_file(path: &Path) -> Result<Vec<BatchSite>> {
    read_sites(fs::File::open(path)?)
}

pub fn analyze_batch(sites: &[BatchSite]) -> BatchReport {
    let mut results = Vec::with_capacity(sites.len());
    let mut summary = BatchSummary {
        locations: sites.len(),
        ..BatchSummary::default()
    };

    for (index, row) in sites.iter().enumerate() {
        let site = row.to_site(index);
        let estimate = estimate(&site);
        debug!(location = %site.location.name, total_annual_mwh = estimate.total_annual_mwh, "batch site processed");

        let result = BatchResult {
            location: site.location.name,
            latitude: row.latitude,
            longitude: row.longitude,
            waterfall_mw: round_to(estimate.waterfall.power_mw, 2),
            geothermal_mw: round_to(estimate.geothermal.output.power_mw, 2),
            total_annual_mwh: round_to(estimate.total_annual_mwh, 0),
            households: estimate.households_powered,
            pipe_material: estimate
                .pipe
                .map(|pipe| pipe.material.short_name().to_owned())
                .unwrap_or_else(|| "N/A".to_owned()),
        };
        summary.combined_power_mw += result.waterfall_mw + result.geothermal_mw;
        summary.total_annual_mwh += estimate.total_annual_mwh;
        summary.total_households += result.households;
        results.push(result);
    }

    info!(
        locations = summary.locations,
        combined_power_mw = summary.combined_power_mw,
        "batch analysis complete"
    );
    BatchReport { results, summary }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn default_depth() -> f64 {
    DEFAULT_DEPTH_KM
}
