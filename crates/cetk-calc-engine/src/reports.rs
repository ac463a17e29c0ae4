//! ---
//! cetk_section: "08-energy-models"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Renewable potential estimation routines for community planning."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{errors::Result, estimator::EnergyEstimate};

/// Flat export row shared by the CSV and JSON estimate reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRecord {
    #[serde(rename = "Location Name")]
    pub location_name: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Waterfall Power (MW)")]
    pub waterfall_power_mw: f64,
    #[serde(rename = "Geothermal Power (MW)")]
    pub geothermal_power_mw: f64,
    #[serde(rename = "Total Power (MW)")]
    pub total_power_mw: f64,
    #[serde(rename = "Annual Energy (MWh)")]
    pub annual_energy_mwh: f64,
    #[serde(rename = "Households Powered")]
    pub households_powered: u64,
    #[serde(rename = "Pipe Material")]
    pub pipe_material: String,
}

impl From<&EnergyEstimate> for EstimateRecord {
    fn from(estimate: &EnergyEstimate) -> Self {
        Self {
            location_name: estimate.location.name.clone(),
            latitude: estimate.location.latitude,
            longitude: estimate.location.longitude,
            waterfall_power_mw: estimate.waterfall.power_mw,
            geothermal_power_mw: estimate.geothermal.output.power_mw,
            total_power_mw: estimate.total_power_mw,
            annual_energy_mwh: estimate.total_annual_mwh,
            households_powered: estimate.households_powered,
            pipe_material: estimate
                .pipe
                .as_ref()
                .map(|pipe| pipe.description.clone())
                .unwrap_or_else(|| "N/A".to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub csv: PathBuf,
    pub json: PathBuf,
}

#[derive(Debug)]
pub struct ReportExporter<'a> {
    estimate: &'a EnergyEstimate,
}

impl<'a> ReportExporter<'a> {
    pub fn new(estimate: &'a EnergyEstimate) -> Self {
        Self { estimate }
    }

    pub fn file_stem(&self) -> String {
        format!("energy_calc_{}", self.estimate.location.slug())
    }

    /// Writes `energy_calc_<location>.csv` and `.json` into `output_dir`.
    pub fn export_all(&self, output_dir: &Path) -> Result<ExportedFiles> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let record = EstimateRecord::from(self.estimate);
        let stem = self.file_stem();
        let files = ExportedFiles {
            csv: output_dir.join(format!("{stem}.csv")),
            json: output_dir.join(format!("{stem}.json")),
        };

        write_csv(&files.csv, &record)?;
        write_json(&files.json, &[&record])?;

        info!("Estimate reports exported to {}", output_dir.display());
        Ok(files)
    }
}

fn write_csv(path: &Path, record: &EstimateRecord) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.serialize(record)?;
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(path, serialized)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        estimator::estimate,
        model::{GeothermalReading, Location, SiteParameters},
    };
    use tempfile::tempdir;

    #[test]
    fn exports_csv_and_json_records() {
        let site = SiteParameters {
            location: Location {
                name: "Khulna Region".into(),
                ..Location::default()
            },
            geothermal: GeothermalReading {
                temperature_c: 350.0,
                ..GeothermalReading::default()
            },
            ..SiteParameters::default()
        };
        let estimate = estimate(&site);
        let dir = tempdir().unwrap();

        let files = ReportExporter::new(&estimate)
            .export_all(&dir.path().join("reports"))
            .unwrap();
        assert!(files.csv.ends_with("energy_calc_Khulna_Region.csv"));

        let csv = fs::read_to_string(&files.csv).unwrap();
        assert!(csv.starts_with("Location Name,Latitude,Longitude,Waterfall Power (MW)"));
        assert!(csv.contains("Inconel alloys / Nickel-chromium"));

        let records: Vec<EstimateRecord> =
            serde_json::from_str(&fs::read_to_string(&files.json).unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].households_powered, estimate.households_powered);
        assert_eq!(records[0].waterfall_power_mw, 0.0);
    }
}
