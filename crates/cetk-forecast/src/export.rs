//! ---
//! cetk_section: "12-forecasting"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Rolling forecast engine and model runtime."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    errors::Result,
    series::{ForecastSeries, ForecastStep},
};

pub const MODEL_NAME: &str = "LSTM Neural Network";

/// One forecast month as written to the CSV and JSON reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Temperature_C")]
    pub temperature_c: f64,
    #[serde(rename = "Rainfall_mm")]
    pub rainfall_mm: f64,
    #[serde(rename = "Total_MW")]
    pub total_mw: f64,
    #[serde(rename = "Monthly_Energy_MWh")]
    pub monthly_energy_mwh: f64,
    #[serde(rename = "Confidence_Lower_MWh")]
    pub confidence_lower_mwh: f64,
    #[serde(rename = "Confidence_Upper_MWh")]
    pub confidence_upper_mwh: f64,
}

impl From<&ForecastStep> for ForecastRecord {
    fn from(step: &ForecastStep) -> Self {
        Self {
            month: step.month_label.clone(),
            temperature_c: step.climate_input.temperature_c,
            rainfall_mm: step.climate_input.rainfall_mm,
            total_mw: step.power_mw,
            monthly_energy_mwh: step.predicted_energy_mwh,
            confidence_lower_mwh: step.confidence_lower_mwh,
            confidence_upper_mwh: step.confidence_upper_mwh,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub model: String,
    pub location: String,
    pub climate_scenario: String,
    pub forecast_period_months: usize,
    pub total_predicted_energy_mwh: f64,
    pub average_monthly_mwh: f64,
    pub predictions: Vec<ForecastRecord>,
}

impl From<&ForecastSeries> for ForecastReport {
    fn from(series: &ForecastSeries) -> Self {
        Self {
            model: MODEL_NAME.to_owned(),
            location: series.location.clone(),
            climate_scenario: series.climate_scenario.label(),
            forecast_period_months: series.len(),
            total_predicted_energy_mwh: series.total_annual_mwh,
            average_monthly_mwh: series.average_monthly_mwh(),
            predictions: series.steps.iter().map(ForecastRecord::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastFiles {
    pub csv: PathBuf,
    pub json: PathBuf,
}

#[derive(Debug)]
pub struct ForecastExporter<'a> {
    series: &'a ForecastSeries,
}

impl<'a> ForecastExporter<'a> {
    pub fn new(series: &'a ForecastSeries) -> Self {
        Self { series }
    }

    /// Writes `lstm_forecast_<location>.csv` and
    /// `lstm_forecast_report_<location>.json` into `output_dir`.
    pub fn export_all(&self, output_dir: &Path) -> Result<ForecastFiles> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let slug = cetk_common::file_slug(&self.series.location);
        let files = ForecastFiles {
            csv: output_dir.join(format!("lstm_forecast_{slug}.csv")),
            json: output_dir.join(format!("lstm_forecast_report_{slug}.json")),
        };

        let report = ForecastReport::from(self.series);
        let mut writer = csv::Writer::from_path(&files.csv)?;
        for record in &report.predictions {
            writer.serialize(record)?;
        }
        writer.flush()?;
        fs::write(&files.json, serde_json::to_string_pretty(&report)?)?;

        info!("Forecast reports exported to {}", output_dir.display());
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{SourceBreakdown, SourceRatio};
    use cetk_sim::{ClimateMonthlyPoint, ClimateScenario};
    use tempfile::tempdir;

    fn series() -> ForecastSeries {
        let steps = ["Nov Y1", "Dec Y1", "Jan Y2"]
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let energy = 100.0 * (i + 1) as f64;
                ForecastStep {
                    month_label: (*label).to_owned(),
                    climate_input: ClimateMonthlyPoint::new(20.0 + i as f64, 10.0),
                    predicted_energy_mwh: energy,
                    power_mw: energy / 730.0,
                    confidence_lower_mwh: energy * 0.85,
                    confidence_upper_mwh: energy * 1.15,
                    breakdown: SourceBreakdown {
                        waterfall_mwh: energy,
                        geothermal_mwh: 0.0,
                        waterfall_mw: energy / 730.0,
                        geothermal_mw: 0.0,
                    },
                }
            })
            .collect();
        ForecastSeries {
            location: "Sylhet Hills".into(),
            climate_scenario: ClimateScenario::Wetter,
            capacity_mw: 1.0,
            source_ratio: SourceRatio::from_power(1.0, 0.0, 1.0),
            steps,
            total_annual_mwh: 600.0,
        }
    }

    #[test]
    fn report_carries_scenario_label_and_averages() {
        let report = ForecastReport::from(&series());
        assert_eq!(report.model, "LSTM Neural Network");
        assert_eq!(report.climate_scenario, "Wetter (More Monsoon)");
        assert_eq!(report.forecast_period_months, 3);
        assert_eq!(report.average_monthly_mwh, 200.0);
        assert_eq!(report.predictions[2].temperature_c, 22.0);
    }

    #[test]
    fn writes_csv_and_json_reports() {
        let series = series();
        let dir = tempdir().unwrap();
        let files = ForecastExporter::new(&series)
            .export_all(&dir.path().join("out"))
            .unwrap();
        assert!(files.csv.ends_with("lstm_forecast_Sylhet_Hills.csv"));
        assert!(files.json.ends_with("lstm_forecast_report_Sylhet_Hills.json"));

        let csv = fs::read_to_string(&files.csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Month,Temperature_C,Rainfall_mm,Total_MW,Monthly_Energy_MWh,Confidence_Lower_MWh,Confidence_Upper_MWh"
        );
        assert_eq!(lines.count(), 3);

        let report: ForecastReport =
            serde_json::from_str(&fs::read_to_string(&files.json).unwrap()).unwrap();
        assert_eq!(report.total_predicted_energy_mwh, 600.0);
        assert_eq!(report.predictions[0].month, "Nov Y1");
    }

    #[test]
    fn padded_location_names_are_trimmed_in_file_names() {
        let mut series = series();
        series.location = " Sylhet Hills ".into();
        let dir = tempdir().unwrap();
        let files = ForecastExporter::new(&series).export_all(dir.path()).unwrap();
        assert!(files.csv.ends_with("lstm_forecast_Sylhet_Hills.csv"));
        assert!(files.json.ends_with("lstm_forecast_report_Sylhet_Hills.json"));
    }
}
