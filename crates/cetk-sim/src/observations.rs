//! ---
//! cetk_section: "11-climate-simulation"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Climate scenario generation and monthly climate types."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::info;

use crate::climate::{ClimateMonthlyPoint, ClimateWindow, WINDOW_MONTHS};

/// Raw row representation when deserializing observed history.
///
/// Column names of forecast exports (`Temperature_C`, `Rainfall_mm`) are
/// accepted as well, so an earlier run can seed a later one.
#[derive(Debug, Deserialize)]
pub struct ObservedRow {
    #[serde(default, alias = "Month")]
    pub month: Option<String>,
    #[serde(alias = "Temperature_C")]
    pub temperature_c: f64,
    #[serde(alias = "Rainfall_mm")]
    pub rainfall_mm: f64,
}

/// Chronological monthly climate observations.
#[derive(Debug, Default, Clone)]
pub struct ObservedClimate {
    points: Vec<ClimateMonthlyPoint>,
}

impl ObservedClimate {
    pub fn from_path(path: &Path) -> Result<Self> {
        let observed = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(path)?,
            Some("csv") => Self::from_csv(path)?,
            _ => anyhow::bail!("unsupported climate history format: {}", path.display()),
        };
        info!(
            path = %path.display(),
            months = observed.points.len(),
            "observed climate loaded"
        );
        Ok(observed)
    }

    pub fn from_points(points: Vec<ClimateMonthlyPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recent twelve observations, oldest first.
    pub fn seed_window(&self) -> Result<ClimateWindow> {
        if self.points.len() < WINDOW_MONTHS {
            anyhow::bail!(
                "climate history has {} months, at least {WINDOW_MONTHS} are required",
                self.points.len()
            );
        }
        let recent = self.points[self.points.len() - WINDOW_MONTHS..].to_vec();
        Ok(ClimateWindow::new(recent)?)
    }

    fn from_json(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read climate history {}", path.display()))?;
        let rows: Vec<ObservedRow> = serde_json::from_str(&contents)
            .with_context(|| format!("invalid climate history JSON {}", path.display()))?;
        Ok(Self::from_rows(rows))
    }

    fn from_csv(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)
            .with_context(|| format!("unable to open climate history csv {}", path.display()))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(file);
        let mut rows = Vec::new();
        for row in reader.deserialize::<ObservedRow>() {
            rows.push(
                row.with_context(|| format!("invalid climate row in {}", path.display()))?,
            );
        }
        Ok(Self::from_rows(rows))
    }

    fn from_rows(rows: Vec<ObservedRow>) -> Self {
        Self {
            points: rows
                .into_iter()
                .map(|row| ClimateMonthlyPoint::new(row.temperature_c, row.rainfall_mm))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn loads_csv_history_and_keeps_latest_twelve() -> Result<()> {
        let mut file = Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "month,temperature_c,rainfall_mm")?;
        for i in 0..14 {
            writeln!(file, "M{i},{},{}", 20.0 + i as f64, 10.0 * i as f64)?;
        }
        file.flush()?;

        let observed = ObservedClimate::from_path(file.path())?;
        assert_eq!(observed.len(), 14);
        let window = observed.seed_window()?;
        assert_eq!(window.len(), 12);
        assert_eq!(window.iter().next().unwrap().temperature_c, 22.0);
        assert_eq!(window.newest().unwrap().rainfall_mm, 130.0);
        Ok(())
    }

    #[test]
    fn accepts_forecast_export_columns() -> Result<()> {
        let mut file = Builder::new().suffix(".json").tempfile()?;
        let rows: Vec<_> = (0..12)
            .map(|i| serde_json::json!({"Month": format!("M{i}"), "Temperature_C": 25.0, "Rainfall_mm": 100.0}))
            .collect();
        serde_json::to_writer(file.as_file_mut(), &rows)?;
        file.flush()?;

        let window = ObservedClimate::from_path(file.path())?.seed_window()?;
        assert!(window.iter().all(|point| point.rainfall_mm == 100.0));
        Ok(())
    }

    #[test]
    fn short_history_is_rejected() {
        let observed = ObservedClimate::from_points(vec![ClimateMonthlyPoint::new(20.0, 5.0); 6]);
        let err = observed.seed_window().unwrap_err();
        assert!(err.to_string().contains("6 months"));
    }

    #[test]
    fn unknown_extension_is_rejected() -> Result<()> {
        let file = Builder::new().suffix(".xlsx").tempfile()?;
        assert!(ObservedClimate::from_path(file.path()).is_err());
        Ok(())
    }
}
