//! ---
//! cetk_section: "01-core-functionality"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Shared primitives and utilities for the toolkit."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::LogFormat;

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_location_name() -> String {
    "My Location".to_owned()
}

fn default_latitude() -> f64 {
    23.8103
}

fn default_longitude() -> f64 {
    90.4125
}

fn default_turbine_efficiency() -> f64 {
    0.9
}

fn default_geo_efficiency() -> f64 {
    0.15
}

fn default_capacity_factor() -> f64 {
    0.85
}

fn default_depth_km() -> f64 {
    3.0
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/energy_predictor.json")
}

fn default_input_scaler_path() -> PathBuf {
    PathBuf::from("models/scaler_x.json")
}

fn default_output_scaler_path() -> PathBuf {
    PathBuf::from("models/scaler_y.json")
}

fn default_horizon_months() -> usize {
    12
}

fn default_scenario() -> String {
    "normal".to_owned()
}

fn default_jitter_seed() -> u64 {
    42
}

fn default_export_directory() -> PathBuf {
    PathBuf::from("reports")
}

/// Primary configuration object for the toolkit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub climate: ClimateConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "CETK_CONFIG";

    /// Load configuration from disk, respecting the `CETK_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    /// Load a single configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.location.validate()?;
        self.estimator.validate()?;
        self.forecast.validate()?;
        self.climate.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
    /// Also write a daily rolling JSON log under `directory`.
    #[serde(default)]
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
            file_output: false,
        }
    }
}

/// Location used when no coordinates are supplied or extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_location_name")]
    pub name: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: default_location_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
        }
    }
}

impl LocationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(anyhow!(
                "location.latitude {} must be between -90 and 90",
                self.latitude
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(anyhow!(
                "location.longitude {} must be between -180 and 180",
                self.longitude
            ));
        }
        Ok(())
    }
}

/// Default efficiencies applied when a site does not declare its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    #[serde(default = "default_turbine_efficiency")]
    pub turbine_efficiency: f64,
    #[serde(default = "default_geo_efficiency")]
    pub geo_efficiency: f64,
    #[serde(default = "default_capacity_factor")]
    pub capacity_factor: f64,
    #[serde(default = "default_depth_km")]
    pub depth_km: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            turbine_efficiency: default_turbine_efficiency(),
            geo_efficiency: default_geo_efficiency(),
            capacity_factor: default_capacity_factor(),
            depth_km: default_depth_km(),
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<()> {
        check_range("estimator.turbine_efficiency", self.turbine_efficiency, 0.5, 0.95)?;
        check_range("estimator.geo_efficiency", self.geo_efficiency, 0.10, 0.25)?;
        check_range("estimator.capacity_factor", self.capacity_factor, 0.5, 0.95)?;
        check_range("estimator.depth_km", self.depth_km, 0.5, 10.0)?;
        Ok(())
    }
}

/// Artifact locations and defaults for the rolling forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    #[serde(default = "default_input_scaler_path")]
    pub input_scaler_path: PathBuf,
    #[serde(default = "default_output_scaler_path")]
    pub output_scaler_path: PathBuf,
    #[serde(default = "default_horizon_months")]
    pub horizon_months: usize,
    /// Calendar month name; the current month is used when unset.
    #[serde(default)]
    pub start_month: Option<String>,
    #[serde(default = "default_scenario")]
    pub scenario: String,
    #[serde(default = "default_jitter_seed")]
    pub jitter_seed: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            input_scaler_path: default_input_scaler_path(),
            output_scaler_path: default_output_scaler_path(),
            horizon_months: default_horizon_months(),
            start_month: None,
            scenario: default_scenario(),
            jitter_seed: default_jitter_seed(),
        }
    }
}

impl ForecastConfig {
    pub const MIN_HORIZON: usize = 3;
    pub const MAX_HORIZON: usize = 24;

    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_HORIZON..=Self::MAX_HORIZON).contains(&self.horizon_months) {
            return Err(anyhow!(
                "forecast.horizon_months {} must be between {} and {}",
                self.horizon_months,
                Self::MIN_HORIZON,
                Self::MAX_HORIZON
            ));
        }
        if self.scenario.trim().is_empty() {
            return Err(anyhow!("forecast.scenario must not be empty"));
        }
        Ok(())
    }
}

/// Optional replacement for the reference monthly climate normals.
///
/// Each row is `[temperature_c, rainfall_mm]`, January first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClimateConfig {
    #[serde(default)]
    pub normals: Option<Vec<[f64; 2]>>,
}

impl ClimateConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(normals) = &self.normals {
            if normals.len() != 12 {
                return Err(anyhow!(
                    "climate.normals must contain 12 monthly rows, found {}",
                    normals.len()
                ));
            }
            if normals
                .iter()
                .flatten()
                .any(|value| !value.is_finite() || *value < -100.0)
            {
                return Err(anyhow!("climate.normals contains an invalid value"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_directory")]
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
        }
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(anyhow!(
            "{} {} must be between {} and {}",
            field,
            value,
            min,
            max
        ));
    }
    Ok(())
}
