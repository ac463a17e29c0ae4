//! ---
//! cetk_section: "05-networking-external-interfaces"
//! cetk_subsection: "binary"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Command line front end for the Community Energy Toolkit."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use cetk_calc_engine::io::load_site_from_file;
use cetk_common::AppConfig;
use cetk_core::{ForecastOptions, Toolkit};
use cetk_forecast::{ForecastReport, ForecastResources, ModelArtifacts};
use cetk_sim::{ClimateScenario, Month, ObservedClimate};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::output::{print_csv, print_json, OutputFormat};

/// Scenario selection shared by the climate and forecast commands.
#[derive(Debug, Clone, Args)]
pub struct ScenarioArgs {
    /// First forecast month, by name or number. Defaults to the configured or current month.
    #[arg(long, value_name = "MONTH")]
    start_month: Option<String>,
    /// Forecast horizon in months (3 to 24).
    #[arg(long, value_name = "N")]
    months: Option<usize>,
    /// normal, wetter, drier or hotter.
    #[arg(long, value_name = "SCENARIO")]
    scenario: Option<String>,
    /// Observed monthly climate (CSV or JSON); its last 12 months seed the model window.
    #[arg(long, value_name = "FILE")]
    observed: Option<PathBuf>,
}

impl ScenarioArgs {
    fn options(&self) -> Result<ForecastOptions> {
        let start_month = self.start_month.as_deref().map(Month::parse).transpose()?;
        let scenario = self
            .scenario
            .as_deref()
            .map(ClimateScenario::parse)
            .transpose()?;
        let observed = self
            .observed
            .as_deref()
            .map(|path| ObservedClimate::from_path(path).and_then(|history| history.seed_window()))
            .transpose()?;
        Ok(ForecastOptions {
            start_month,
            horizon_months: self.months,
            scenario,
            observed,
        })
    }
}

#[derive(Debug, Args)]
pub struct ClimateArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ModelArgs {
    /// Directory holding energy_predictor.json, scaler_x.json and scaler_y.json.
    /// Overrides the artifact paths in the configuration.
    #[arg(long, value_name = "DIR")]
    model_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ForecastArgs {
    /// Site parameters as JSON or YAML.
    #[arg(value_name = "SITE")]
    site: PathBuf,
    #[command(flatten)]
    scenario: ScenarioArgs,
    #[command(flatten)]
    model: ModelArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    /// Also write `lstm_forecast_<location>.csv` and the JSON report here.
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Technical document to extract the site from.
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,
    /// Location name for the extracted site.
    #[arg(long, value_name = "NAME")]
    name: Option<String>,
    #[command(flatten)]
    scenario: ScenarioArgs,
    #[command(flatten)]
    model: ModelArgs,
    /// Report directory. Defaults to the configured export directory.
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ClimateRow<'a> {
    #[serde(rename = "Month")]
    month: &'a str,
    #[serde(rename = "Temperature_C")]
    temperature_c: f64,
    #[serde(rename = "Rainfall_mm")]
    rainfall_mm: f64,
}

pub fn climate(config: AppConfig, args: ClimateArgs) -> Result<()> {
    let toolkit = Toolkit::new(config)?;
    let projection = toolkit.project_climate(&args.scenario.options()?)?;
    match args.format {
        OutputFormat::Json => print_json(&projection),
        OutputFormat::Csv => print_csv(projection.months.iter().map(|month| ClimateRow {
            month: &month.label,
            temperature_c: month.point.temperature_c,
            rainfall_mm: month.point.rainfall_mm,
        })),
    }
}

pub fn forecast(config: AppConfig, args: ForecastArgs) -> Result<()> {
    let site = load_site_from_file(&args.site)
        .with_context(|| format!("failed to load site {}", args.site.display()))?;
    let options = args.scenario.options()?;
    let mut toolkit = toolkit(config, &args.model)?;
    toolkit.calculate(site)?;
    let report = ForecastReport::from(toolkit.generate_forecast(options)?);

    if let Some(dir) = &args.export {
        let files = toolkit.export_forecast(Some(dir.as_path()))?;
        info!(csv = %files.csv.display(), json = %files.json.display(), "forecast exported");
    }

    match args.format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Csv => print_csv(&report.predictions),
    }
}

pub fn run(config: AppConfig, args: RunArgs) -> Result<()> {
    let options = args.scenario.options()?;
    let mut toolkit = toolkit(config, &args.model)?;

    toolkit.ingest_document(&args.document)?;
    let mut site = toolkit.site_from_document()?;
    if let Some(name) = &args.name {
        site.location.name = name.clone();
    }
    toolkit.calculate(site)?;
    toolkit.generate_forecast(options)?;

    let dir = args.export.as_deref();
    let estimate_files = toolkit.export_estimate(dir)?;
    let forecast_files = toolkit.export_forecast(dir)?;
    info!(
        estimate = %estimate_files.csv.display(),
        forecast = %forecast_files.csv.display(),
        "reports exported"
    );

    print_json(&toolkit.status())
}

fn toolkit(config: AppConfig, model: &ModelArgs) -> Result<Toolkit> {
    let toolkit = Toolkit::new(config)?;
    Ok(match &model.model_dir {
        Some(dir) => toolkit.with_resources(load_resources(dir)?),
        None => toolkit,
    })
}

fn load_resources(dir: &Path) -> Result<Arc<ForecastResources>> {
    let resources = ForecastResources::load(&ModelArtifacts::in_dir(dir))
        .with_context(|| format!("failed to load forecast model from {}", dir.display()))?;
    Ok(Arc::new(resources))
}
