//! ---
//! cetk_section: "01-core-functionality"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Session workflow and state management."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! The ingest, calculate and forecast workflow over one [`AppState`].

use std::path::Path;
use std::sync::Arc;

use cetk_calc_engine::{
    analyze_site, reports::ExportedFiles, GeothermalReading, Location, SiteParameters,
    SiteSummary, WaterfallReading,
};
use cetk_common::AppConfig;
use cetk_extract::{extract_fields, load_document_text, DocumentExtraction, ExtractedFields};
use cetk_forecast::{
    forecast, shared_resources, CapacityProfile, ForecastExporter, ForecastFiles,
    ForecastResources, ForecastSeries, ModelArtifacts,
};
use cetk_sim::{
    ClimateNormals, ClimateProjection, ClimateScenario, ClimateScenarioGenerator, ClimateWindow,
    Month, ScenarioRequest,
};
use tracing::{info, warn};

use crate::errors::{Result, ToolkitError};
use crate::state::{AppState, SessionStatus};

pub const EXTRACTED_LOCATION_NAME: &str = "Extracted Location";

/// Per-call overrides; anything left `None` falls back to the configuration.
#[derive(Debug, Clone, Default)]
pub struct ForecastOptions {
    pub start_month: Option<Month>,
    pub horizon_months: Option<usize>,
    pub scenario: Option<ClimateScenario>,
    /// Replaces the synthetic seed window built from the climate normals.
    pub observed: Option<ClimateWindow>,
}

#[derive(Debug)]
pub struct Toolkit {
    config: AppConfig,
    generator: ClimateScenarioGenerator,
    resources: Option<Arc<ForecastResources>>,
    state: AppState,
}

impl Toolkit {
    pub fn new(config: AppConfig) -> Result<Self> {
        let normals = match &config.climate.normals {
            Some(rows) => ClimateNormals::from_rows(rows)?,
            None => ClimateNormals::default(),
        };
        let generator = ClimateScenarioGenerator::new(normals, config.forecast.jitter_seed);
        Ok(Self {
            config,
            generator,
            resources: None,
            state: AppState::default(),
        })
    }

    /// Uses `resources` instead of loading the configured model artifacts.
    pub fn with_resources(mut self, resources: Arc<ForecastResources>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn ingest_document(&mut self, path: &Path) -> Result<&DocumentExtraction> {
        let text = load_document_text(path)?;
        info!(path = %path.display(), "Ingesting document");
        Ok(self.ingest_text(&text))
    }

    pub fn ingest_text(&mut self, text: &str) -> &DocumentExtraction {
        self.state.set_extraction(extract_fields(text))
    }

    /// Site parameters for the ingested document, with defaults filled in.
    pub fn site_from_document(&self) -> Result<SiteParameters> {
        let extraction = self
            .state
            .extraction
            .as_ref()
            .ok_or(ToolkitError::NoDocument)?;
        Ok(self.site_from_fields(&extraction.fields))
    }

    pub fn site_from_fields(&self, fields: &ExtractedFields) -> SiteParameters {
        let defaults = &self.config;
        let name = fields
            .location_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(EXTRACTED_LOCATION_NAME);
        SiteParameters {
            location: Location {
                name: name.to_owned(),
                latitude: fields.latitude.unwrap_or(defaults.location.latitude),
                longitude: fields.longitude.unwrap_or(defaults.location.longitude),
            },
            waterfall: WaterfallReading {
                flow_rate_m3s: fields.waterfall_flow.unwrap_or(0.0),
                height_m: fields.waterfall_height.unwrap_or(0.0),
                turbine_efficiency: defaults.estimator.turbine_efficiency,
            },
            geothermal: GeothermalReading {
                temperature_c: fields.geo_temp.unwrap_or(0.0),
                depth_km: fields.depth.unwrap_or(defaults.estimator.depth_km),
                conversion_efficiency: defaults.estimator.geo_efficiency,
                capacity_factor: defaults.estimator.capacity_factor,
            },
        }
    }

    /// Estimates `site` and records it, dropping any earlier forecast.
    pub fn calculate(&mut self, site: SiteParameters) -> Result<&SiteSummary> {
        let summary = analyze_site(&site)?;
        for finding in summary.validation.errors() {
            warn!(location = %site.location.name, "{}", finding.message);
        }
        for finding in summary.validation.warnings() {
            warn!(location = %site.location.name, "{}", finding.message);
        }
        self.state.set_estimate(site, summary);
        self.summary()
    }

    pub fn summary(&self) -> Result<&SiteSummary> {
        self.state.summary.as_ref().ok_or(ToolkitError::NotCalculated)
    }

    pub fn generate_forecast(&mut self, options: ForecastOptions) -> Result<&ForecastSeries> {
        let summary = self.summary()?;
        let estimate = &summary.estimate;
        if !estimate.has_viable_source() {
            return Err(ToolkitError::NoViableSource);
        }
        let profile = CapacityProfile::new(
            estimate.location.name.clone(),
            estimate.waterfall.power_mw,
            estimate.geothermal.output.power_mw,
        );

        let request = self.scenario_request(&options)?;
        let resources = self.forecast_resources()?;
        let series = forecast(
            &resources,
            &profile,
            &self.generator,
            &request,
            options.observed,
        )?;

        let baseline = estimate.total_annual_mwh;
        info!(
            location = %series.location,
            total_mwh = series.total_annual_mwh,
            baseline_difference_pct = series.difference_from_baseline_pct(baseline),
            "Forecast complete"
        );
        Ok(self.state.set_forecast(series))
    }

    /// The climate sequence a forecast with these options would be driven by.
    pub fn project_climate(&self, options: &ForecastOptions) -> Result<ClimateProjection> {
        let request = self.scenario_request(options)?;
        let projection = self.generator.generate(&request);
        Ok(match &options.observed {
            Some(window) => projection.with_seed_window(window.clone()),
            None => projection,
        })
    }

    pub fn export_estimate(&self, output_dir: Option<&Path>) -> Result<ExportedFiles> {
        let dir = output_dir.unwrap_or(self.config.export.directory.as_path());
        Ok(self.summary()?.exporter().export_all(dir)?)
    }

    pub fn export_forecast(&self, output_dir: Option<&Path>) -> Result<ForecastFiles> {
        let series = self
            .state
            .forecast
            .as_ref()
            .ok_or(ToolkitError::NotCalculated)?;
        let dir = output_dir.unwrap_or(self.config.export.directory.as_path());
        Ok(ForecastExporter::new(series).export_all(dir)?)
    }

    pub fn clear(&mut self) {
        self.state.clear();
        info!("Session cleared");
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    fn scenario_request(&self, options: &ForecastOptions) -> Result<ScenarioRequest> {
        let defaults = &self.config.forecast;
        let start_month = match (options.start_month, defaults.start_month.as_deref()) {
            (Some(month), _) => month,
            (None, Some(name)) => Month::parse(name)?,
            (None, None) => Month::current(),
        };
        let scenario = match options.scenario {
            Some(scenario) => scenario,
            None => ClimateScenario::parse(&defaults.scenario)?,
        };
        let horizon = options.horizon_months.unwrap_or(defaults.horizon_months);
        Ok(ScenarioRequest::new(start_month, horizon, scenario)?)
    }

    fn forecast_resources(&self) -> Result<Arc<ForecastResources>> {
        if let Some(resources) = &self.resources {
            return Ok(Arc::clone(resources));
        }
        let forecast = &self.config.forecast;
        let artifacts = ModelArtifacts::new(
            forecast.model_path.clone(),
            forecast.input_scaler_path.clone(),
            forecast.output_scaler_path.clone(),
        );
        Ok(shared_resources(&artifacts)?)
    }
}
