//! ---
//! cetk_section: "01-core-functionality"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Session workflow and state management."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use cetk_calc_engine::{SiteParameters, SiteSummary};
use cetk_extract::DocumentExtraction;
use cetk_forecast::ForecastSeries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// How far the session has progressed through ingest, calculate and forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStage {
    Empty,
    Extracted,
    Estimated,
    Forecasted,
}

/// Everything one user session has produced so far.
///
/// A new estimate drops any forecast built from the previous one, and a new
/// document drops both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppState {
    pub extraction: Option<DocumentExtraction>,
    pub site: Option<SiteParameters>,
    pub summary: Option<SiteSummary>,
    pub forecast: Option<ForecastSeries>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AppState {
    pub fn stage(&self) -> SessionStage {
        if self.forecast.is_some() {
            SessionStage::Forecasted
        } else if self.summary.is_some() {
            SessionStage::Estimated
        } else if self.extraction.is_some() {
            SessionStage::Extracted
        } else {
            SessionStage::Empty
        }
    }

    pub fn set_extraction(&mut self, extraction: DocumentExtraction) -> &DocumentExtraction {
        self.site = None;
        self.summary = None;
        self.forecast = None;
        self.touch();
        self.extraction.insert(extraction)
    }

    pub fn set_estimate(&mut self, site: SiteParameters, summary: SiteSummary) {
        self.site = Some(site);
        self.summary = Some(summary);
        self.forecast = None;
        self.touch();
    }

    pub fn set_forecast(&mut self, forecast: ForecastSeries) -> &ForecastSeries {
        self.touch();
        self.forecast.insert(forecast)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn status(&self) -> SessionStatus {
        let estimate = self.summary.as_ref().map(|summary| &summary.estimate);
        let forecast = self.forecast.as_ref();
        SessionStatus {
            stage: self.stage(),
            fields_extracted: self
                .extraction
                .as_ref()
                .map(DocumentExtraction::found_count)
                .unwrap_or(0),
            location: estimate.map(|estimate| estimate.location.name.clone()),
            total_power_mw: estimate.map(|estimate| estimate.total_power_mw),
            annual_energy_mwh: estimate.map(|estimate| estimate.total_annual_mwh),
            forecast_months: forecast.map(ForecastSeries::len),
            forecast_total_mwh: forecast.map(|series| series.total_annual_mwh),
            baseline_difference_pct: forecast.zip(estimate).map(|(series, estimate)| {
                series.difference_from_baseline_pct(estimate.total_annual_mwh)
            }),
            updated_at: self.updated_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// Flat summary of an [`AppState`] for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub stage: SessionStage,
    pub fields_extracted: usize,
    pub location: Option<String>,
    pub total_power_mw: Option<f64>,
    pub annual_energy_mwh: Option<f64>,
    pub forecast_months: Option<usize>,
    pub forecast_total_mwh: Option<f64>,
    pub baseline_difference_pct: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
}
