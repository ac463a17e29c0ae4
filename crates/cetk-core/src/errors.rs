//! ---
//! cetk_section: "01-core-functionality"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Session workflow and state management."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use cetk_calc_engine::CalcEngineError;
use cetk_extract::ExtractError;
use cetk_forecast::ForecastError;
use cetk_sim::ClimateError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolkitError>;

#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("no document has been ingested")]
    NoDocument,
    #[error("no estimate available; run the calculator first")]
    NotCalculated,
    #[error("no viable energy source: a forecast needs waterfall or geothermal output")]
    NoViableSource,
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Calc(#[from] CalcEngineError),
    #[error(transparent)]
    Climate(#[from] ClimateError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
    #[error("invalid configuration: {0}")]
    Config(String),
}
