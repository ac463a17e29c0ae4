//! ---
//! cetk_section: "11-climate-simulation"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Climate scenario generation and monthly climate types."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClimateError>;

#[derive(Debug, Error, PartialEq)]
pub enum ClimateError {
    #[error("forecast horizon {0} months is outside the supported range 3..=24")]
    InvalidHorizon(usize),
    #[error("climate window needs exactly {expected} monthly points, got {actual}")]
    InvalidWindow { expected: usize, actual: usize },
    #[error("climate normals need exactly 12 monthly rows, got {0}")]
    InvalidNormals(usize),
    #[error("unknown climate scenario '{0}'")]
    UnknownScenario(String),
    #[error("unknown month '{0}'")]
    UnknownMonth(String),
}
