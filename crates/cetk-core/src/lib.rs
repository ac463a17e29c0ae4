//! ---
//! cetk_section: "01-core-functionality"
//! cetk_subsection: "bootstrap"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Session workflow and state management."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Session layer for the Community Energy Toolkit: document ingest, site
//! estimation and forecasting over one explicit [`AppState`].

pub mod errors;
pub mod state;
pub mod toolkit;

pub use errors::{Result, ToolkitError};
pub use state::{AppState, SessionStage, SessionStatus};
pub use toolkit::{ForecastOptions, Toolkit, EXTRACTED_LOCATION_NAME};
