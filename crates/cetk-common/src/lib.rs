//! ---
//! cetk_section: "01-core-functionality"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Shared primitives and utilities for the toolkit."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Shared primitives for the Community Energy Toolkit workspace.
//! This crate exposes configuration loading and tracing setup consumed by
//! the engine crates and the `cetkctl` front end.

pub mod config;
pub mod logging;
pub mod naming;

pub use config::{
    AppConfig, ClimateConfig, EstimatorConfig, ExportConfig, ForecastConfig, LoadedAppConfig,
    LocationConfig, LoggingConfig,
};
pub use logging::{init_tracing, LogFormat};
pub use naming::file_slug;
