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

use anyhow::Result;
use cetk_common::{init_tracing, AppConfig};
use clap::{Parser, Subcommand};

mod forecast;
mod output;
mod site;

const CONFIG_CANDIDATES: [&str; 2] = ["cetk.toml", "config/cetk.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Community Energy Toolkit: site estimation and climate-driven forecasting",
    long_about = None
)]
struct Cli {
    /// Configuration file. Falls back to CETK_CONFIG, then ./cetk.toml, then built-in defaults.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract site fields from a text (or, with the `pdf` feature, PDF) document.
    Extract(site::ExtractArgs),
    /// Estimate waterfall, geothermal and waste-recovery output for one site.
    Estimate(site::EstimateArgs),
    /// Validation findings, sensitivity sweeps and recommendations for one site.
    Analyze(site::AnalyzeArgs),
    /// Estimate every site in a CSV file.
    Batch(site::BatchArgs),
    /// Print the projected monthly climate for a scenario.
    Climate(forecast::ClimateArgs),
    /// Roll the forecast model over a projected climate for one site.
    Forecast(forecast::ForecastArgs),
    /// Document to exported forecast in one pass.
    Run(forecast::RunArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing("cetkctl", &config.logging)?;

    match cli.command {
        Commands::Extract(args) => site::extract(args),
        Commands::Estimate(args) => site::estimate(args),
        Commands::Analyze(args) => site::analyze(args),
        Commands::Batch(args) => site::batch(args),
        Commands::Climate(args) => forecast::climate(config, args),
        Commands::Forecast(args) => forecast::forecast(config, args),
        Commands::Run(args) => forecast::run(config, args),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return AppConfig::from_path(path);
    }
    let env_override = std::env::var(AppConfig::ENV_CONFIG_PATH)
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false);
    if env_override || CONFIG_CANDIDATES.iter().any(|path| Path::new(path).exists()) {
        return AppConfig::load(&CONFIG_CANDIDATES);
    }
    Ok(AppConfig::default())
}
