//! ---
//! cetk_section: "05-networking-external-interfaces"
//! cetk_subsection: "binary"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Command line front end for the Community Energy Toolkit."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cetk_calc_engine::{
    analyze_site,
    batch::{analyze_batch, read_sites_file},
    io::load_site_from_file,
    reports::EstimateRecord,
};
use cetk_extract::{extract_fields, load_document_text};
use clap::Args;
use tracing::info;

use crate::output::{print_csv, print_json, OutputFormat};

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Document to scan for flow, height, temperature, depth and coordinates.
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,
}

#[derive(Debug, Args)]
pub struct EstimateArgs {
    /// Site parameters as JSON or YAML.
    #[arg(value_name = "SITE")]
    site: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    /// Also write `energy_calc_<location>.csv` and `.json` here.
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Site parameters as JSON or YAML.
    #[arg(value_name = "SITE")]
    site: PathBuf,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// CSV with location_name, latitude, longitude, waterfall_height_m,
    /// waterfall_flow_m3s, geo_temp_c and depth_km columns.
    #[arg(value_name = "CSV")]
    input: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
    /// Write the result CSV to a file as well as stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

pub fn extract(args: ExtractArgs) -> Result<()> {
    let text = load_document_text(&args.document)?;
    print_json(&extract_fields(&text))
}

pub fn estimate(args: EstimateArgs) -> Result<()> {
    let site = load_site_from_file(&args.site)
        .with_context(|| format!("failed to load site {}", args.site.display()))?;
    let summary = analyze_site(&site)?;

    if let Some(dir) = &args.export {
        let files = summary.exporter().export_all(dir)?;
        info!(csv = %files.csv.display(), json = %files.json.display(), "estimate exported");
    }

    match args.format {
        OutputFormat::Json => print_json(&summary.estimate),
        OutputFormat::Csv => print_csv([EstimateRecord::from(&summary.estimate)]),
    }
}

pub fn analyze(args: AnalyzeArgs) -> Result<()> {
    let site = load_site_from_file(&args.site)
        .with_context(|| format!("failed to load site {}", args.site.display()))?;
    print_json(&analyze_site(&site)?)
}

pub fn batch(args: BatchArgs) -> Result<()> {
    let sites = read_sites_file(&args.input)
        .with_context(|| format!("failed to read batch file {}", args.input.display()))?;
    let report = analyze_batch(&sites);
    info!(
        locations = report.summary.locations,
        combined_power_mw = report.summary.combined_power_mw,
        total_annual_mwh = report.summary.total_annual_mwh,
        "batch analysed"
    );

    if let Some(path) = &args.output {
        report.write_csv_file(path)?;
    }
    match args.format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Csv => Ok(report.write_csv(io::stdout().lock())?),
    }
}
