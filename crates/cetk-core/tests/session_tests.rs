//! ---
//! cetk_section: "01-core-functionality"
//! cetk_subsection: "tests"
//! cetk_type: "test"
//! cetk_scope: "code"
//! cetk_description: "Integration tests for the session workflow."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::{fs, path::PathBuf, sync::Arc};

use cetk_common::AppConfig;
use cetk_core::{ForecastOptions, SessionStage, Toolkit, ToolkitError};
use cetk_forecast::{ForecastResources, ModelArtifacts};
use cetk_sim::{ClimateScenario, Month};
use tempfile::tempdir;

fn toolkit() -> Toolkit {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../cetk-forecast/tests/fixtures/reference");
    let resources = ForecastResources::load(&ModelArtifacts::in_dir(&dir)).unwrap();
    Toolkit::new(AppConfig::default())
        .unwrap()
        .with_resources(Arc::new(resources))
}

#[test]
fn document_to_forecast_exports() {
    let dir = tempdir().unwrap();
    let document = dir.path().join("survey.txt");
    fs::write(
        &document,
        "Geothermal well log. Temperature: 350 °C at drilling depth 3 km.\nLatitude: 22.8 Longitude: 89.5",
    )
    .unwrap();

    let mut toolkit = toolkit();
    let extraction = toolkit.ingest_document(&document).unwrap();
    assert_eq!(extraction.fields.geo_temp, Some(350.0));

    let site = toolkit.site_from_document().unwrap();
    let summary = toolkit.calculate(site).unwrap();
    assert!(summary.estimate.has_geothermal);
    assert!(!summary.estimate.has_waterfall);
    let geo_mw = summary.estimate.geothermal.output.power_mw;

    let series = toolkit
        .generate_forecast(ForecastOptions {
            start_month: Some(Month::March),
            horizon_months: Some(12),
            scenario: Some(ClimateScenario::Hotter),
            observed: None,
        })
        .unwrap();
    assert_eq!(series.len(), 12);
    assert_eq!(series.steps[0].month_label, "Mar Y1");
    assert_eq!(series.steps[10].month_label, "Jan Y2");
    assert!((series.steps[0].power_mw - geo_mw).abs() < 1e-9);
    assert_eq!(series.steps[0].breakdown.waterfall_mwh, 0.0);

    let out = dir.path().join("reports");
    let estimate_files = toolkit.export_estimate(Some(&out)).unwrap();
    let forecast_files = toolkit.export_forecast(Some(&out)).unwrap();
    assert!(estimate_files.csv.ends_with("energy_calc_Extracted_Location.csv"));
    assert!(forecast_files
        .json
        .ends_with("lstm_forecast_report_Extracted_Location.json"));

    let status = toolkit.status();
    assert_eq!(status.stage, SessionStage::Forecasted);
    assert_eq!(status.forecast_months, Some(12));
    assert!(status.baseline_difference_pct.is_some());
}

#[test]
fn site_without_sources_is_estimated_but_not_forecast() {
    let mut toolkit = toolkit();
    toolkit.ingest_text("Nothing measurable in this memo.");
    let site = toolkit.site_from_document().unwrap();

    let summary = toolkit.calculate(site).unwrap();
    assert_eq!(summary.estimate.total_annual_mwh, 0.0);
    assert!(summary.validation.has_errors());
    assert_eq!(toolkit.status().stage, SessionStage::Estimated);

    let err = toolkit
        .generate_forecast(ForecastOptions::default())
        .unwrap_err();
    assert!(matches!(err, ToolkitError::NoViableSource));
    assert_eq!(toolkit.status().stage, SessionStage::Estimated);
}
