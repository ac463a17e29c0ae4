//! ---
//! cetk_section: "15-testing-qa-runbook"
//! cetk_subsection: "integration-tests"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Cross-crate scenarios from document intake to forecast export."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use cetk_calc_engine::{
    analyze_site, estimate, GeothermalReading, Location, SiteParameters, WaterfallReading,
};
use cetk_common::AppConfig;
use cetk_core::{ForecastOptions, SessionStage, Toolkit};
use cetk_forecast::{
    CapacityProfile, ForecastResources, ModelArtifacts, RollingForecastEngine, SourceRatio,
};
use cetk_sim::{ClimateScenario, ClimateScenarioGenerator, Month, ScenarioRequest};
use tempfile::tempdir;

fn reference_resources() -> ForecastResources {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../crates/cetk-forecast/tests/fixtures/reference");
    ForecastResources::load(&ModelArtifacts::in_dir(&dir)).unwrap()
}

fn site(waterfall: WaterfallReading, geothermal: GeothermalReading) -> SiteParameters {
    SiteParameters {
        location: Location {
            name: "Test Site".into(),
            ..Location::default()
        },
        waterfall,
        geothermal,
    }
}

#[test]
fn waterfall_site_estimate() {
    let estimate = estimate(&site(
        WaterfallReading {
            flow_rate_m3s: 10.0,
            height_m: 50.0,
            turbine_efficiency: 0.9,
        },
        GeothermalReading::default(),
    ));
    assert!((estimate.waterfall.power_mw - 4.4145).abs() < 1e-9);
    assert!(!estimate.has_geothermal);
}

#[test]
fn geothermal_site_estimate() {
    let estimate = estimate(&site(
        WaterfallReading::default(),
        GeothermalReading {
            temperature_c: 200.0,
            depth_km: 3.0,
            conversion_efficiency: 0.15,
            capacity_factor: 0.85,
        },
    ));
    assert!((estimate.geothermal.thermal_power_kw - 36_575.0).abs() < 1e-6);
    assert!((estimate.geothermal.output.power_mw - 5.48625).abs() < 1e-9);
    let expected_annual = 5.48625 * 24.0 * 365.0 * 0.85;
    assert!((estimate.geothermal.output.annual_energy_mwh - expected_annual).abs() < 1e-6);
}

#[test]
fn zero_capacity_forecast_is_all_zero() {
    let resources = reference_resources();
    let request = ScenarioRequest::new(Month::June, 12, ClimateScenario::Normal).unwrap();
    let projection = ClimateScenarioGenerator::default().generate(&request);

    let series = RollingForecastEngine::from_resources(&resources)
        .run(&CapacityProfile::new("Nowhere", 0.0, 0.0), &projection)
        .unwrap();

    assert!(series.steps.iter().all(|step| step.predicted_energy_mwh == 0.0));
    assert_eq!(series.source_ratio, SourceRatio { waterfall: 0.5, geothermal: 0.5 });
}

#[test]
fn document_through_forecast_and_export() {
    let dir = tempdir().unwrap();
    let document = dir.path().join("joint-survey.txt");
    fs::write(
        &document,
        "Joint survey\n\
         Flow rate: 10 m³/s, waterfall height: 50 m.\n\
         Reservoir temperature: 200 °C, drilling depth 3 km.\n",
    )
    .unwrap();

    let mut toolkit = Toolkit::new(AppConfig::default())
        .unwrap()
        .with_resources(Arc::new(reference_resources()));
    toolkit.ingest_document(&document).unwrap();
    let site = toolkit.site_from_document().unwrap();
    let summary = toolkit.calculate(site).unwrap();
    let waterfall_mw = summary.estimate.waterfall.power_mw;
    let geothermal_mw = summary.estimate.geothermal.output.power_mw;
    assert!(summary.estimate.has_waterfall && summary.estimate.has_geothermal);

    let series = toolkit
        .generate_forecast(ForecastOptions {
            start_month: Some(Month::November),
            horizon_months: Some(15),
            scenario: Some(ClimateScenario::Drier),
            observed: None,
        })
        .unwrap();

    let labels: Vec<&str> = series.steps.iter().map(|s| s.month_label.as_str()).collect();
    assert_eq!(labels[0], "Nov Y1");
    assert_eq!(labels[1], "Dec Y1");
    assert_eq!(labels[2], "Jan Y2");
    assert_eq!(labels[14], "Jan Y3");

    let capacity = waterfall_mw + geothermal_mw;
    for step in &series.steps {
        assert!((step.power_mw - capacity).abs() < 1e-9);
        let split = step.breakdown.waterfall_mwh + step.breakdown.geothermal_mwh;
        assert!((split - step.predicted_energy_mwh).abs() < 1e-6);
        assert!(step.predicted_energy_mwh > 0.0);
        assert_eq!(step.confidence_lower_mwh, step.predicted_energy_mwh * 0.85);
        assert_eq!(step.confidence_upper_mwh, step.predicted_energy_mwh * 1.15);
    }

    let out = dir.path().join("reports");
    let files = toolkit.export_forecast(Some(&out)).unwrap();
    let csv = fs::read_to_string(files.csv).unwrap();
    assert_eq!(csv.lines().count(), 16);

    assert_eq!(toolkit.status().stage, SessionStage::Forecasted);
}

#[test]
fn estimate_and_forecast_reports_share_the_location_slug() {
    let dir = tempdir().unwrap();
    let mut site = site(
        WaterfallReading {
            flow_rate_m3s: 4.0,
            height_m: 30.0,
            turbine_efficiency: 0.9,
        },
        GeothermalReading::default(),
    );
    site.location.name = " Padded Site ".into();

    let summary = analyze_site(&site).unwrap();
    let estimate_files = summary.exporter().export_all(dir.path()).unwrap();

    let resources = reference_resources();
    let request = ScenarioRequest::new(Month::April, 3, ClimateScenario::Normal).unwrap();
    let projection = ClimateScenarioGenerator::default().generate(&request);
    let profile = CapacityProfile::new(
        summary.estimate.location.name.clone(),
        summary.estimate.waterfall.power_mw,
        summary.estimate.geothermal.output.power_mw,
    );
    let series = RollingForecastEngine::from_resources(&resources)
        .run(&profile, &projection)
        .unwrap();
    let forecast_files = cetk_forecast::ForecastExporter::new(&series)
        .export_all(dir.path())
        .unwrap();

    assert!(estimate_files.csv.ends_with("energy_calc_Padded_Site.csv"));
    assert!(forecast_files.csv.ends_with("lstm_forecast_Padded_Site.csv"));
}
