//! ---
//! cetk_section: "12-forecasting"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Rolling forecast engine and model runtime."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Month-by-month rollout of the sequence model over a climate projection.
//!
//! Each step predicts one month from the current 12-month window, rescales
//! the reference prediction to the site's capacity and then slides the
//! window forward by the projected climate for that month.

use cetk_sim::{ClimateProjection, ClimateWindow, MAX_HORIZON_MONTHS, MIN_HORIZON_MONTHS};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    errors::{ForecastError, Result},
    model::SequenceModel,
    normalizer::Normalizer,
    resources::{ForecastResources, CLIMATE_FEATURES},
    series::{ForecastSeries, ForecastStep, SourceBreakdown, SourceRatio},
};

pub const HOURS_PER_MONTH: f64 = 730.0;
/// Monthly output of the reference system the model was trained against.
pub const REFERENCE_MONTHLY_MWH: f64 = 3500.0;
pub const CONFIDENCE_LOWER_FACTOR: f64 = 0.85;
pub const CONFIDENCE_UPPER_FACTOR: f64 = 1.15;

/// Static site output the forecast is scaled to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityProfile {
    pub location_name: String,
    pub capacity_mw: f64,
    pub waterfall_mw: f64,
    pub geo_mw: f64,
}

impl CapacityProfile {
    pub fn new(location_name: impl Into<String>, waterfall_mw: f64, geo_mw: f64) -> Self {
        Self {
            location_name: location_name.into(),
            capacity_mw: waterfall_mw + geo_mw,
            waterfall_mw,
            geo_mw,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for value in [self.capacity_mw, self.waterfall_mw, self.geo_mw] {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::InvalidCapacity(value));
            }
        }
        Ok(())
    }

    pub fn source_ratio(&self) -> SourceRatio {
        SourceRatio::from_power(self.waterfall_mw, self.geo_mw, self.capacity_mw)
    }

    /// Factor mapping reference-system energy onto this site.
    pub fn scale_factor(&self) -> f64 {
        self.capacity_mw * HOURS_PER_MONTH / REFERENCE_MONTHLY_MWH
    }
}

pub struct RollingForecastEngine<'a> {
    model: &'a dyn SequenceModel,
    input: &'a dyn Normalizer,
    output: &'a dyn Normalizer,
}

impl<'a> RollingForecastEngine<'a> {
    pub fn new(
        model: &'a dyn SequenceModel,
        input: &'a dyn Normalizer,
        output: &'a dyn Normalizer,
    ) -> Self {
        Self {
            model,
            input,
            output,
        }
    }

    pub fn from_resources(resources: &'a ForecastResources) -> Self {
        Self::new(
            resources.model(),
            resources.input_normalizer(),
            resources.output_normalizer(),
        )
    }

    /// Produces a complete series or an error; never a partial series.
    ///
    /// The projection's seed window is copied, never mutated.
    pub fn run(
        &self,
        profile: &CapacityProfile,
        projection: &ClimateProjection,
    ) -> Result<ForecastSeries> {
        let horizon = projection.months.len();
        if !(MIN_HORIZON_MONTHS..=MAX_HORIZON_MONTHS).contains(&horizon) {
            return Err(ForecastError::InvalidHorizon(horizon));
        }
        profile.validate()?;

        let scale_factor = profile.scale_factor();
        let ratio = profile.source_ratio();
        let mut window = projection.seed_window.clone();
        let mut steps = Vec::with_capacity(horizon);

        for (index, month) in projection.months.iter().enumerate() {
            let reference = self.predict_reference(&window)?;
            if !reference.is_finite() {
                return Err(ForecastError::NonFinitePrediction { step: index });
            }

            let energy = reference * scale_factor;
            let waterfall_mwh = energy * ratio.waterfall;
            let geothermal_mwh = energy * ratio.geothermal;
            debug!(
                step = index,
                month = %month.label,
                reference_mwh = reference,
                energy_mwh = energy,
                "forecast step"
            );

            steps.push(ForecastStep {
                month_label: month.label.clone(),
                climate_input: month.point,
                predicted_energy_mwh: energy,
                power_mw: energy / HOURS_PER_MONTH,
                confidence_lower_mwh: energy * CONFIDENCE_LOWER_FACTOR,
                confidence_upper_mwh: energy * CONFIDENCE_UPPER_FACTOR,
                breakdown: SourceBreakdown {
                    waterfall_mwh,
                    geothermal_mwh,
                    waterfall_mw: waterfall_mwh / HOURS_PER_MONTH,
                    geothermal_mw: geothermal_mwh / HOURS_PER_MONTH,
                },
            });
            window.push(month.point);
        }

        let total_annual_mwh = steps.iter().map(|step| step.predicted_energy_mwh).sum();
        info!(
            location = %profile.location_name,
            scenario = %projection.scenario,
            months = horizon,
            total_mwh = total_annual_mwh,
            "forecast generated"
        );

        Ok(ForecastSeries {
            location: profile.location_name.clone(),
            climate_scenario: projection.scenario,
            capacity_mw: profile.capacity_mw,
            source_ratio: ratio,
            steps,
            total_annual_mwh,
        })
    }

    /// One model evaluation: normalize, predict, inverse-transform.
    fn predict_reference(&self, window: &ClimateWindow) -> Result<f64> {
        let rows = window.to_rows();
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let matrix = DMatrix::from_row_slice(rows.len(), CLIMATE_FEATURES, &flat);
        let normalized = self.input.transform(&matrix)?;
        let prediction = self.model.predict(&normalized)?;
        self.output.inverse_transform(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::FittedScaler;
    use cetk_sim::{
        ClimateMonthlyPoint, ClimateScenario, ClimateScenarioGenerator, Month, ScenarioRequest,
    };
    use std::sync::Mutex;

    /// Returns a fixed value and records the windows it was shown.
    struct Recording {
        value: f64,
        seen: Mutex<Vec<Vec<f64>>>,
    }

    impl Recording {
        fn new(value: f64) -> Self {
            Self {
                value,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl SequenceModel for Recording {
        fn input_shape(&self) -> (usize, usize) {
            (12, 2)
        }

        fn predict(&self, window: &DMatrix<f64>) -> Result<f64> {
            let temperatures = window.column(0).iter().copied().collect();
            self.seen.lock().unwrap().push(temperatures);
            Ok(self.value)
        }
    }

    fn identity(features: usize) -> FittedScaler {
        FittedScaler::MinMax {
            scale: vec![1.0; features],
            min: vec![0.0; features],
        }
    }

    fn projection(months: usize) -> ClimateProjection {
        let request = ScenarioRequest::new(Month::November, months, ClimateScenario::Normal)
            .unwrap();
        ClimateScenarioGenerator::default().generate(&request)
    }

    #[test]
    fn reference_output_scales_with_capacity() {
        let model = Recording::new(3500.0);
        let (input, output) = (identity(2), identity(1));
        let engine = RollingForecastEngine::new(&model, &input, &output);
        let profile = CapacityProfile::new("Site", 3.0, 1.0);

        let series = engine.run(&profile, &projection(12)).unwrap();
        for step in &series.steps {
            assert!((step.predicted_energy_mwh - 4.0 * 730.0).abs() < 1e-9);
            assert!((step.power_mw - 4.0).abs() < 1e-12);
            assert!((step.breakdown.waterfall_mw - 3.0).abs() < 1e-12);
            assert!((step.breakdown.geothermal_mw - 1.0).abs() < 1e-12);
            assert_eq!(step.confidence_lower_mwh, step.predicted_energy_mwh * 0.85);
            assert_eq!(step.confidence_upper_mwh, step.predicted_energy_mwh * 1.15);
        }
        assert!((series.total_annual_mwh - 12.0 * 4.0 * 730.0).abs() < 1e-6);
    }

    #[test]
    fn window_slides_one_month_per_step() {
        let model = Recording::new(1.0);
        let (input, output) = (identity(2), identity(1));
        let engine = RollingForecastEngine::new(&model, &input, &output);
        let projection = projection(4);

        engine
            .run(&CapacityProfile::new("Site", 1.0, 0.0), &projection)
            .unwrap();

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|window| window.len() == 12));
        let seed: Vec<f64> = projection
            .seed_window
            .iter()
            .map(|point| point.temperature_c)
            .collect();
        assert_eq!(seen[0], seed);
        assert_eq!(seen[1][..11], seed[1..]);
        assert_eq!(seen[1][11], projection.months[0].point.temperature_c);
        assert_eq!(seen[3][11], projection.months[2].point.temperature_c);
        assert_eq!(projection.seed_window.len(), 12);
    }

    #[test]
    fn zero_capacity_gives_zeros_with_even_split() {
        let model = Recording::new(5000.0);
        let (input, output) = (identity(2), identity(1));
        let engine = RollingForecastEngine::new(&model, &input, &output);

        let series = engine
            .run(&CapacityProfile::new("Nowhere", 0.0, 0.0), &projection(3))
            .unwrap();
        assert_eq!(series.total_annual_mwh, 0.0);
        assert_eq!(series.source_ratio, SourceRatio::from_power(0.0, 0.0, 0.0));
        assert!(series.steps.iter().all(|step| step.power_mw == 0.0));
    }

    #[test]
    fn horizon_and_capacity_are_validated() {
        let model = Recording::new(1.0);
        let (input, output) = (identity(2), identity(1));
        let engine = RollingForecastEngine::new(&model, &input, &output);
        let profile = CapacityProfile::new("Site", 1.0, 1.0);

        let mut short = projection(3);
        short.months.truncate(2);
        assert!(matches!(
            engine.run(&profile, &short),
            Err(ForecastError::InvalidHorizon(2))
        ));

        let mut negative = profile.clone();
        negative.capacity_mw = -1.0;
        assert!(matches!(
            engine.run(&negative, &projection(3)),
            Err(ForecastError::InvalidCapacity(_))
        ));
        assert!(model.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn non_finite_prediction_aborts() {
        let model = Recording::new(f64::NAN);
        let (input, output) = (identity(2), identity(1));
        let engine = RollingForecastEngine::new(&model, &input, &output);
        let err = engine
            .run(&CapacityProfile::new("Site", 1.0, 0.0), &projection(6))
            .unwrap_err();
        assert!(matches!(err, ForecastError::NonFinitePrediction { step: 0 }));
    }

    #[test]
    fn observed_seed_window_is_used() {
        let model = Recording::new(1.0);
        let (input, output) = (identity(2), identity(1));
        let engine = RollingForecastEngine::new(&model, &input, &output);
        let observed =
            ClimateWindow::new(vec![ClimateMonthlyPoint::new(30.0, 10.0); 12]).unwrap();

        engine
            .run(
                &CapacityProfile::new("Site", 1.0, 0.0),
                &projection(3).with_seed_window(observed),
            )
            .unwrap();
        assert!(model.seen.lock().unwrap()[0].iter().all(|t| *t == 30.0));
    }
}
