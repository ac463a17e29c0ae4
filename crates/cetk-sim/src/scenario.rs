//! ---
//! cetk_section: "11-climate-simulation"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Climate scenario generation and monthly climate types."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::climate::ClimateMonthlyPoint;
use crate::errors::{ClimateError, Result};

/// Multipliers applied to the monthly normals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMultiplier {
    pub temperature: f64,
    pub rainfall: f64,
}

impl ScenarioMultiplier {
    pub fn apply(&self, point: ClimateMonthlyPoint) -> ClimateMonthlyPoint {
        ClimateMonthlyPoint::new(
            point.temperature_c * self.temperature,
            point.rainfall_mm * self.rainfall,
        )
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum ClimateScenario {
    #[default]
    #[strum(to_string = "Normal")]
    Normal,
    #[strum(to_string = "Wetter (More Monsoon)", serialize = "wetter")]
    Wetter,
    #[strum(to_string = "Drier (Less Rain)", serialize = "drier")]
    Drier,
    #[strum(to_string = "Hotter")]
    Hotter,
}

impl ClimateScenario {
    pub fn multiplier(self) -> ScenarioMultiplier {
        let (temperature, rainfall) = match self {
            ClimateScenario::Normal => (1.0, 1.0),
            ClimateScenario::Wetter => (1.0, 1.3),
            ClimateScenario::Drier => (1.0, 0.7),
            ClimateScenario::Hotter => (1.1, 0.9),
        };
        ScenarioMultiplier {
            temperature,
            rainfall,
        }
    }

    /// Display label, e.g. `Wetter (More Monsoon)`.
    pub fn label(self) -> String {
        self.to_string()
    }

    /// Accepts short tags (`wetter`) and full labels, case-insensitively.
    pub fn parse(value: &str) -> Result<Self> {
        ClimateScenario::from_str(value.trim())
            .map_err(|_| ClimateError::UnknownScenario(value.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_tags_and_labels() {
        assert_eq!(ClimateScenario::parse("wetter").unwrap(), ClimateScenario::Wetter);
        assert_eq!(
            ClimateScenario::parse("Drier (Less Rain)").unwrap(),
            ClimateScenario::Drier
        );
        assert_eq!(ClimateScenario::parse("HOTTER").unwrap(), ClimateScenario::Hotter);
        assert!(matches!(
            ClimateScenario::parse("apocalyptic"),
            Err(ClimateError::UnknownScenario(_))
        ));
    }

    #[test]
    fn multipliers_match_scenario_table() {
        let hotter = ClimateScenario::Hotter.multiplier();
        assert_eq!((hotter.temperature, hotter.rainfall), (1.1, 0.9));
        let scaled = ClimateScenario::Wetter
            .multiplier()
            .apply(ClimateMonthlyPoint::new(28.0, 400.0));
        assert_eq!(scaled.temperature_c, 28.0);
        assert!((scaled.rainfall_mm - 520.0).abs() < 1e-9);
        assert_eq!(ClimateScenario::iter().count(), 4);
    }

    #[test]
    fn serde_uses_short_tags() {
        assert_eq!(
            serde_json::to_string(&ClimateScenario::Wetter).unwrap(),
            "\"wetter\""
        );
        assert_eq!(ClimateScenario::Wetter.label(), "Wetter (More Monsoon)");
    }
}
