//! ---
//! cetk_section: "11-climate-simulation"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Climate scenario generation and monthly climate types."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
//! Monthly climate values, the 12-month rolling window and the reference
//! normals table.

use std::collections::VecDeque;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::errors::{ClimateError, Result};

/// Number of months the forecasting model looks back over.
pub const WINDOW_MONTHS: usize = 12;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Month {
    #[strum(to_string = "Jan", serialize = "January")]
    January,
    #[strum(to_string = "Feb", serialize = "February")]
    February,
    #[strum(to_string = "Mar", serialize = "March")]
    March,
    #[strum(to_string = "Apr", serialize = "April")]
    April,
    #[strum(to_string = "May")]
    May,
    #[strum(to_string = "Jun", serialize = "June")]
    June,
    #[strum(to_string = "Jul", serialize = "July")]
    July,
    #[strum(to_string = "Aug", serialize = "August")]
    August,
    #[strum(to_string = "Sep", serialize = "September", serialize = "Sept")]
    September,
    #[strum(to_string = "Oct", serialize = "October")]
    October,
    #[strum(to_string = "Nov", serialize = "November")]
    November,
    #[strum(to_string = "Dec", serialize = "December")]
    December,
}

impl Month {
    /// Calendar number, January = 1.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(number: u32) -> Option<Self> {
        Month::iter().nth(number.checked_sub(1)? as usize)
    }

    /// Accepts full names, three-letter abbreviations and calendar numbers.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if let Ok(number) = trimmed.parse::<u32>() {
            return Month::from_number(number)
                .ok_or_else(|| ClimateError::UnknownMonth(value.to_owned()));
        }
        Month::from_str(trimmed).map_err(|_| ClimateError::UnknownMonth(value.to_owned()))
    }

    /// Month `offset` months after `self`, with the number of January crossings.
    pub fn advance(self, offset: usize) -> (Month, usize) {
        let index = self as usize + offset;
        let month = Month::from_number((index % 12) as u32 + 1).unwrap_or(self);
        (month, index / 12)
    }

    pub fn current() -> Self {
        use chrono::Datelike;
        Month::from_number(chrono::Local::now().month()).unwrap_or(Month::January)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateMonthlyPoint {
    pub temperature_c: f64,
    pub rainfall_mm: f64,
}

impl ClimateMonthlyPoint {
    pub const fn new(temperature_c: f64, rainfall_mm: f64) -> Self {
        Self {
            temperature_c,
            rainfall_mm,
        }
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.temperature_c, self.rainfall_mm]
    }
}

/// Exactly [`WINDOW_MONTHS`] chronological points, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<ClimateMonthlyPoint>",
    into = "Vec<ClimateMonthlyPoint>"
)]
pub struct ClimateWindow {
    points: VecDeque<ClimateMonthlyPoint>,
}

impl ClimateWindow {
    pub fn new(points: Vec<ClimateMonthlyPoint>) -> Result<Self> {
        if points.len() != WINDOW_MONTHS {
            return Err(ClimateError::InvalidWindow {
                expected: WINDOW_MONTHS,
                actual: points.len(),
            });
        }
        Ok(Self {
            points: points.into(),
        })
    }

    /// Appends the newest month and returns the month that fell out.
    pub fn push(&mut self, point: ClimateMonthlyPoint) -> ClimateMonthlyPoint {
        let dropped = self.points.pop_front().unwrap_or(point);
        self.points.push_back(point);
        dropped
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClimateMonthlyPoint> {
        self.points.iter()
    }

    pub fn newest(&self) -> Option<&ClimateMonthlyPoint> {
        self.points.back()
    }

    /// Row-major `[temperature, rainfall]` pairs in chronological order.
    pub fn to_rows(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(ClimateMonthlyPoint::as_array).collect()
    }
}

impl TryFrom<Vec<ClimateMonthlyPoint>> for ClimateWindow {
    type Error = ClimateError;

    fn try_from(points: Vec<ClimateMonthlyPoint>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<ClimateWindow> for Vec<ClimateMonthlyPoint> {
    fn from(window: ClimateWindow) -> Self {
        window.points.into()
    }
}

/// Long-run average temperature and rainfall for each calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateNormals {
    months: [ClimateMonthlyPoint; 12],
}

const REFERENCE_NORMALS: [ClimateMonthlyPoint; 12] = [
    ClimateMonthlyPoint::new(19.0, 20.0),
    ClimateMonthlyPoint::new(22.0, 25.0),
    ClimateMonthlyPoint::new(26.0, 50.0),
    ClimateMonthlyPoint::new(28.0, 100.0),
    ClimateMonthlyPoint::new(28.0, 250.0),
    ClimateMonthlyPoint::new(28.0, 350.0),
    ClimateMonthlyPoint::new(28.0, 400.0),
    ClimateMonthlyPoint::new(28.0, 350.0),
    ClimateMonthlyPoint::new(27.0, 300.0),
    ClimateMonthlyPoint::new(26.0, 150.0),
    ClimateMonthlyPoint::new(23.0, 30.0),
    ClimateMonthlyPoint::new(20.0, 15.0),
];

impl Default for ClimateNormals {
    fn default() -> Self {
        Self {
            months: REFERENCE_NORMALS,
        }
    }
}

impl ClimateNormals {
    /// Builds a table from twelve `[temperature_c, rainfall_mm]` rows, January first.
    pub fn from_rows(rows: &[[f64; 2]]) -> Result<Self> {
        if rows.len() != 12 {
            return Err(ClimateError::InvalidNormals(rows.len()));
        }
        let mut months = REFERENCE_NORMALS;
        for (slot, row) in months.iter_mut().zip(rows) {
            *slot = ClimateMonthlyPoint::new(row[0], row[1]);
        }
        Ok(Self { months })
    }

    pub fn get(&self, month: Month) -> ClimateMonthlyPoint {
        self.months[month as usize]
    }

    /// The twelve months immediately preceding `start`, unperturbed.
    pub fn seed_window(&self, start: Month) -> ClimateWindow {
        // start-12 ..= start-1, oldest first; start-12 shares start's calendar month.
        let points = (0..WINDOW_MONTHS)
            .map(|offset| self.get(start.advance(offset).0))
            .collect::<VecDeque<_>>();
        ClimateWindow { points }
    }
}
