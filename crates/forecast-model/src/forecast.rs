//! Normalized forecast records.
//!
//! A [`ForecastRecord`] is the only input the renderer sees. It is built
//! by the fetcher from provider responses and carries everything needed to
//! draw both video segments.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::units::Units;

/// Number of day cards in the forecast segment.
pub const FORECAST_DAYS: usize = 3;

/// Normalized forecast for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Location code (e.g. "ATX").
    pub code: String,

    /// Display name.
    pub city: String,

    /// Region label.
    pub region: String,

    /// Units the temperatures are expressed in.
    pub units: Units,

    /// When the forecast was fetched, in the location's UTC offset.
    pub issued_at: DateTime<FixedOffset>,

    /// Daily summaries in ascending date order.
    pub days: Vec<DailyForecast>,

    /// Caption of the regional map.
    #[serde(default)]
    pub map_title: String,

    /// Current conditions for the regional map, in map drawing order.
    #[serde(default)]
    pub map: Vec<MapReading>,
}

/// Summary of one forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Calendar date in the location's UTC offset.
    pub date: NaiveDate,

    /// Highest temperature, whole degrees.
    pub high: i32,

    /// Lowest temperature, whole degrees.
    pub low: i32,

    /// Dominant condition of the day.
    pub condition: Condition,

    /// Mean sea-level pressure (hPa), when reported.
    #[serde(default)]
    pub pressure_hpa: Option<f64>,
}

/// Current conditions for one map city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapReading {
    pub name: String,

    /// Screen placement of the icon center.
    pub x: i32,
    pub y: i32,

    /// Rounded temperature; `None` when the city could not be fetched.
    pub temp: Option<i32>,

    /// Current condition; `None` when the city could not be fetched.
    pub condition: Option<Condition>,
}

impl DailyForecast {
    /// Three-letter upper-case weekday, e.g. "THU".
    pub fn day_name(&self) -> String {
        self.date.format("%a").to_string().to_uppercase()
    }
}

impl MapReading {
    /// Temperature label, `--` when unavailable.
    pub fn temp_label(&self) -> String {
        match self.temp {
            Some(t) => format!("{t}°"),
            None => "--".to_string(),
        }
    }
}

impl ForecastRecord {
    /// Check that the record carries what the renderer needs.
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.days.len() < FORECAST_DAYS {
            return Err(ForecastError::MissingDays {
                code: self.code.clone(),
                expected: FORECAST_DAYS,
                found: self.days.len(),
            });
        }

        for day in self.days.iter().take(FORECAST_DAYS) {
            if day.low > day.high {
                return Err(ForecastError::InvalidDay {
                    code: self.code.clone(),
                    date: day.date,
                    message: format!("low {} is above high {}", day.low, day.high),
                });
            }
        }

        if self
            .days
            .windows(2)
            .any(|pair| pair[0].date >= pair[1].date)
        {
            return Err(ForecastError::Unordered {
                code: self.code.clone(),
            });
        }

        Ok(())
    }

    /// The days shown on the cards.
    pub fn card_days(&self) -> &[DailyForecast] {
        &self.days[..self.days.len().min(FORECAST_DAYS)]
    }

    /// Pressure shown on the bottom bar (first forecast day).
    pub fn headline_pressure(&self) -> Option<f64> {
        self.days.first().and_then(|d| d.pressure_hpa)
    }
}

/// Reasons a forecast record cannot be rendered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error("forecast for {code} has {found} day(s), {expected} required")]
    MissingDays {
        code: String,
        expected: usize,
        found: usize,
    },

    #[error("forecast for {code} on {date} is invalid: {message}")]
    InvalidDay {
        code: String,
        date: NaiveDate,
        message: String,
    },

    #[error("forecast days for {code} are not in ascending date order")]
    Unordered { code: String },
}
