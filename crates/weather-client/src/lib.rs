//! Retrocast Weather Client
//!
//! Fetches forecasts from OpenWeatherMap and normalizes them into
//! [`ForecastRecord`](retrocast_forecast_model::ForecastRecord)s:
//! - `/forecast` (3-hour slots) reduced to daily high/low/condition
//! - `/weather` (current conditions) for every regional map city
//!
//! Requests are blocking with a bounded timeout and a small retry budget.

pub mod aggregate;
pub mod client;
pub mod owm;

pub use client::{parse_forecast, ForecastSource, WeatherClient, FORECAST_SLOTS};
