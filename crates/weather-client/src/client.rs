//! Blocking OpenWeatherMap client.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use retrocast_common::clock::Stopwatch;
use retrocast_common::config::ProviderConfig;
use retrocast_common::error::{RetrocastError, RetrocastResult};
use retrocast_forecast_model::temperature::round_degrees;
use retrocast_forecast_model::{
    Condition, DailyForecast, ForecastRecord, LocationConfig, MapCity, MapReading, Units,
    FORECAST_DAYS,
};

use crate::aggregate::{summarize_days, SlotReading};
use crate::owm::{error_message, CurrentResponse, ForecastResponse};

/// 3 days of 3-hour slots.
pub const FORECAST_SLOTS: u32 = 24;

const USER_AGENT: &str = concat!("retrocast/", env!("CARGO_PKG_VERSION"));

/// Anything that can produce a forecast record for a location.
pub trait ForecastSource {
    fn fetch(&self, location: &LocationConfig) -> RetrocastResult<ForecastRecord>;
}

/// Client for the OpenWeatherMap data API.
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    retries: u32,
    backoff: Duration,
}

impl WeatherClient {
    /// Build a client from provider settings.
    pub fn new(provider: &ProviderConfig, api_key: &str) -> RetrocastResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(provider.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RetrocastError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            retries: provider.retries,
            backoff: Duration::from_millis(provider.retry_backoff_ms),
        })
    }

    /// Fetch the daily forecast and the map readings for a location.
    #[instrument(skip(self, location), fields(code = %location.code))]
    pub fn fetch_forecast(&self, location: &LocationConfig) -> RetrocastResult<ForecastRecord> {
        let watch = Stopwatch::start();

        let body = self.get_text(
            "forecast",
            location.lat,
            location.lon,
            location.units,
            Some(FORECAST_SLOTS),
        )?;
        let (days, offset) = parse_forecast(&body)?;
        let map = self.fetch_map(location);

        info!(
            city = %location.name,
            days = days.len(),
            map_cities = map.len(),
            elapsed_ms = watch.elapsed_ms(),
            "Fetched forecast"
        );

        Ok(build_record(location, days, map, Utc::now(), offset))
    }

    /// Current conditions for every map city. Failures degrade to an
    /// unavailable reading instead of failing the location.
    fn fetch_map(&self, location: &LocationConfig) -> Vec<MapReading> {
        location
            .map
            .cities
            .iter()
            .map(|city| match self.fetch_current(city, location.units) {
                Ok(current) => reading_from_current(city, &current),
                Err(e) => {
                    warn!(city = %city.name, error = %e, "Map city unavailable");
                    unavailable_reading(city)
                }
            })
            .collect()
    }

    fn fetch_current(&self, city: &MapCity, units: Units) -> RetrocastResult<CurrentResponse> {
        let body = self.get_text("weather", city.lat, city.lon, units, None)?;
        parse_json(&body, "current conditions")
    }

    /// GET an endpoint and return the body, retrying transport failures
    /// and 5xx responses.
    fn get_text(
        &self,
        endpoint: &str,
        lat: f64,
        lon: f64,
        units: Units,
        cnt: Option<u32>,
    ) -> RetrocastResult<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut query = vec![
            ("lat", format!("{lat:.4}")),
            ("lon", format!("{lon:.4}")),
            ("appid", self.api_key.clone()),
            ("units", units.as_query().to_string()),
        ];
        if let Some(cnt) = cnt {
            query.push(("cnt", cnt.to_string()));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(endpoint, lat, lon, attempt, "Provider request");

            match self.send_once(&url, &query) {
                Ok(body) => return Ok(body),
                Err(e) if attempt <= self.retries && is_retryable(&e) => {
                    warn!(endpoint, attempt, error = %e, "Provider request failed, retrying");
                    thread::sleep(self.backoff);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn send_once(&self, url: &str, query: &[(&str, String)]) -> RetrocastResult<String> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| RetrocastError::fetch(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| RetrocastError::fetch(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(RetrocastError::provider(status.as_u16(), error_message(&body)));
        }
        Ok(body)
    }
}

impl ForecastSource for WeatherClient {
    fn fetch(&self, location: &LocationConfig) -> RetrocastResult<ForecastRecord> {
        self.fetch_forecast(location)
    }
}

fn is_retryable(error: &RetrocastError) -> bool {
    match error {
        RetrocastError::Fetch { .. } => true,
        RetrocastError::Provider { status, .. } => *status >= 500,
        _ => false,
    }
}

fn parse_json<T: DeserializeOwned>(body: &str, what: &str) -> RetrocastResult<T> {
    serde_json::from_str(body)
        .map_err(|e| RetrocastError::parse(format!("malformed {what} response: {e}")))
}

/// Parse a `/forecast` body into daily summaries and the location's UTC offset.
pub fn parse_forecast(body: &str) -> RetrocastResult<(Vec<DailyForecast>, FixedOffset)> {
    let response: ForecastResponse = parse_json(body, "forecast")?;

    let offset = FixedOffset::east_opt(response.city.timezone).ok_or_else(|| {
        RetrocastError::parse(format!("invalid timezone offset {}", response.city.timezone))
    })?;

    let readings: Vec<SlotReading> = response
        .list
        .iter()
        .filter_map(SlotReading::from_slot)
        .collect();

    if readings.is_empty() {
        return Err(RetrocastError::parse("forecast response contains no slots"));
    }

    Ok((summarize_days(&readings, offset, FORECAST_DAYS), offset))
}

/// Assemble the normalized record.
pub fn build_record(
    location: &LocationConfig,
    days: Vec<DailyForecast>,
    map: Vec<MapReading>,
    fetched_at: DateTime<Utc>,
    offset: FixedOffset,
) -> ForecastRecord {
    ForecastRecord {
        code: location.code.clone(),
        city: location.name.clone(),
        region: location.region.clone(),
        units: location.units,
        issued_at: fetched_at.with_timezone(&offset),
        days,
        map_title: location.map.title.clone(),
        map,
    }
}

fn reading_from_current(city: &MapCity, current: &CurrentResponse) -> MapReading {
    MapReading {
        name: city.name.clone(),
        x: city.x,
        y: city.y,
        temp: Some(round_degrees(current.main.temp)),
        condition: current.condition_group().map(Condition::from_provider),
    }
}

fn unavailable_reading(city: &MapCity) -> MapReading {
    MapReading {
        name: city.name.clone(),
        x: city.x,
        y: city.y,
        temp: None,
        condition: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy() {
        assert!(is_retryable(&RetrocastError::fetch("timed out")));
        assert!(is_retryable(&RetrocastError::provider(503, "unavailable")));
        assert!(!is_retryable(&RetrocastError::provider(401, "bad key")));
        assert!(!is_retryable(&RetrocastError::parse("eof")));
    }

    #[test]
    fn test_parse_forecast_rejects_malformed_json() {
        let err = parse_forecast("{\"list\": [").unwrap_err();
        assert!(matches!(err, RetrocastError::Parse { .. }));
    }

    #[test]
    fn test_parse_forecast_rejects_empty_list() {
        let err = parse_forecast(r#"{"list": [], "city": {"timezone": 0}}"#).unwrap_err();
        assert!(err.to_string().contains("no slots"));
    }

    #[test]
    fn test_unavailable_reading_keeps_placement() {
        let city = MapCity::new("Paris", 48.8566, 2.3522, 220, 240);
        let reading = unavailable_reading(&city);
        assert_eq!((reading.x, reading.y), (220, 240));
        assert_eq!(reading.temp, None);
        assert_eq!(reading.temp_label(), "--");
    }

    #[test]
    fn test_current_reading_rounds_temperature() {
        let current: CurrentResponse = serde_json::from_str(
            r#"{"main": {"temp": 20.6}, "weather": [{"main": "Drizzle"}]}"#,
        )
        .unwrap();
        let city = MapCity::new("Brussels", 50.8503, 4.3517, 240, 210);
        let reading = reading_from_current(&city, &current);
        assert_eq!(reading.temp, Some(21));
        assert_eq!(reading.condition, Some(Condition::Drizzle));
    }
}
