//! OpenWeatherMap wire types.
//!
//! Only the fields Retrocast reads are modelled; everything else in the
//! responses is ignored by serde.

use serde::Deserialize;

/// Response of `GET /forecast` (5 day / 3 hour forecast).
#[derive(Deserialize, Debug)]
pub struct ForecastResponse {
    pub list: Vec<ForecastSlot>,

    pub city: City,
}

/// One 3-hour forecast slot.
#[derive(Deserialize, Debug)]
pub struct ForecastSlot {
    /// Slot start, Unix seconds (UTC).
    pub dt: i64,

    pub main: MainReadings,

    pub weather: Vec<WeatherGroup>,
}

#[derive(Deserialize, Debug)]
pub struct City {
    #[serde(default)]
    pub name: String,

    /// Shift from UTC in seconds.
    #[serde(default)]
    pub timezone: i32,
}

/// Response of `GET /weather` (current conditions).
#[derive(Deserialize, Debug)]
pub struct CurrentResponse {
    pub main: MainReadings,

    pub weather: Vec<WeatherGroup>,

    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize, Debug)]
pub struct MainReadings {
    pub temp: f64,

    /// Sea-level pressure, hPa.
    #[serde(default)]
    pub pressure: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct WeatherGroup {
    /// Condition group, e.g. "Rain".
    pub main: String,

    #[serde(default)]
    pub description: String,
}

/// Error body returned with non-2xx statuses.
#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

impl ForecastSlot {
    /// Primary condition group of the slot.
    pub fn condition_group(&self) -> Option<&str> {
        self.weather.first().map(|w| w.main.as_str())
    }
}

impl CurrentResponse {
    pub fn condition_group(&self) -> Option<&str> {
        self.weather.first().map(|w| w.main.as_str())
    }
}

/// Best-effort message extraction from an error body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_message() {
        let body = r#"{"cod":401, "message": "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."}"#;
        assert!(error_message(body).starts_with("Invalid API key."));
    }

    #[test]
    fn test_error_message_falls_back_to_raw_body() {
        assert_eq!(error_message("  bad gateway \n"), "bad gateway");
    }

    #[test]
    fn test_current_response_ignores_unknown_fields() {
        let body = r#"{
            "coord": {"lon": -95.37, "lat": 29.76},
            "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
            "main": {"temp": 81.4, "feels_like": 85.0, "pressure": 1012, "humidity": 70},
            "timezone": -18000,
            "name": "Houston"
        }"#;
        let parsed: CurrentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.condition_group(), Some("Clouds"));
        assert_eq!(parsed.main.pressure, Some(1012.0));
        assert_eq!(parsed.name, "Houston");
    }
}
