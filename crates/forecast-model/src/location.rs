//! Location configuration.
//!
//! A location is static for the run: where to fetch the forecast for,
//! which units to request, and how its regional map is laid out.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::units::Units;

/// One configured forecast location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Short code used in the output file name (e.g. "ATX").
    pub code: String,

    /// Display name shown in the header (e.g. "Austin").
    pub name: String,

    /// Region label shown next to the name (e.g. "Metro").
    pub region: String,

    /// Latitude in decimal degrees.
    pub lat: f64,

    /// Longitude in decimal degrees.
    pub lon: f64,

    /// Units requested from the provider.
    pub units: Units,

    /// Regional map shown in the second segment.
    pub map: MapConfig,
}

/// Regional map layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Caption drawn above the region outline.
    pub title: String,

    /// Cities plotted on the map, in drawing order.
    pub cities: Vec<MapCity>,
}

/// A city plotted on the regional map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapCity {
    pub name: String,
    pub lat: f64,
    pub lon: f64,

    /// Screen placement of the icon center (pixels, 640x480 canvas).
    pub x: i32,
    pub y: i32,
}

impl LocationConfig {
    /// File name of the rendered video, e.g. `ATXweather.mp4`.
    pub fn output_file_name(&self) -> String {
        format!("{}weather.mp4", self.code)
    }

    /// Full output path inside `output_dir`.
    pub fn output_path(&self, output_dir: impl AsRef<Path>) -> PathBuf {
        output_dir.as_ref().join(self.output_file_name())
    }
}

impl MapCity {
    pub fn new(name: &str, lat: f64, lon: f64, x: i32, y: i32) -> Self {
        Self {
            name: name.to_string(),
            lat,
            lon,
            x,
            y,
        }
    }
}

/// Austin, TX in imperial units.
pub fn austin() -> LocationConfig {
    LocationConfig {
        code: "ATX".to_string(),
        name: "Austin".to_string(),
        region: "Metro".to_string(),
        lat: 30.2672,
        lon: -97.7431,
        units: Units::Imperial,
        map: MapConfig {
            title: "UNITED STATES".to_string(),
            cities: vec![
                MapCity::new("Houston", 29.7604, -95.3698, 320, 320),
                MapCity::new("Dallas", 32.7767, -96.7970, 290, 250),
                MapCity::new("San Antonio", 29.4241, -98.4936, 260, 320),
                MapCity::new("El Paso", 31.7619, -106.4850, 150, 290),
            ],
        },
    }
}

/// London, UK in metric units.
pub fn london() -> LocationConfig {
    LocationConfig {
        code: "LDN".to_string(),
        name: "London".to_string(),
        region: "Metro".to_string(),
        lat: 51.5074,
        lon: -0.1278,
        units: Units::Metric,
        map: MapConfig {
            title: "WESTERN EUROPE".to_string(),
            cities: vec![
                MapCity::new("Paris", 48.8566, 2.3522, 220, 240),
                MapCity::new("Berlin", 52.5200, 13.4050, 350, 200),
                MapCity::new("Amsterdam", 52.3676, 4.9041, 250, 170),
                MapCity::new("Brussels", 50.8503, 4.3517, 240, 210),
            ],
        },
    }
}

/// The two locations rendered when no configuration overrides them.
pub fn builtin_locations() -> Vec<LocationConfig> {
    vec![austin(), london()]
}
