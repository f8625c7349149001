//! Weather condition groups and how they are drawn.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Condition group as reported by the provider (`weather[].main`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Haze,
    /// Any group without a dedicated mapping (e.g. "Smoke", "Dust").
    Other(String),
}

/// The small set of pictograms the renderer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Sun,
    Clouds,
    Rain,
    Thunderstorm,
    Snow,
}

impl Condition {
    /// Parse a provider condition group. Unknown groups are kept verbatim.
    pub fn from_provider(group: &str) -> Self {
        match group {
            "Clear" => Condition::Clear,
            "Clouds" => Condition::Clouds,
            "Rain" => Condition::Rain,
            "Drizzle" => Condition::Drizzle,
            "Thunderstorm" => Condition::Thunderstorm,
            "Snow" => Condition::Snow,
            "Mist" => Condition::Mist,
            "Fog" => Condition::Fog,
            "Haze" => Condition::Haze,
            other => Condition::Other(other.to_string()),
        }
    }

    /// Provider spelling of this group.
    pub fn as_provider(&self) -> &str {
        match self {
            Condition::Clear => "Clear",
            Condition::Clouds => "Clouds",
            Condition::Rain => "Rain",
            Condition::Drizzle => "Drizzle",
            Condition::Thunderstorm => "Thunderstorm",
            Condition::Snow => "Snow",
            Condition::Mist => "Mist",
            Condition::Fog => "Fog",
            Condition::Haze => "Haze",
            Condition::Other(raw) => raw,
        }
    }

    /// Pictogram for this condition. Unmapped groups fall back to clouds.
    pub fn icon(&self) -> Icon {
        match self {
            Condition::Clear => Icon::Sun,
            Condition::Rain | Condition::Drizzle => Icon::Rain,
            Condition::Thunderstorm => Icon::Thunderstorm,
            Condition::Snow => Icon::Snow,
            Condition::Clouds
            | Condition::Mist
            | Condition::Fog
            | Condition::Haze
            | Condition::Other(_) => Icon::Clouds,
        }
    }

    /// Short card caption.
    pub fn description(&self) -> &str {
        match self {
            Condition::Clear => "Sunny",
            Condition::Clouds => "Cloudy",
            Condition::Rain => "Rainy",
            Condition::Drizzle => "Light Rain",
            Condition::Thunderstorm => "T'storms",
            Condition::Snow => "Snow",
            Condition::Mist => "Misty",
            Condition::Fog => "Foggy",
            Condition::Haze => "Hazy",
            Condition::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_provider())
    }
}

impl From<String> for Condition {
    fn from(value: String) -> Self {
        Condition::from_provider(&value)
    }
}

impl From<Condition> for String {
    fn from(value: Condition) -> Self {
        value.as_provider().to_string()
    }
}
