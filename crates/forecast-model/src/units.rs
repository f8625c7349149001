//! Measurement systems and the conversions the renderer needs.

use serde::{Deserialize, Serialize};

/// Measurement system requested from the provider.
///
/// The provider converts temperatures itself, so the value is passed
/// through verbatim as its `units` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Imperial,
    Metric,
}

impl Units {
    /// Query-string value understood by the provider.
    pub fn as_query(self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }

    /// Barometric pressure formatted for the bottom bar.
    pub fn format_pressure(self, hpa: Option<f64>) -> String {
        match hpa {
            Some(hpa) => match self {
                Units::Imperial => format!("{:.2} IN.", pressure::hpa_to_inhg(hpa)),
                Units::Metric => format!("{:.0} HPA", hpa),
            },
            None => "--".to_string(),
        }
    }
}

pub mod pressure {
    const INHG_PER_HPA: f64 = 0.029_529_983;

    pub fn hpa_to_inhg(hpa: f64) -> f64 {
        hpa * INHG_PER_HPA
    }

    #[test]
    fn test_pressure() {
        assert!((hpa_to_inhg(1013.25) - 29.92).abs() < 0.01);
    }
}

pub mod temperature {
    /// Rounds a provider reading to the whole degrees shown on screen.
    ///
    /// Halves round away from zero.
    pub fn round_degrees(value: f64) -> i32 {
        value.round() as i32
    }

    #[test]
    fn test_round_degrees() {
        assert_eq!(round_degrees(71.5), 72);
        assert_eq!(round_degrees(71.49), 71);
        assert_eq!(round_degrees(-0.5), -1);
        assert_eq!(round_degrees(-3.2), -3);
    }
}
