//! Reduction of 3-hour forecast slots into daily summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};

use retrocast_forecast_model::temperature::round_degrees;
use retrocast_forecast_model::{Condition, DailyForecast};

use crate::owm::ForecastSlot;

/// One slot reduced to the values the daily summary needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotReading {
    pub timestamp: i64,
    pub temp: f64,
    pub condition: String,
    pub pressure_hpa: Option<f64>,
}

impl SlotReading {
    pub fn from_slot(slot: &ForecastSlot) -> Option<Self> {
        Some(Self {
            timestamp: slot.dt,
            temp: slot.main.temp,
            condition: slot.condition_group()?.to_string(),
            pressure_hpa: slot.main.pressure,
        })
    }
}

#[derive(Default)]
struct DayBucket {
    temps: Vec<f64>,
    conditions: Vec<String>,
    pressures: Vec<f64>,
}

/// Group slots by local calendar date and summarize the first `days` dates.
///
/// Dates are taken in `offset`, the location's shift from UTC, so a
/// location's day boundaries do not depend on the host time zone. Slots
/// whose timestamp cannot be represented are skipped.
pub fn summarize_days(
    readings: &[SlotReading],
    offset: FixedOffset,
    days: usize,
) -> Vec<DailyForecast> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

    for reading in readings {
        let Some(utc) = DateTime::from_timestamp(reading.timestamp, 0) else {
            continue;
        };
        let date = utc.with_timezone(&offset).date_naive();
        let bucket = buckets.entry(date).or_default();
        bucket.temps.push(reading.temp);
        bucket.conditions.push(reading.condition.clone());
        if let Some(p) = reading.pressure_hpa {
            bucket.pressures.push(p);
        }
    }

    buckets
        .into_iter()
        .take(days)
        .map(|(date, bucket)| {
            let high = bucket.temps.iter().cloned().fold(f64::MIN, f64::max);
            let low = bucket.temps.iter().cloned().fold(f64::MAX, f64::min);
            let pressure_hpa = if bucket.pressures.is_empty() {
                None
            } else {
                Some(bucket.pressures.iter().sum::<f64>() / bucket.pressures.len() as f64)
            };

            DailyForecast {
                date,
                high: round_degrees(high),
                low: round_degrees(low),
                condition: Condition::from_provider(&dominant_condition(&bucket.conditions)),
                pressure_hpa,
            }
        })
        .collect()
}

/// Most frequent entry; ties go to the entry seen first.
pub fn dominant_condition(conditions: &[String]) -> String {
    let mut best: Option<(&String, usize)> = None;
    for candidate in conditions {
        let count = conditions.iter().filter(|c| *c == candidate).count();
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((candidate, count)),
        }
    }
    best.map(|(c, _)| c.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // 2024-05-02T11:00:00Z, 06:00 in UTC-5.
    const START: i64 = 1_714_647_600;
    const SLOT: i64 = 3 * 3600;

    fn reading(slot: i64, temp: f64, condition: &str) -> SlotReading {
        SlotReading {
            timestamp: START + slot * SLOT,
            temp,
            condition: condition.to_string(),
            pressure_hpa: Some(1016.0),
        }
    }

    fn central() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    #[test]
    fn test_groups_by_local_date() {
        // Slot 6 is 00:00 local on May 3 but still May 3 05:00 UTC.
        let readings = vec![
            reading(0, 60.0, "Clear"),
            reading(5, 70.0, "Clear"),
            reading(6, 55.0, "Clouds"),
        ];
        let days = summarize_days(&readings, central(), 3);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(days[0].high, 70);
        assert_eq!(days[0].low, 60);
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
    }

    #[test]
    fn test_keeps_only_requested_days() {
        let readings: Vec<_> = (0..24).map(|i| reading(i, 60.0 + i as f64, "Rain")).collect();
        let days = summarize_days(&readings, central(), 3);
        assert_eq!(days.len(), 3);
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        let readings = vec![reading(0, 71.5, "Clear"), reading(1, 50.5, "Clear")];
        let days = summarize_days(&readings, central(), 3);
        assert_eq!(days[0].high, 72);
        assert_eq!(days[0].low, 51);
    }

    #[test]
    fn test_mean_pressure() {
        let mut a = reading(0, 60.0, "Clear");
        a.pressure_hpa = Some(1010.0);
        let mut b = reading(1, 61.0, "Clear");
        b.pressure_hpa = Some(1020.0);
        let mut c = reading(2, 62.0, "Clear");
        c.pressure_hpa = None;
        let days = summarize_days(&[a, b, c], central(), 3);
        assert_eq!(days[0].pressure_hpa, Some(1015.0));
    }

    #[test]
    fn test_dominant_condition_ties_go_to_first_seen() {
        let conditions: Vec<String> = ["Clouds", "Rain", "Rain", "Clouds"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dominant_condition(&conditions), "Clouds");

        let conditions: Vec<String> = ["Clear", "Rain", "Rain"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dominant_condition(&conditions), "Rain");
        assert_eq!(dominant_condition(&[]), "");
    }

    proptest! {
        #[test]
        fn high_is_never_below_low(temps in proptest::collection::vec(-60.0f64..130.0, 1..40)) {
            let readings: Vec<_> = temps
                .iter()
                .enumerate()
                .map(|(i, t)| reading(i as i64, *t, "Clear"))
                .collect();
            for day in summarize_days(&readings, central(), 3) {
                prop_assert!(day.high >= day.low);
            }
        }
    }
}
