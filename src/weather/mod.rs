//! Hourly weather observations and takeoff-time lookup
//!
//! The weather file is a JSON object keyed by ISO-8601 timestamps with no
//! guaranteed order. It is indexed once into a vector sorted by instant so
//! that each lesson lookup is a binary search for the latest report at or
//! before takeoff.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::WeatherObservation;
use crate::timestamps::{TzSource, parse_timestamp, to_iso};
use crate::{AuditError, Result};

#[derive(Debug, Clone)]
struct SeriesEntry {
    key: String,
    at: DateTime<FixedOffset>,
    observation: WeatherObservation,
}

/// A report picked for a takeoff, with the key it was filed under
#[derive(Debug, Clone, Copy)]
pub struct LocatedReport<'a> {
    pub key: &'a str,
    pub at: DateTime<FixedOffset>,
    pub observation: &'a WeatherObservation,
}

/// Immutable, chronologically sorted index of weather reports
#[derive(Debug, Clone, Default)]
pub struct ObservationSeries {
    entries: Vec<SeriesEntry>,
    by_key: HashMap<String, usize>,
}

impl ObservationSeries {
    /// Index `(key, report)` pairs. Keys without an offset are read with
    /// `tz`; keys that do not parse are dropped.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, WeatherObservation)>,
        tz: TzSource,
    ) -> Self {
        let mut indexed: Vec<SeriesEntry> = entries
            .into_iter()
            .filter_map(|(key, observation)| match parse_timestamp(&key, tz) {
                Ok(at) => Some(SeriesEntry {
                    key,
                    at,
                    observation,
                }),
                Err(e) => {
                    warn!("Dropping weather report: {}", e);
                    None
                }
            })
            .collect();

        indexed.sort_by_key(|entry| entry.at);
        let by_key = indexed
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.key.clone(), index))
            .collect();

        Self {
            entries: indexed,
            by_key,
        }
    }

    /// Build the series from the decoded weather file
    pub fn from_value(value: &Value, tz: TzSource) -> Result<Self> {
        let Some(reports) = value.as_object() else {
            return Err(AuditError::record("weather data is not a JSON object"));
        };

        let series = Self::from_entries(
            reports
                .iter()
                .map(|(key, report)| (key.clone(), WeatherObservation::from_value(report))),
            tz,
        );
        debug!(
            "Indexed {} of {} weather reports",
            series.len(),
            reports.len()
        );
        Ok(series)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The report filed exactly at takeoff, else the most recent one before
    /// it. `None` when every report is later than takeoff.
    #[must_use]
    pub fn locate(&self, takeoff: &DateTime<FixedOffset>) -> Option<LocatedReport<'_>> {
        let index = match self.by_key.get(&to_iso(takeoff)) {
            Some(&index) => index,
            None => self
                .entries
                .partition_point(|entry| entry.at <= *takeoff)
                .checked_sub(1)?,
        };

        let entry = &self.entries[index];
        Some(LocatedReport {
            key: &entry.key,
            at: entry.at,
            observation: &entry.observation,
        })
    }

    #[must_use]
    pub fn find_report(&self, takeoff: &DateTime<FixedOffset>) -> Option<&WeatherObservation> {
        self.locate(takeoff).map(|located| located.observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{VisibilityMeasurement, WindMeasurement};
    use rstest::{fixture, rstest};
    use serde_json::json;

    fn report(visibility: f64) -> Value {
        json!({
            "visibility": {"prevailing": visibility, "units": "SM"},
            "wind": "calm",
            "sky": "clear"
        })
    }

    // Keys deliberately out of order; visibility doubles as a marker
    #[fixture]
    fn series() -> ObservationSeries {
        ObservationSeries::from_value(
            &json!({
                "2017-04-21T08:00:00-04:00": report(8.0),
                "2017-04-21T07:00:00-04:00": report(7.0),
                "2017-04-21T10:00:00-04:00": report(10.0),
                "2017-04-20T23:00:00-04:00": report(23.0),
            }),
            TzSource::None,
        )
        .unwrap()
    }

    fn marker(observation: &WeatherObservation) -> f64 {
        match observation.visibility {
            VisibilityMeasurement::Value { prevailing, .. } => prevailing,
            VisibilityMeasurement::Unavailable => f64::NAN,
        }
    }

    fn at(text: &str) -> DateTime<FixedOffset> {
        parse_timestamp(text, TzSource::None).unwrap()
    }

    #[rstest]
    #[case("2017-04-21T08:00:00-04:00", 8.0)]
    #[case("2017-04-21T08:30:00-04:00", 8.0)]
    #[case("2017-04-21T09:59:59-04:00", 8.0)]
    #[case("2017-04-21T07:00:00-04:00", 7.0)]
    #[case("2017-04-21T06:00:00-04:00", 23.0)]
    #[case("2017-04-22T12:00:00-04:00", 10.0)]
    fn test_locate_exact_or_prior(
        series: ObservationSeries,
        #[case] takeoff: &str,
        #[case] expected: f64,
    ) {
        let found = series.find_report(&at(takeoff)).unwrap();
        assert_eq!(marker(found), expected);
    }

    #[rstest]
    fn test_nothing_before_first_report(series: ObservationSeries) {
        assert!(series.find_report(&at("2017-04-20T22:59:00-04:00")).is_none());
        assert!(
            ObservationSeries::default()
                .find_report(&at("2017-04-21T08:00:00-04:00"))
                .is_none()
        );
    }

    #[rstest]
    fn test_other_offsets_compare_chronologically(series: ObservationSeries) {
        // 12:30Z is 08:30 EDT
        let located = series.locate(&at("2017-04-21T12:30:00+00:00")).unwrap();
        assert_eq!(located.key, "2017-04-21T08:00:00-04:00");
        // 11:00Z is exactly the 07:00 EDT report
        let located = series.locate(&at("2017-04-21T11:00:00Z")).unwrap();
        assert_eq!(located.key, "2017-04-21T07:00:00-04:00");
    }

    #[test]
    fn test_bad_keys_and_reports() {
        let series = ObservationSeries::from_value(
            &json!({
                "yesterday": report(1.0),
                "2017-04-21T08:00:00-04:00": {"wind": {"speed": "fast"}},
            }),
            TzSource::None,
        )
        .unwrap();
        assert_eq!(series.len(), 1);

        let found = series.find_report(&at("2017-04-21T08:00:00-04:00")).unwrap();
        assert_eq!(found.wind, WindMeasurement::Unavailable);
        assert_eq!(found.visibility, VisibilityMeasurement::Unavailable);

        assert!(ObservationSeries::from_value(&json!([1, 2]), TzSource::None).is_err());
    }
}
