//! Sunrise/sunset table and day/night classification
//!
//! The day-cycle file maps a year to `"mm-dd"` keys with local 24h
//! sunrise and sunset times, plus a single IANA `timezone` that all
//! times in the file (and any takeoff without an offset) are read in.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime};
use chrono_tz::Tz;
use serde_json::Value;
use tracing::{debug, warn};

use crate::timestamps::{TzSource, localize, parse_timestamp};
use crate::{AuditError, Result};

const TIMEZONE_KEY: &str = "timezone";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
}

#[derive(Debug, Clone)]
pub struct DayCycleTable {
    timezone: Tz,
    years: BTreeMap<i32, BTreeMap<String, SunTimes>>,
}

fn parse_clock(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

fn parse_sun_times(entry: &Value) -> Option<SunTimes> {
    let sunrise = entry.get("sunrise")?.as_str().and_then(parse_clock)?;
    let sunset = entry.get("sunset")?.as_str().and_then(parse_clock)?;
    Some(SunTimes { sunrise, sunset })
}

impl DayCycleTable {
    #[must_use]
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            years: BTreeMap::new(),
        }
    }

    /// Build the table from the decoded day-cycle file. An unknown time
    /// zone is an error; unreadable years or dates are skipped.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(root) = value.as_object() else {
            return Err(AuditError::record("day-cycle data is not a JSON object"));
        };

        let name = root
            .get(TIMEZONE_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| AuditError::record("day-cycle data has no timezone"))?;
        let timezone: Tz = name.trim().parse().map_err(|_| AuditError::UnknownTimezone {
            name: name.to_string(),
        })?;

        let mut table = Self::new(timezone);
        for (key, dates) in root.iter().filter(|(key, _)| key.as_str() != TIMEZONE_KEY) {
            let Ok(year) = key.trim().parse::<i32>() else {
                warn!("Skipping day-cycle key '{}': not a year", key);
                continue;
            };
            let Some(dates) = dates.as_object() else {
                warn!("Skipping day-cycle year {}: not an object", year);
                continue;
            };
            for (date, entry) in dates {
                match parse_sun_times(entry) {
                    Some(times) => table.insert(year, date, times),
                    None => warn!("Skipping day-cycle entry {}-{}: unreadable times", year, date),
                }
            }
        }

        debug!("Loaded day-cycle table with {} dates in {}", table.len(), table.timezone);
        Ok(table)
    }

    pub fn insert(&mut self, year: i32, month_day: &str, times: SunTimes) {
        self.years
            .entry(year)
            .or_default()
            .insert(month_day.trim().to_string(), times);
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.years.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn sun_times(&self, year: i32, month_day: &str) -> Option<SunTimes> {
        self.years.get(&year)?.get(month_day).copied()
    }

    /// Parse a time, reading it in the table's zone when it has no offset
    pub fn parse_instant(&self, text: &str) -> Result<DateTime<FixedOffset>> {
        parse_timestamp(text, TzSource::Named(self.timezone))
    }

    /// Whether `at` falls strictly between sunrise and sunset on its local
    /// date. `None` when the table has no entry for that date.
    #[must_use]
    pub fn is_daytime(&self, at: &DateTime<FixedOffset>) -> Option<bool> {
        let local = at.with_timezone(&self.timezone);
        let month_day = local.format("%m-%d").to_string();
        let times = self.sun_times(local.year(), &month_day)?;

        let date = local.date_naive();
        let zone = TzSource::Named(self.timezone);
        let sunrise = localize(date.and_time(times.sunrise), zone)?;
        let sunset = localize(date.and_time(times.sunset), zone)?;

        Some(sunrise < *at && *at < sunset)
    }
}
