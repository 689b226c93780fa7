//! Timestamp parsing with time-zone fallback
//!
//! Lesson files, student rosters and observation keys all carry times as
//! strings, some with an explicit offset and some without. Everything is
//! normalised to `DateTime<FixedOffset>` here so the rest of the crate can
//! compare instants directly.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone,
};
use chrono_tz::Tz;

use crate::{AuditError, Result};

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z", "%Y-%m-%dT%H:%M:%S%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

/// Where to take a time zone from when the text carries none
#[derive(Debug, Clone, Copy)]
pub enum TzSource {
    /// Localise in an IANA zone (DST aware)
    Named(Tz),
    /// Attach a fixed offset, e.g. the offset of a related timestamp
    Offset(FixedOffset),
    /// Treat the time as UTC
    None,
}

/// Parse a timestamp, keeping an explicit offset and otherwise applying `tz`
pub fn parse_timestamp(text: &str, tz: TzSource) -> Result<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AuditError::timestamp(text));
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts);
    }
    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(text, format) {
            return Ok(ts);
        }
    }

    let naive = parse_naive(text).ok_or_else(|| AuditError::timestamp(text))?;
    localize(naive, tz).ok_or_else(|| AuditError::timestamp(text))
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Attach a zone to a wall-clock time. `None` for a local time that does
/// not exist in the zone (spring-forward gap).
#[must_use]
pub fn localize(naive: NaiveDateTime, tz: TzSource) -> Option<DateTime<FixedOffset>> {
    match tz {
        TzSource::Named(zone) => zone
            .from_local_datetime(&naive)
            .earliest()
            .map(|ts| ts.fixed_offset()),
        TzSource::Offset(offset) => offset.from_local_datetime(&naive).single(),
        TzSource::None => Some(naive.and_utc().fixed_offset()),
    }
}

/// ISO-8601 rendering used for observation keys, e.g. `2017-04-21T08:00:00-04:00`
#[must_use]
pub fn to_iso(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}
