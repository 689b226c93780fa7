//! Weather observation model
//!
//! Observations arrive as loosely shaped JSON: each dimension is either a
//! sentinel string (`"unavailable"`, `"calm"`, `"clear"`) or a structured
//! record. Decoding is lenient, a dimension that cannot be read becomes
//! `Unavailable` so the evaluators treat it as a record-keeping violation
//! instead of aborting the batch.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{AuditError, Result};

/// Distance units used by visibility and cloud heights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "FT", alias = "ft")]
    Feet,
    #[serde(rename = "SM", alias = "sm")]
    StatuteMiles,
}

/// Speed units used by wind measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SpeedUnit {
    #[serde(rename = "KT", alias = "kt")]
    Knots,
    #[serde(rename = "MPS", alias = "mps")]
    MetersPerSecond,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisibilityMeasurement {
    Unavailable,
    Value {
        prevailing: f64,
        minimum: Option<f64>,
        maximum: Option<f64>,
        units: DistanceUnit,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindMeasurement {
    Unavailable,
    Calm,
    Value {
        speed: f64,
        crosswind: f64,
        gusts: Option<f64>,
        units: SpeedUnit,
    },
}

/// Sky cover reported for a cloud layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CloudCover {
    #[serde(rename = "a few", alias = "few")]
    AFew,
    #[serde(rename = "scattered")]
    Scattered,
    #[serde(rename = "broken")]
    Broken,
    #[serde(rename = "overcast")]
    Overcast,
    #[serde(rename = "indefinite ceiling")]
    IndefiniteCeiling,
}

impl CloudCover {
    /// Broken, overcast and indefinite layers form a ceiling; the others are transparent
    #[must_use]
    pub fn forms_ceiling(self) -> bool {
        matches!(
            self,
            CloudCover::Broken | CloudCover::Overcast | CloudCover::IndefiniteCeiling
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CloudLayer {
    #[serde(rename = "type")]
    pub cover: CloudCover,
    pub height: f64,
    pub units: DistanceUnit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CeilingMeasurement {
    Unavailable,
    Clear,
    /// Layers in reported order, lowest first
    Layers(Vec<CloudLayer>),
}

/// One hourly weather report. Fields other than visibility, wind and sky
/// are ignored apart from the report code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct WeatherObservation {
    pub visibility: VisibilityMeasurement,
    pub wind: WindMeasurement,
    pub ceiling: CeilingMeasurement,
    /// Raw report code (e.g. the METAR issue time), when present
    pub code: Option<String>,
}

#[derive(Deserialize)]
struct RawVisibility {
    prevailing: f64,
    minimum: Option<f64>,
    maximum: Option<f64>,
    units: DistanceUnit,
}

#[derive(Deserialize)]
struct RawWind {
    speed: f64,
    crosswind: f64,
    gusts: Option<f64>,
    units: SpeedUnit,
}

fn is_sentinel(value: &Value, sentinel: &str) -> bool {
    value
        .as_str()
        .is_some_and(|text| text.trim().eq_ignore_ascii_case(sentinel))
}

impl VisibilityMeasurement {
    pub fn from_value(value: &Value) -> Result<Self> {
        if is_sentinel(value, "unavailable") {
            return Ok(Self::Unavailable);
        }
        if !value.is_object() {
            return Err(AuditError::measurement(format!(
                "unexpected visibility value {value}"
            )));
        }
        let raw = RawVisibility::deserialize(value)
            .map_err(|e| AuditError::measurement(format!("visibility: {e}")))?;
        Ok(Self::Value {
            prevailing: raw.prevailing,
            minimum: raw.minimum,
            maximum: raw.maximum,
            units: raw.units,
        })
    }
}

impl WindMeasurement {
    pub fn from_value(value: &Value) -> Result<Self> {
        if is_sentinel(value, "unavailable") {
            return Ok(Self::Unavailable);
        }
        if is_sentinel(value, "calm") {
            return Ok(Self::Calm);
        }
        if !value.is_object() {
            return Err(AuditError::measurement(format!("unexpected wind value {value}")));
        }
        let raw = RawWind::deserialize(value)
            .map_err(|e| AuditError::measurement(format!("wind: {e}")))?;
        Ok(Self::Value {
            speed: raw.speed,
            crosswind: raw.crosswind,
            gusts: raw.gusts,
            units: raw.units,
        })
    }
}

impl CeilingMeasurement {
    pub fn from_value(value: &Value) -> Result<Self> {
        if is_sentinel(value, "unavailable") {
            return Ok(Self::Unavailable);
        }
        if is_sentinel(value, "clear") {
            return Ok(Self::Clear);
        }
        let Some(entries) = value.as_array() else {
            return Err(AuditError::measurement(format!("unexpected sky value {value}")));
        };
        let layers = entries
            .iter()
            .map(|entry| {
                CloudLayer::deserialize(entry)
                    .map_err(|e| AuditError::measurement(format!("cloud layer: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::Layers(layers))
    }
}

impl WeatherObservation {
    /// Decode a report, downgrading any unreadable dimension to `Unavailable`
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let visibility = decode_field(value, &["visibility"], VisibilityMeasurement::from_value)
            .unwrap_or(VisibilityMeasurement::Unavailable);
        let wind = decode_field(value, &["wind"], WindMeasurement::from_value)
            .unwrap_or(WindMeasurement::Unavailable);
        let ceiling = decode_field(value, &["sky", "ceiling"], CeilingMeasurement::from_value)
            .unwrap_or(CeilingMeasurement::Unavailable);
        let code = value
            .get("code")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            visibility,
            wind,
            ceiling,
            code,
        }
    }
}

fn decode_field<T>(
    report: &Value,
    keys: &[&str],
    decode: impl Fn(&Value) -> Result<T>,
) -> Option<T> {
    let Some(field) = keys.iter().find_map(|key| report.get(key)) else {
        warn!("Weather report has no {} field, treating as unavailable", keys[0]);
        return None;
    };
    match decode(field) {
        Ok(measurement) => Some(measurement),
        Err(e) => {
            warn!("{}, treating as unavailable", e);
            None
        }
    }
}

impl From<Value> for WeatherObservation {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceUnit::Feet => write!(f, "FT"),
            DistanceUnit::StatuteMiles => write!(f, "SM"),
        }
    }
}

impl fmt::Display for SpeedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedUnit::Knots => write!(f, "KT"),
            SpeedUnit::MetersPerSecond => write!(f, "MPS"),
        }
    }
}

impl fmt::Display for VisibilityMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "unavailable"),
            Self::Value {
                prevailing,
                minimum,
                units,
                ..
            } => {
                write!(f, "{prevailing:.2} {units}")?;
                if let Some(minimum) = minimum {
                    write!(f, " (minimum {minimum:.2} {units})")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for WindMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "unavailable"),
            Self::Calm => write!(f, "calm"),
            Self::Value {
                speed,
                crosswind,
                gusts,
                units,
            } => {
                write!(f, "{speed:.1} {units}, crosswind {crosswind:.1} {units}")?;
                if let Some(gusts) = gusts {
                    write!(f, ", gusts {gusts:.1} {units}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for CeilingMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "unavailable"),
            Self::Clear => write!(f, "clear"),
            Self::Layers(layers) if layers.is_empty() => write!(f, "no layers reported"),
            Self::Layers(layers) => {
                let described: Vec<String> = layers
                    .iter()
                    .map(|layer| {
                        format!("{:?} at {:.0} {}", layer.cover, layer.height, layer.units)
                    })
                    .collect();
                write!(f, "{}", described.join(", "))
            }
        }
    }
}
