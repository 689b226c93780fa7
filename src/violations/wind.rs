//! Wind and crosswind maximum check

use crate::models::{SpeedUnit, WindMeasurement};
use crate::units::mps_to_knots;

/// Wind figures normalised to knots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindKnots {
    /// Gusts when reported, otherwise the steady speed
    pub wind: f64,
    pub crosswind: f64,
}

impl WindMeasurement {
    /// `None` for calm or unavailable winds
    #[must_use]
    pub fn in_knots(&self) -> Option<WindKnots> {
        match self {
            WindMeasurement::Unavailable | WindMeasurement::Calm => None,
            WindMeasurement::Value {
                speed,
                crosswind,
                gusts,
                units,
            } => {
                let wind = gusts.unwrap_or(*speed);
                Some(match units {
                    SpeedUnit::Knots => WindKnots {
                        wind,
                        crosswind: *crosswind,
                    },
                    SpeedUnit::MetersPerSecond => WindKnots {
                        wind: mps_to_knots(wind),
                        crosswind: mps_to_knots(*crosswind),
                    },
                })
            }
        }
    }

    /// True if wind exceeds `max_wind_kt` or crosswind exceeds
    /// `max_crosswind_kt`. Calm never violates; a missing record always does.
    #[must_use]
    pub fn violates(&self, max_wind_kt: f64, max_crosswind_kt: f64) -> bool {
        match self {
            WindMeasurement::Calm => false,
            WindMeasurement::Unavailable => true,
            WindMeasurement::Value { .. } => self.in_knots().is_some_and(|knots| {
                knots.wind > max_wind_kt || knots.crosswind > max_crosswind_kt
            }),
        }
    }
}
