//! Visibility minimum check

use crate::models::{DistanceUnit, VisibilityMeasurement};
use crate::units::feet_to_statute_miles;

impl VisibilityMeasurement {
    /// The visibility compared against the minimum, in statute miles: the
    /// reported minimum when present, else the prevailing visibility.
    /// `None` when the measurement is unavailable.
    #[must_use]
    pub fn comparand_sm(&self) -> Option<f64> {
        match self {
            VisibilityMeasurement::Unavailable => None,
            VisibilityMeasurement::Value {
                prevailing,
                minimum,
                units,
                ..
            } => {
                let value = minimum.unwrap_or(*prevailing);
                Some(match units {
                    DistanceUnit::Feet => feet_to_statute_miles(value),
                    DistanceUnit::StatuteMiles => value,
                })
            }
        }
    }

    /// True if visibility is below `minimum_sm`. A missing record counts as
    /// a violation.
    #[must_use]
    pub fn violates(&self, minimum_sm: f64) -> bool {
        self.comparand_sm()
            .is_none_or(|visibility| visibility < minimum_sm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn feet(prevailing: f64, minimum: Option<f64>) -> VisibilityMeasurement {
        VisibilityMeasurement::Value {
            prevailing,
            minimum,
            maximum: Some(prevailing),
            units: DistanceUnit::Feet,
        }
    }

    fn miles(prevailing: f64, minimum: Option<f64>) -> VisibilityMeasurement {
        VisibilityMeasurement::Value {
            prevailing,
            minimum,
            maximum: None,
            units: DistanceUnit::StatuteMiles,
        }
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.25)]
    #[case(100.0)]
    fn test_unavailable_always_violates(#[case] minimum: f64) {
        assert!(VisibilityMeasurement::Unavailable.violates(minimum));
    }

    // 1400 ft is about 0.265 SM
    #[rstest]
    #[case(0.3, true)]
    #[case(0.25, false)]
    #[case(0.2, false)]
    #[case(1.0, true)]
    fn test_reported_minimum_in_feet(#[case] minimum: f64, #[case] expected: bool) {
        assert_eq!(feet(21120.0, Some(1400.0)).violates(minimum), expected);
    }

    #[test]
    fn test_prevailing_in_feet_is_converted() {
        // 2640 ft = 0.5 SM
        assert!(feet(2640.0, None).violates(1.0));
        assert!(!feet(2640.0, None).violates(0.5));
    }

    #[rstest]
    #[case(miles(10.0, None), 5.0, false)]
    #[case(miles(3.0, None), 5.0, true)]
    #[case(miles(10.0, Some(2.0)), 3.0, true)]
    #[case(miles(10.0, Some(5.0)), 5.0, false)]
    fn test_statute_miles(
        #[case] visibility: VisibilityMeasurement,
        #[case] minimum: f64,
        #[case] expected: bool,
    ) {
        assert_eq!(visibility.violates(minimum), expected);
    }
}
