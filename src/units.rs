//! Unit conversions used by the weather evaluators
//!
//! Visibility is compared in statute miles and wind in knots, so every
//! measurement is normalised through these helpers before a rule check.

/// Feet in one statute mile
pub const FEET_PER_STATUTE_MILE: f64 = 5280.0;

/// Knots in one metre per second
pub const KNOTS_PER_MPS: f64 = 1.94384;

#[must_use]
pub fn feet_to_statute_miles(feet: f64) -> f64 {
    feet / FEET_PER_STATUTE_MILE
}

#[must_use]
pub fn statute_miles_to_feet(miles: f64) -> f64 {
    miles * FEET_PER_STATUTE_MILE
}

#[must_use]
pub fn mps_to_knots(mps: f64) -> f64 {
    mps * KNOTS_PER_MPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feet_to_statute_miles() {
        assert_eq!(feet_to_statute_miles(5280.0), 1.0);
        assert_eq!(feet_to_statute_miles(21120.0), 4.0);
        assert!((feet_to_statute_miles(1400.0) - 0.265_151).abs() < 1e-5);
    }

    #[test]
    fn test_mps_to_knots() {
        assert!((mps_to_knots(10.0) - 19.4384).abs() < 1e-9);
        assert_eq!(mps_to_knots(0.0), 0.0);
    }

    #[test]
    fn test_conversions_invert() {
        assert!((statute_miles_to_feet(feet_to_statute_miles(1234.0)) - 1234.0).abs() < 1e-9);
        assert!((mps_to_knots(7.5) / KNOTS_PER_MPS - 7.5).abs() < 1e-9);
    }
}
