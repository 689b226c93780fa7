//! Ceiling minimum check

use crate::models::{CeilingMeasurement, CloudLayer, DistanceUnit};
use crate::units::statute_miles_to_feet;

impl CloudLayer {
    #[must_use]
    pub fn height_ft(&self) -> f64 {
        match self.units {
            DistanceUnit::Feet => self.height,
            DistanceUnit::StatuteMiles => statute_miles_to_feet(self.height),
        }
    }
}

impl CeilingMeasurement {
    /// The first broken, overcast or indefinite layer in reported order.
    /// Few and scattered layers do not form a ceiling.
    #[must_use]
    pub fn ceiling_layer(&self) -> Option<&CloudLayer> {
        match self {
            CeilingMeasurement::Layers(layers) => {
                layers.iter().find(|layer| layer.cover.forms_ceiling())
            }
            CeilingMeasurement::Unavailable | CeilingMeasurement::Clear => None,
        }
    }

    /// True if the ceiling is below `minimum_ft`. Clear skies and layer
    /// lists without a ceiling never violate; a missing record always does.
    #[must_use]
    pub fn violates(&self, minimum_ft: f64) -> bool {
        match self {
            CeilingMeasurement::Unavailable => true,
            CeilingMeasurement::Clear => false,
            CeilingMeasurement::Layers(_) => self
                .ceiling_layer()
                .is_some_and(|layer| layer.height_ft() < minimum_ft),
        }
    }
}
