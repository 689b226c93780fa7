//! Combines the per-dimension checks into one violation label

use crate::models::{MinimumsProfile, ViolationLabel, WeatherObservation};

/// Which dimensions of one observation broke the minimums
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViolationFlags {
    pub visibility: bool,
    pub wind: bool,
    pub ceiling: bool,
}

impl ViolationFlags {
    #[must_use]
    pub fn evaluate(observation: &WeatherObservation, minimums: &MinimumsProfile) -> Self {
        Self {
            visibility: observation.visibility.violates(minimums.visibility_sm),
            wind: observation
                .wind
                .violates(minimums.max_wind_kt, minimums.max_crosswind_kt),
            ceiling: observation.ceiling.violates(minimums.ceiling_min_ft),
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        [self.visibility, self.wind, self.ceiling]
            .into_iter()
            .filter(|flag| *flag)
            .count()
    }

    /// A single flagged dimension names itself; two or more become `Weather`
    #[must_use]
    pub fn label(&self) -> ViolationLabel {
        match (self.count(), self.visibility, self.wind) {
            (0, _, _) => ViolationLabel::None,
            (1, true, _) => ViolationLabel::Visibility,
            (1, _, true) => ViolationLabel::Winds,
            (1, _, _) => ViolationLabel::Ceiling,
            _ => ViolationLabel::Weather,
        }
    }
}

/// Label one takeoff. No observation at all yields `Unknown`.
#[must_use]
pub fn classify(
    observation: Option<&WeatherObservation>,
    minimums: &MinimumsProfile,
) -> ViolationLabel {
    match observation {
        None => ViolationLabel::Unknown,
        Some(observation) => ViolationFlags::evaluate(observation, minimums).label(),
    }
}
