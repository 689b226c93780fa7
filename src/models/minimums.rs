//! Insurance minimums table model

use std::str::FromStr;

use crate::{AuditError, Result};

/// The four limits a takeoff is held to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimumsProfile {
    /// Lowest allowed ceiling in feet
    pub ceiling_min_ft: f64,
    /// Lowest allowed visibility in statute miles
    pub visibility_sm: f64,
    /// Highest allowed wind (or gust) speed in knots
    pub max_wind_kt: f64,
    /// Highest allowed crosswind in knots
    pub max_crosswind_kt: f64,
}

impl MinimumsProfile {
    #[must_use]
    pub fn new(
        ceiling_min_ft: f64,
        visibility_sm: f64,
        max_wind_kt: f64,
        max_crosswind_kt: f64,
    ) -> Self {
        Self {
            ceiling_min_ft,
            visibility_sm,
            max_wind_kt,
            max_crosswind_kt,
        }
    }

    /// Combine several applicable profiles into the most permissive one:
    /// lowest ceiling and visibility, highest wind and crosswind.
    pub fn most_advantageous<'a>(
        profiles: impl IntoIterator<Item = &'a MinimumsProfile>,
    ) -> Option<Self> {
        profiles.into_iter().fold(None, |best: Option<Self>, profile| {
            Some(match best {
                None => *profile,
                Some(best) => Self {
                    ceiling_min_ft: best.ceiling_min_ft.min(profile.ceiling_min_ft),
                    visibility_sm: best.visibility_sm.min(profile.visibility_sm),
                    max_wind_kt: best.max_wind_kt.max(profile.max_wind_kt),
                    max_crosswind_kt: best.max_crosswind_kt.max(profile.max_crosswind_kt),
                },
            })
        })
    }
}

/// Pilot category a minimums row applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Student,
    Certified,
    FiftyHours,
    /// Any pilot flying with an instructor
    Dual,
}

/// Meteorological conditions column (VMC rows govern VFR flights, IMC rows IFR)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conditions {
    Vmc,
    Imc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaScope {
    Any,
    /// Everything except cross-country flights
    Local,
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Day,
    Night,
}

impl FromStr for Category {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Student" => Ok(Category::Student),
            "Certified" => Ok(Category::Certified),
            "50 Hours" => Ok(Category::FiftyHours),
            "Dual" => Ok(Category::Dual),
            other => Err(AuditError::record(format!("unknown minimums category '{other}'"))),
        }
    }
}

impl FromStr for Conditions {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "VMC" => Ok(Conditions::Vmc),
            "IMC" => Ok(Conditions::Imc),
            other => Err(AuditError::record(format!("unknown conditions '{other}'"))),
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Day" => Ok(TimeOfDay::Day),
            "Night" => Ok(TimeOfDay::Night),
            other => Err(AuditError::record(format!("unknown time of day '{other}'"))),
        }
    }
}

impl From<&str> for AreaScope {
    fn from(s: &str) -> Self {
        match s.trim() {
            "Any" => AreaScope::Any,
            "Local" => AreaScope::Local,
            other => AreaScope::Named(other.to_string()),
        }
    }
}

impl AreaScope {
    pub const CROSS_COUNTRY: &'static str = "Cross Country";

    #[must_use]
    pub fn covers(&self, area: &str) -> bool {
        let area = area.trim();
        match self {
            AreaScope::Any => true,
            AreaScope::Local => area != Self::CROSS_COUNTRY,
            AreaScope::Named(name) => name == area,
        }
    }
}

/// One row of the minimums table
#[derive(Debug, Clone, PartialEq)]
pub struct MinimumsRow {
    pub category: Category,
    pub conditions: Conditions,
    pub area: AreaScope,
    pub time: TimeOfDay,
    pub profile: MinimumsProfile,
}

impl MinimumsRow {
    pub const COLUMNS: usize = 8;

    /// Parse `CATEGORY, CONDITIONS, AREA, TIME, CEILING, VISIBILITY, WIND, CROSSWIND`
    pub fn from_row(row: &[String]) -> Result<Self> {
        if row.len() < Self::COLUMNS {
            return Err(AuditError::record(format!(
                "minimums row has {} columns, expected {}",
                row.len(),
                Self::COLUMNS
            )));
        }

        let number = |index: usize| -> Result<f64> {
            row[index].trim().parse::<f64>().map_err(|_| {
                AuditError::record(format!("minimums value '{}' is not a number", row[index]))
            })
        };

        Ok(Self {
            category: row[0].parse()?,
            conditions: row[1].parse()?,
            area: AreaScope::from(row[2].as_str()),
            time: row[3].parse()?,
            profile: MinimumsProfile::new(number(4)?, number(5)?, number(6)?, number(7)?),
        })
    }
}
