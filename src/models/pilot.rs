//! Student pilot roster model

use crate::{AuditError, Result};

/// Where a student stands in the licensing process at a given time.
///
/// Ordered so that `cert >= Certification::Student` reads as "has soloed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Certification {
    /// Flight predates the student joining the school (or unknown student)
    Invalid,
    /// Joined but not yet soloed
    Novice,
    /// Soloed, no license yet
    Student,
    /// Licensed, under 50 hours since
    Certified,
    /// 50 hours past the license
    FiftyHours,
}

/// One row of the students table. Milestone dates are kept as written;
/// empty cells become `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PilotRecord {
    pub id: String,
    pub last_name: String,
    pub first_name: String,
    pub joined: String,
    pub solo: Option<String>,
    pub license: Option<String>,
    pub fifty_hours: Option<String>,
    pub instrument: Option<String>,
    pub advanced: Option<String>,
    pub multiengine: Option<String>,
}

impl PilotRecord {
    /// ID, last name, first name and join date are required; later
    /// milestone columns may be blank or missing.
    pub const REQUIRED_COLUMNS: usize = 4;

    /// Parse `ID, LASTNAME, FIRSTNAME, JOINED, SOLO, LICENSE, 50 HOURS, INSTRUMENT,
    /// ADVANCED, MULTIENGINE`
    pub fn from_row(row: &[String]) -> Result<Self> {
        if row.len() < Self::REQUIRED_COLUMNS {
            return Err(AuditError::record(format!(
                "student row has {} columns, expected at least {}",
                row.len(),
                Self::REQUIRED_COLUMNS
            )));
        }

        let optional = |index: usize| {
            row.get(index)
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty())
                .map(str::to_string)
        };

        let id = row[0].trim().to_string();
        if id.is_empty() {
            return Err(AuditError::record("student row has an empty id"));
        }

        Ok(Self {
            id,
            last_name: row[1].trim().to_string(),
            first_name: row[2].trim().to_string(),
            joined: row[3].trim().to_string(),
            solo: optional(4),
            license: optional(5),
            fifty_hours: optional(6),
            instrument: optional(7),
            advanced: optional(8),
            multiengine: optional(9),
        })
    }
}
