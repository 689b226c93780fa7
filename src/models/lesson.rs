//! Lesson records and violation labels

use std::fmt;

use crate::{AuditError, Result};

/// Flight rules a lesson was filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightRule {
    Vfr,
    Ifr,
}

impl FlightRule {
    /// Anything not filed as VFR is held to instrument minimums
    #[must_use]
    pub fn from_filed(filed: &str) -> Self {
        if filed.trim().eq_ignore_ascii_case("VFR") {
            FlightRule::Vfr
        } else {
            FlightRule::Ifr
        }
    }
}

impl fmt::Display for FlightRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightRule::Vfr => write!(f, "VFR"),
            FlightRule::Ifr => write!(f, "IFR"),
        }
    }
}

/// Outcome of checking one takeoff against its minimums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViolationLabel {
    None,
    Visibility,
    Winds,
    Ceiling,
    /// More than one dimension violated
    Weather,
    /// No weather report (or no usable takeoff time) to judge by
    Unknown,
}

impl ViolationLabel {
    pub const ALL: [ViolationLabel; 6] = [
        ViolationLabel::None,
        ViolationLabel::Visibility,
        ViolationLabel::Winds,
        ViolationLabel::Ceiling,
        ViolationLabel::Weather,
        ViolationLabel::Unknown,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationLabel::None => "none",
            ViolationLabel::Visibility => "Visibility",
            ViolationLabel::Winds => "Winds",
            ViolationLabel::Ceiling => "Ceiling",
            ViolationLabel::Weather => "Weather",
            ViolationLabel::Unknown => "Unknown",
        }
    }

    #[must_use]
    pub fn is_violation(self) -> bool {
        self != ViolationLabel::None
    }
}

impl fmt::Display for ViolationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the lessons table.
///
/// The original cells are kept so a report row reproduces the input
/// exactly, with the label appended.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonRecord {
    pub student_id: String,
    pub tail_number: String,
    pub instructor_id: Option<String>,
    pub takeoff: String,
    pub landing: String,
    pub flight_rule: FlightRule,
    pub area: String,
    pub reason: Option<String>,
    fields: Vec<String>,
}

impl LessonRecord {
    /// Number of leading columns every lesson row must have
    pub const REQUIRED_COLUMNS: usize = 7;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        student_id: &str,
        tail_number: &str,
        instructor_id: Option<&str>,
        takeoff: &str,
        landing: &str,
        flight_rule: FlightRule,
        area: &str,
        reason: Option<&str>,
    ) -> Self {
        let mut fields = vec![
            student_id.to_string(),
            tail_number.to_string(),
            instructor_id.unwrap_or_default().to_string(),
            takeoff.to_string(),
            landing.to_string(),
            flight_rule.to_string(),
            area.to_string(),
        ];
        if let Some(reason) = reason {
            fields.push(reason.to_string());
        }
        Self {
            student_id: student_id.to_string(),
            tail_number: tail_number.to_string(),
            instructor_id: instructor_id
                .filter(|id| !id.trim().is_empty())
                .map(str::to_string),
            takeoff: takeoff.to_string(),
            landing: landing.to_string(),
            flight_rule,
            area: area.to_string(),
            reason: reason.map(str::to_string),
            fields,
        }
    }

    /// Build a lesson from a table row: student, airplane, instructor,
    /// takeoff, landing, filed rule, area and an optional reason.
    pub fn from_row(row: &[String]) -> Result<Self> {
        if row.len() < Self::REQUIRED_COLUMNS {
            return Err(AuditError::record(format!(
                "lesson row has {} columns, expected at least {}",
                row.len(),
                Self::REQUIRED_COLUMNS
            )));
        }

        let cell = |index: usize| row[index].trim().to_string();
        let instructor = cell(2);

        Ok(Self {
            student_id: cell(0),
            tail_number: cell(1),
            instructor_id: (!instructor.is_empty()).then_some(instructor),
            takeoff: cell(3),
            landing: cell(4),
            flight_rule: FlightRule::from_filed(&row[5]),
            area: cell(6),
            reason: row.get(7).map(|reason| reason.trim().to_string()),
            fields: row.to_vec(),
        })
    }

    /// Whether an instructor was on board
    #[must_use]
    pub fn is_instructed(&self) -> bool {
        self.instructor_id.is_some()
    }

    /// The lesson's cells as read from the table
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}
