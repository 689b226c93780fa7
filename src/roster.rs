//! Student certification and minimums lookup
//!
//! The audit engine only needs two answers from the school's records: how
//! far along a student was at takeoff, and which minimums applied to the
//! flight. [`Roster`] is that seam; [`SchoolRoster`] answers it from the
//! students and minimums tables.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::models::{
    Category, Certification, Conditions, FlightRule, MinimumsProfile, MinimumsRow, PilotRecord,
    TimeOfDay,
};
use crate::timestamps::{TzSource, parse_timestamp};

/// Everything that selects a minimums profile for one flight
#[derive(Debug, Clone, Copy)]
pub struct MinimumsQuery<'a> {
    pub certification: Certification,
    pub area: &'a str,
    pub instructed: bool,
    pub flight_rule: FlightRule,
    /// `None` when day/night could not be established
    pub daytime: Option<bool>,
}

pub trait Roster {
    /// Certification of `student_id` at `takeoff`
    fn certification(&self, student_id: &str, takeoff: &DateTime<FixedOffset>) -> Certification;

    /// The most advantageous minimums that apply, if any row applies at all
    fn minimums_profile(&self, query: &MinimumsQuery<'_>) -> Option<MinimumsProfile>;
}

/// Roster backed by the students and minimums tables
#[derive(Debug, Clone, Default)]
pub struct SchoolRoster {
    students: HashMap<String, PilotRecord>,
    minimums: Vec<MinimumsRow>,
}

impl SchoolRoster {
    #[must_use]
    pub fn new(students: Vec<PilotRecord>, minimums: Vec<MinimumsRow>) -> Self {
        let mut by_id = HashMap::with_capacity(students.len());
        for student in students {
            if by_id.contains_key(&student.id) {
                warn!("Duplicate student id {}, keeping the first row", student.id);
                continue;
            }
            by_id.insert(student.id.clone(), student);
        }
        Self {
            students: by_id,
            minimums,
        }
    }

    /// Build from raw tables whose first row is a header. Rows that do not
    /// parse are skipped.
    #[must_use]
    pub fn from_tables(students: &[Vec<String>], minimums: &[Vec<String>]) -> Self {
        let students = parse_rows(students, "student", PilotRecord::from_row);
        let minimums = parse_rows(minimums, "minimums", MinimumsRow::from_row);
        debug!(
            "Roster has {} students and {} minimums rows",
            students.len(),
            minimums.len()
        );
        Self::new(students, minimums)
    }

    #[must_use]
    pub fn student(&self, id: &str) -> Option<&PilotRecord> {
        self.students.get(id.trim())
    }

    #[must_use]
    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    #[must_use]
    pub fn minimums_rows(&self) -> &[MinimumsRow] {
        &self.minimums
    }
}

fn parse_rows<T>(
    table: &[Vec<String>],
    what: &str,
    parse: impl Fn(&[String]) -> crate::Result<T>,
) -> Vec<T> {
    table
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()))
        .filter_map(|(line, row)| match parse(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping {} row {}: {}", what, line + 1, e);
                None
            }
        })
        .collect()
}

impl Roster for SchoolRoster {
    fn certification(&self, student_id: &str, takeoff: &DateTime<FixedOffset>) -> Certification {
        match self.student(student_id) {
            Some(pilot) => certification_at(pilot, takeoff),
            None => {
                warn!("Student {} is not on the roster", student_id);
                Certification::Invalid
            }
        }
    }

    fn minimums_profile(&self, query: &MinimumsQuery<'_>) -> Option<MinimumsProfile> {
        select_minimums(&self.minimums, query)
    }
}

/// Milestone date as an instant, read in the takeoff's offset when the
/// cell carries none. Blank or unreadable dates count as not reached.
fn milestone(date: Option<&str>, takeoff: &DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let date = date?;
    match parse_timestamp(date, TzSource::Offset(*takeoff.offset())) {
        Ok(at) => Some(at),
        Err(e) => {
            warn!("Ignoring roster date: {}", e);
            None
        }
    }
}

fn reached(date: Option<&str>, takeoff: &DateTime<FixedOffset>) -> bool {
    milestone(date, takeoff).is_some_and(|at| *takeoff >= at)
}

/// Highest milestone reached by `takeoff`
#[must_use]
pub fn certification_at(pilot: &PilotRecord, takeoff: &DateTime<FixedOffset>) -> Certification {
    let Some(joined) = milestone(Some(&pilot.joined), takeoff) else {
        return Certification::Invalid;
    };
    if *takeoff < joined {
        return Certification::Invalid;
    }

    if reached(pilot.fifty_hours.as_deref(), takeoff) {
        Certification::FiftyHours
    } else if reached(pilot.license.as_deref(), takeoff) {
        Certification::Certified
    } else if reached(pilot.solo.as_deref(), takeoff) {
        Certification::Student
    } else {
        Certification::Novice
    }
}

fn held_before(date: Option<&str>, takeoff: &DateTime<FixedOffset>) -> bool {
    milestone(date, takeoff).is_some_and(|at| at < *takeoff)
}

#[must_use]
pub fn has_instrument_rating(pilot: &PilotRecord, takeoff: &DateTime<FixedOffset>) -> bool {
    held_before(pilot.instrument.as_deref(), takeoff)
}

#[must_use]
pub fn has_advanced_endorsement(pilot: &PilotRecord, takeoff: &DateTime<FixedOffset>) -> bool {
    held_before(pilot.advanced.as_deref(), takeoff)
}

#[must_use]
pub fn has_multiengine_endorsement(pilot: &PilotRecord, takeoff: &DateTime<FixedOffset>) -> bool {
    held_before(pilot.multiengine.as_deref(), takeoff)
}

/// Whether a minimums row governs the queried flight
#[must_use]
pub fn row_applies(row: &MinimumsRow, query: &MinimumsQuery<'_>) -> bool {
    let category = match row.category {
        Category::Student => query.certification >= Certification::Student,
        Category::Certified => query.certification >= Certification::Certified,
        Category::FiftyHours => query.certification == Certification::FiftyHours,
        Category::Dual => query.instructed,
    };
    let conditions = matches!(
        (row.conditions, query.flight_rule),
        (Conditions::Vmc, FlightRule::Vfr) | (Conditions::Imc, FlightRule::Ifr)
    );
    let time = matches!(
        (row.time, query.daytime),
        (TimeOfDay::Day, Some(true)) | (TimeOfDay::Night, Some(false))
    );

    category && conditions && time && row.area.covers(query.area)
}

#[must_use]
pub fn select_minimums(rows: &[MinimumsRow], query: &MinimumsQuery<'_>) -> Option<MinimumsProfile> {
    MinimumsProfile::most_advantageous(
        rows.iter()
            .filter(|row| row_applies(row, query))
            .map(|row| &row.profile),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[fixture]
    fn roster() -> SchoolRoster {
        let students = table(&[
            &[
                "ID", "LASTNAME", "FIRSTNAME", "JOINED", "SOLO", "LICENSE", "50 HOURS",
                "INSTRUMENT", "ADVANCED", "MULTIENGINE",
            ],
            &[
                "S00001", "Lee", "Avery", "2016-01-04", "2016-03-10", "2016-08-01",
                "2017-01-15", "2016-12-01", "", "",
            ],
            &["S00002", "Moreno", "Jules", "2016-06-01", "", "", "", "", "", ""],
            &[
                "S00003", "Patel", "Kiara", "2017-02-01T10:00:00", "not-a-date", "", "", "",
                "2017-03-01", "",
            ],
        ]);
        let minimums = table(&[
            &[
                "CATEGORY", "CONDITIONS", "AREA", "TIME", "CEILING", "VISIBILITY", "WIND",
                "CROSSWIND",
            ],
            &["Student", "VMC", "Pattern", "Day", "2000", "5", "20", "8"],
            &["Student", "VMC", "Practice Area", "Day", "3000", "10", "20", "8"],
            &["Certified", "VMC", "Local", "Day", "3000", "5", "20", "20"],
            &["Certified", "VMC", "Practice Area", "Night", "3000", "10", "20", "10"],
            &["50 Hours", "VMC", "Local", "Day", "3000", "10", "20", "10"],
            &["Dual", "VMC", "Any", "Day", "2000", "10", "30", "10"],
            &["Dual", "IMC", "Any", "Day", "500", "0.75", "30", "20"],
        ]);
        SchoolRoster::from_tables(&students, &minimums)
    }

    fn at(text: &str) -> DateTime<FixedOffset> {
        parse_timestamp(text, TzSource::None).unwrap()
    }

    fn query(
        certification: Certification,
        area: &str,
        instructed: bool,
        flight_rule: FlightRule,
        daytime: Option<bool>,
    ) -> MinimumsQuery<'_> {
        MinimumsQuery {
            certification,
            area,
            instructed,
            flight_rule,
            daytime,
        }
    }

    #[rstest]
    #[case("S00001", "2016-01-03T12:00:00-05:00", Certification::Invalid)]
    #[case("S00001", "2016-02-01T12:00:00-05:00", Certification::Novice)]
    #[case("S00001", "2016-03-10T00:00:00-05:00", Certification::Student)]
    #[case("S00001", "2016-09-01T12:00:00-04:00", Certification::Certified)]
    #[case("S00001", "2017-01-20T12:00:00-05:00", Certification::FiftyHours)]
    #[case("S00002", "2017-01-20T12:00:00-05:00", Certification::Novice)]
    #[case("S00003", "2017-02-01T09:00:00-05:00", Certification::Invalid)]
    #[case("S00003", "2017-02-02T09:00:00-05:00", Certification::Novice)]
    #[case("S99999", "2017-02-02T09:00:00-05:00", Certification::Invalid)]
    fn test_certification(
        roster: SchoolRoster,
        #[case] student: &str,
        #[case] takeoff: &str,
        #[case] expected: Certification,
    ) {
        assert_eq!(roster.certification(student, &at(takeoff)), expected);
    }

    #[rstest]
    fn test_ratings_and_endorsements(roster: SchoolRoster) {
        let avery = roster.student("S00001").unwrap();
        assert!(!has_instrument_rating(avery, &at("2016-11-30T12:00:00-05:00")));
        assert!(has_instrument_rating(avery, &at("2016-12-02T12:00:00-05:00")));
        assert!(!has_advanced_endorsement(avery, &at("2017-06-01T12:00:00-04:00")));

        let kiara = roster.student("S00003").unwrap();
        assert!(has_advanced_endorsement(kiara, &at("2017-03-02T12:00:00-05:00")));
        assert!(!has_multiengine_endorsement(kiara, &at("2017-03-02T12:00:00-05:00")));
    }

    #[rstest]
    fn test_combines_matching_rows(roster: SchoolRoster) {
        let profile = roster
            .minimums_profile(&query(
                Certification::Certified,
                "Practice Area",
                true,
                FlightRule::Vfr,
                Some(true),
            ))
            .unwrap();
        assert_eq!(profile, MinimumsProfile::new(2000.0, 5.0, 30.0, 20.0));
    }

    #[rstest]
    fn test_novice_without_instructor_has_no_minimums(roster: SchoolRoster) {
        let query = query(Certification::Novice, "Pattern", false, FlightRule::Vfr, Some(true));
        assert!(roster.minimums_profile(&query).is_none());
    }

    #[rstest]
    fn test_dual_matches_any_certification(roster: SchoolRoster) {
        let profile = roster
            .minimums_profile(&query(
                Certification::Invalid,
                "Cross Country",
                true,
                FlightRule::Ifr,
                Some(true),
            ))
            .unwrap();
        assert_eq!(profile, MinimumsProfile::new(500.0, 0.75, 30.0, 20.0));
    }

    #[rstest]
    #[case(Some(false), None)]
    #[case(None, None)]
    fn test_time_of_day_must_match(
        roster: SchoolRoster,
        #[case] daytime: Option<bool>,
        #[case] expected: Option<MinimumsProfile>,
    ) {
        let query = query(Certification::Student, "Pattern", false, FlightRule::Vfr, daytime);
        assert_eq!(roster.minimums_profile(&query), expected);
    }

    #[rstest]
    fn test_local_rows_exclude_cross_country(roster: SchoolRoster) {
        let pattern = roster
            .minimums_profile(&query(
                Certification::FiftyHours,
                "Pattern",
                false,
                FlightRule::Vfr,
                Some(true),
            ))
            .unwrap();
        assert_eq!(pattern, MinimumsProfile::new(2000.0, 5.0, 20.0, 20.0));

        let cross_country = query(
            Certification::FiftyHours,
            "Cross Country",
            false,
            FlightRule::Vfr,
            Some(true),
        );
        assert!(roster.minimums_profile(&cross_country).is_none());
    }

    #[rstest]
    fn test_flight_rule_selects_conditions(roster: SchoolRoster) {
        let query = query(Certification::Certified, "Pattern", false, FlightRule::Ifr, Some(true));
        assert!(roster.minimums_profile(&query).is_none());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let roster = SchoolRoster::from_tables(
            &table(&[&["ID"], &["S1", "Lee"], &["S2", "Moreno", "Jules", "2016-06-01"], &["", ""]]),
            &table(&[&["CATEGORY"], &["Dual", "VMC", "Any", "Day", "x", "1", "2", "3"]]),
        );
        assert_eq!(roster.student_count(), 1);
        assert!(roster.minimums_rows().is_empty());
    }
}
