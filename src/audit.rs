//! The audit engine
//!
//! Every lesson is judged on its own: certification and day/night at
//! takeoff select a minimums profile, and the weather report in force at
//! takeoff is classified against it. The engine only reads its inputs, so
//! one engine can be shared by any number of workers.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Result;
use crate::config::MAX_WORKERS;
use crate::daycycle::DayCycleTable;
use crate::models::{LessonRecord, ViolationLabel};
use crate::roster::{MinimumsQuery, Roster};
use crate::violations::classify;
use crate::weather::ObservationSeries;

/// Name of the label column in the report header
pub const VIOLATION_COLUMN: &str = "VIOLATION";

/// What happens to a lesson that no minimums row applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingMinimumsPolicy {
    /// Leave the lesson out of the report
    #[default]
    Skip,
    /// Report the lesson as `Unknown`
    Unknown,
}

/// Result of judging a single lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Labelled(ViolationLabel),
    /// No minimums applied and the policy is to skip
    NoMinimums,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub lesson: LessonRecord,
    pub label: ViolationLabel,
}

/// Violations in lesson order, with counts over everything audited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViolationReport {
    entries: Vec<ReportEntry>,
    audited: usize,
    skipped: usize,
    counts: BTreeMap<ViolationLabel, usize>,
}

impl ViolationReport {
    /// Account for one lesson; only violations become entries
    pub fn record(&mut self, lesson: &LessonRecord, outcome: Outcome) {
        self.audited += 1;
        match outcome {
            Outcome::NoMinimums => self.skipped += 1,
            Outcome::Labelled(label) => {
                *self.counts.entry(label).or_default() += 1;
                if label.is_violation() {
                    self.entries.push(ReportEntry {
                        lesson: lesson.clone(),
                        label,
                    });
                }
            }
        }
    }

    /// Append a report covering the lessons after this one's
    pub fn append(&mut self, other: ViolationReport) {
        self.entries.extend(other.entries);
        self.audited += other.audited;
        self.skipped += other.skipped;
        for (label, count) in other.counts {
            *self.counts.entry(label).or_default() += count;
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    #[must_use]
    pub fn labels(&self) -> Vec<ViolationLabel> {
        self.entries.iter().map(|entry| entry.label).collect()
    }

    /// Lessons looked at, skipped ones included
    #[must_use]
    pub fn audited(&self) -> usize {
        self.audited
    }

    /// Lessons left out for lack of minimums
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn count(&self, label: ViolationLabel) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Count for every label, `none` included
    #[must_use]
    pub fn summary(&self) -> Vec<(ViolationLabel, usize)> {
        ViolationLabel::ALL
            .iter()
            .map(|&label| (label, self.count(label)))
            .collect()
    }

    /// Report rows: each lesson's original cells followed by its label.
    /// With `header`, the lessons header comes first with a `VIOLATION`
    /// column added.
    #[must_use]
    pub fn to_rows(&self, header: Option<&[String]>) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.entries.len() + 1);
        if let Some(header) = header {
            let mut row = header.to_vec();
            row.push(VIOLATION_COLUMN.to_string());
            rows.push(row);
        }
        rows.extend(self.entries.iter().map(|entry| {
            let mut row = entry.lesson.fields().to_vec();
            row.push(entry.label.to_string());
            row
        }));
        rows
    }
}

/// Judges lessons against immutable weather, day-cycle and roster data
#[derive(Debug, Clone)]
pub struct AuditEngine<R> {
    observations: ObservationSeries,
    day_cycle: DayCycleTable,
    roster: R,
    missing_minimums: MissingMinimumsPolicy,
}

impl<R: Roster> AuditEngine<R> {
    #[must_use]
    pub fn new(observations: ObservationSeries, day_cycle: DayCycleTable, roster: R) -> Self {
        Self {
            observations,
            day_cycle,
            roster,
            missing_minimums: MissingMinimumsPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_missing_minimums(mut self, policy: MissingMinimumsPolicy) -> Self {
        self.missing_minimums = policy;
        self
    }

    #[must_use]
    pub fn observations(&self) -> &ObservationSeries {
        &self.observations
    }

    #[must_use]
    pub fn day_cycle(&self) -> &DayCycleTable {
        &self.day_cycle
    }

    #[must_use]
    pub fn roster(&self) -> &R {
        &self.roster
    }

    /// Judge one lesson
    #[tracing::instrument(level = "debug", skip_all, fields(student = %lesson.student_id))]
    pub fn evaluate(&self, lesson: &LessonRecord) -> Outcome {
        let takeoff = match self.day_cycle.parse_instant(&lesson.takeoff) {
            Ok(takeoff) => takeoff,
            Err(e) => {
                warn!("Cannot place lesson in time: {}", e);
                return Outcome::Labelled(ViolationLabel::Unknown);
            }
        };

        let daytime = self.day_cycle.is_daytime(&takeoff);
        if daytime.is_none() {
            debug!("No sunrise/sunset entry for {}", takeoff.date_naive());
        }

        let query = MinimumsQuery {
            certification: self.roster.certification(&lesson.student_id, &takeoff),
            area: &lesson.area,
            instructed: lesson.is_instructed(),
            flight_rule: lesson.flight_rule,
            daytime,
        };
        let Some(minimums) = self.roster.minimums_profile(&query) else {
            debug!(
                "No minimums for {:?} {} {} flight in {}",
                query.certification,
                if query.instructed { "dual" } else { "solo" },
                query.flight_rule,
                query.area
            );
            return match self.missing_minimums {
                MissingMinimumsPolicy::Skip => Outcome::NoMinimums,
                MissingMinimumsPolicy::Unknown => Outcome::Labelled(ViolationLabel::Unknown),
            };
        };

        let label = classify(self.observations.find_report(&takeoff), &minimums);
        debug!("Takeoff at {} judged {}", takeoff, label);
        Outcome::Labelled(label)
    }

    /// Audit lessons in order
    #[tracing::instrument(skip_all, fields(lessons = lessons.len()))]
    pub fn audit(&self, lessons: &[LessonRecord]) -> ViolationReport {
        let mut report = ViolationReport::default();
        for lesson in lessons {
            report.record(lesson, self.evaluate(lesson));
        }
        debug!(
            "Audited {} lessons, {} violations, {} skipped",
            report.audited(),
            report.entries().len(),
            report.skipped()
        );
        report
    }
}

impl<R: Roster + Send + Sync + 'static> AuditEngine<R> {
    /// Audit lessons on up to `workers` blocking tasks. Lessons are split
    /// into contiguous chunks, so the report matches [`AuditEngine::audit`].
    #[tracing::instrument(skip_all, fields(lessons = lessons.len(), workers = workers))]
    pub async fn audit_concurrent(
        self: Arc<Self>,
        lessons: Vec<LessonRecord>,
        workers: usize,
    ) -> Result<ViolationReport> {
        let workers = workers.clamp(1, MAX_WORKERS);
        if workers == 1 || lessons.len() < 2 {
            return Ok(self.audit(&lessons));
        }

        let chunk_size = lessons.len().div_ceil(workers);
        let tasks = lessons.chunks(chunk_size).map(|chunk| {
            let engine = Arc::clone(&self);
            let chunk = chunk.to_vec();
            tokio::task::spawn_blocking(move || engine.audit(&chunk))
        });
        let partials = try_join_all(tasks).await?;
        info!("Audit split over {} tasks", partials.len());

        let mut report = ViolationReport::default();
        for partial in partials {
            report.append(partial);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Certification, FlightRule, MinimumsProfile};
    use crate::timestamps::TzSource;
    use chrono::{DateTime, FixedOffset};
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    /// Certified everywhere; VFR is held to strict minimums, IFR to loose
    /// ones, and the "Cross Country" area has no minimums at all.
    struct FixedRoster;

    impl Roster for FixedRoster {
        fn certification(&self, _: &str, _: &DateTime<FixedOffset>) -> Certification {
            Certification::Certified
        }

        fn minimums_profile(&self, query: &MinimumsQuery<'_>) -> Option<MinimumsProfile> {
            if query.area == "Cross Country" || query.daytime.is_none() {
                return None;
            }
            Some(match query.flight_rule {
                FlightRule::Vfr => MinimumsProfile::new(1000.0, 3.0, 20.0, 10.0),
                FlightRule::Ifr => MinimumsProfile::new(500.0, 1.0, 30.0, 20.0),
            })
        }
    }

    fn report(visibility: f64, wind: Value, sky: Value) -> Value {
        json!({
            "visibility": {"prevailing": visibility, "units": "SM"},
            "wind": wind,
            "sky": sky
        })
    }

    #[fixture]
    fn engine() -> AuditEngine<FixedRoster> {
        let day_cycle = DayCycleTable::from_value(&json!({
            "timezone": "America/New_York",
            "2017": {"01-08": {"sunrise": "07:20", "sunset": "16:55"}}
        }))
        .unwrap();
        let gusty = json!({"speed": 25.0, "crosswind": 5.0, "units": "KT"});
        let storm = json!({"speed": 35.0, "crosswind": 5.0, "units": "KT"});
        let overcast = json!([{"type": "overcast", "height": 800.0, "units": "FT"}]);
        let observations = ObservationSeries::from_value(
            &json!({
                "2017-01-08T09:00:00-05:00": report(10.0, gusty, json!("clear")),
                "2017-01-08T11:00:00-05:00": report(2.0, json!("calm"), json!("clear")),
                "2017-01-08T13:00:00-05:00": report(10.0, json!("calm"), overcast),
                "2017-01-08T15:00:00-05:00": report(10.0, json!("calm"), json!("clear")),
                "2017-01-08T16:00:00-05:00": report(0.5, storm, json!("clear")),
            }),
            TzSource::Named(day_cycle.timezone()),
        )
        .unwrap();
        AuditEngine::new(observations, day_cycle, FixedRoster)
    }

    fn lesson(takeoff: &str, rule: FlightRule, area: &str) -> LessonRecord {
        LessonRecord::new(
            "S1",
            "N100",
            Some("I1"),
            takeoff,
            "2017-01-08T17:00:00-05:00",
            rule,
            area,
            Some("lesson"),
        )
    }

    #[rstest]
    #[case("2017-01-08T09:30:00-05:00", ViolationLabel::Winds)]
    #[case("2017-01-08T11:00:00-05:00", ViolationLabel::Visibility)]
    #[case("2017-01-08T13:15:00-05:00", ViolationLabel::Ceiling)]
    #[case("2017-01-08T15:00:00-05:00", ViolationLabel::None)]
    #[case("2017-01-08T16:10:00-05:00", ViolationLabel::Weather)]
    #[case("2017-01-08T08:00:00-05:00", ViolationLabel::Unknown)]
    #[case("2017-01-08T11:30:00", ViolationLabel::Visibility)]
    #[case("not a time", ViolationLabel::Unknown)]
    fn test_evaluate(
        engine: AuditEngine<FixedRoster>,
        #[case] takeoff: &str,
        #[case] expected: ViolationLabel,
    ) {
        let outcome = engine.evaluate(&lesson(takeoff, FlightRule::Vfr, "Local"));
        assert_eq!(outcome, Outcome::Labelled(expected));
    }

    #[rstest]
    fn test_flight_rule_changes_minimums(engine: AuditEngine<FixedRoster>) {
        let vfr = lesson("2017-01-08T11:00:00-05:00", FlightRule::Vfr, "Local");
        let ifr = lesson("2017-01-08T11:00:00-05:00", FlightRule::Ifr, "Local");
        assert_eq!(engine.evaluate(&vfr), Outcome::Labelled(ViolationLabel::Visibility));
        assert_eq!(engine.evaluate(&ifr), Outcome::Labelled(ViolationLabel::None));
    }

    #[rstest]
    fn test_missing_minimums_policy(engine: AuditEngine<FixedRoster>) {
        let cross_country = lesson("2017-01-08T11:00:00-05:00", FlightRule::Vfr, "Cross Country");
        let night = lesson("2017-01-08T18:00:00-05:00", FlightRule::Vfr, "Local");
        let unknown_date = lesson("2017-02-01T12:00:00-05:00", FlightRule::Vfr, "Local");
        assert_eq!(engine.evaluate(&cross_country), Outcome::NoMinimums);
        assert_eq!(engine.evaluate(&unknown_date), Outcome::NoMinimums);
        assert_eq!(engine.evaluate(&night), Outcome::Labelled(ViolationLabel::Weather));

        let engine = engine.with_missing_minimums(MissingMinimumsPolicy::Unknown);
        assert_eq!(
            engine.evaluate(&cross_country),
            Outcome::Labelled(ViolationLabel::Unknown)
        );
    }

    #[fixture]
    fn lessons() -> Vec<LessonRecord> {
        vec![
            lesson("2017-01-08T15:30:00-05:00", FlightRule::Vfr, "Local"),
            lesson("2017-01-08T09:05:00-05:00", FlightRule::Vfr, "Local"),
            lesson("2017-01-08T11:05:00-05:00", FlightRule::Vfr, "Cross Country"),
            lesson("2017-01-08T11:05:00-05:00", FlightRule::Vfr, "Pattern"),
            lesson("2017-01-08T13:05:00-05:00", FlightRule::Ifr, "Local"),
            lesson("2017-01-08T13:05:00-05:00", FlightRule::Vfr, "Local"),
            lesson("2017-01-08T16:05:00-05:00", FlightRule::Vfr, "Local"),
        ]
    }

    #[rstest]
    fn test_audit_keeps_order_and_counts(
        engine: AuditEngine<FixedRoster>,
        lessons: Vec<LessonRecord>,
    ) {
        let report = engine.audit(&lessons);
        assert_eq!(
            report.labels(),
            vec![
                ViolationLabel::Winds,
                ViolationLabel::Visibility,
                ViolationLabel::Ceiling,
                ViolationLabel::Weather,
            ]
        );
        assert_eq!(report.entries()[0].lesson, lessons[1]);
        assert_eq!(report.audited(), 7);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.count(ViolationLabel::None), 2);
        assert_eq!(report.summary().len(), ViolationLabel::ALL.len());
    }

    #[rstest]
    fn test_audit_is_idempotent(engine: AuditEngine<FixedRoster>, lessons: Vec<LessonRecord>) {
        assert_eq!(engine.audit(&lessons), engine.audit(&lessons));
    }

    #[rstest]
    fn test_report_rows(engine: AuditEngine<FixedRoster>, lessons: Vec<LessonRecord>) {
        let report = engine.audit(&lessons[..2]);
        let header: Vec<String> = [
            "STUDENT",
            "AIRPLANE",
            "INSTRUCTOR",
            "TAKEOFF",
            "LANDING",
            "FILED",
            "AREA",
            "REASON",
        ]
        .iter()
            .map(|cell| cell.to_string())
            .collect();

        let rows = report.to_rows(Some(&header));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].last().unwrap(), VIOLATION_COLUMN);
        assert_eq!(rows[1][..8], lessons[1].fields()[..]);
        assert_eq!(rows[1][8], "Winds");
        assert_eq!(report.to_rows(None).len(), 1);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(16)]
    #[tokio::test]
    async fn test_concurrent_matches_sequential(
        engine: AuditEngine<FixedRoster>,
        lessons: Vec<LessonRecord>,
        #[case] workers: usize,
    ) {
        let sequential = engine.audit(&lessons);
        let concurrent = Arc::new(engine)
            .audit_concurrent(lessons, workers)
            .await
            .unwrap();
        assert_eq!(concurrent, sequential);
    }
}
