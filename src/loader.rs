//! Reading audit inputs from disk and writing the report
//!
//! All five input files are read up front and turned into immutable typed
//! values; nothing is read again while lessons are evaluated.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use crate::config::FilesConfig;
use crate::daycycle::DayCycleTable;
use crate::models::LessonRecord;
use crate::roster::SchoolRoster;
use crate::timestamps::TzSource;
use crate::weather::ObservationSeries;
use crate::{AuditError, Result};

/// Read a CSV file as rows of strings, header included
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>> {
    let file = File::open(path.as_ref())?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    reader
        .records()
        .map(|record| {
            record
                .map(|row| row.iter().map(str::to_string).collect())
                .map_err(AuditError::from)
        })
        .collect()
}

/// Write rows as a CSV file
pub fn write_table<P: AsRef<Path>>(rows: &[Vec<String>], path: P) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path.as_ref())?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a JSON file into a generic value tree
pub fn read_structured<P: AsRef<Path>>(path: P) -> Result<Value> {
    let text = fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&text)?)
}

/// Lessons in file order, header dropped; unreadable rows are skipped
#[must_use]
pub fn lessons_from_table(table: &[Vec<String>]) -> Vec<LessonRecord> {
    table
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()))
        .filter_map(|(line, row)| match LessonRecord::from_row(row) {
            Ok(lesson) => Some(lesson),
            Err(e) => {
                warn!("Skipping lesson row {}: {}", line + 1, e);
                None
            }
        })
        .collect()
}

/// Everything an audit run needs, loaded once
#[derive(Debug, Clone)]
pub struct AuditInputs {
    pub lessons: Vec<LessonRecord>,
    /// Header of the lessons table, used for the report
    pub lesson_header: Vec<String>,
    pub observations: ObservationSeries,
    pub day_cycle: DayCycleTable,
    pub roster: SchoolRoster,
}

impl AuditInputs {
    /// Load the audit files named in `files` from `directory`
    pub fn load<P: AsRef<Path>>(directory: P, files: &FilesConfig) -> Result<Self> {
        let directory = directory.as_ref();
        let path = |name: &str| -> PathBuf { directory.join(name) };
        info!("Loading audit inputs from {}", directory.display());

        let day_cycle = DayCycleTable::from_value(&read_structured(path(&files.daycycle))?)?;
        let observations = ObservationSeries::from_value(
            &read_structured(path(&files.weather))?,
            TzSource::Named(day_cycle.timezone()),
        )?;
        let roster = SchoolRoster::from_tables(
            &read_table(path(&files.students))?,
            &read_table(path(&files.minimums))?,
        );
        let lesson_table = read_table(path(&files.lessons))?;
        let lesson_header = lesson_table.first().cloned().unwrap_or_default();
        let lessons = lessons_from_table(&lesson_table);

        info!(
            "Loaded {} lessons, {} weather reports, {} day-cycle dates, {} students",
            lessons.len(),
            observations.len(),
            day_cycle.len(),
            roster.student_count()
        );

        Ok(Self {
            lessons,
            lesson_header,
            observations,
            day_cycle,
            roster,
        })
    }
}
