//! `flightaudit` - Weather-minimums audit for flight-school takeoffs
//!
//! This library checks every logged lesson against the weather report in
//! force at takeoff and the insurer's minimums for that student, and
//! reports the lessons that departed in violation.

pub mod audit;
pub mod config;
pub mod daycycle;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod roster;
pub mod timestamps;
pub mod units;
pub mod violations;
pub mod weather;

// Re-export core types for public API
pub use audit::{AuditEngine, MissingMinimumsPolicy, Outcome, ReportEntry, ViolationReport};
pub use config::AuditConfig;
pub use daycycle::DayCycleTable;
pub use error::AuditError;
pub use loader::AuditInputs;
pub use models::{LessonRecord, MinimumsProfile, ViolationLabel, WeatherObservation};
pub use roster::{MinimumsQuery, Roster, SchoolRoster};
pub use violations::classify;
pub use weather::ObservationSeries;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AuditError>;
