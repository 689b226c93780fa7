//! Data models for the flight audit
//!
//! This module contains the domain models organized by concern:
//! - Weather: observations and their per-dimension measurements
//! - Lesson: logged lessons and violation labels
//! - Minimums: the insurer's minimums table
//! - Pilot: the student roster and certification levels

pub mod lesson;
pub mod minimums;
pub mod pilot;
pub mod weather;

// Re-export all public types for convenient access
pub use lesson::{FlightRule, LessonRecord, ViolationLabel};
pub use minimums::{AreaScope, Category, Conditions, MinimumsProfile, MinimumsRow, TimeOfDay};
pub use pilot::{Certification, PilotRecord};
pub use weather::{
    CeilingMeasurement, CloudCover, CloudLayer, DistanceUnit, SpeedUnit, VisibilityMeasurement,
    WeatherObservation, WindMeasurement,
};
