//! Configuration management for flightaudit
//!
//! Handles loading configuration from files and environment variables,
//! and validates the settings before an audit runs.

use crate::AuditError;
use crate::audit::MissingMinimumsPolicy;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upper bound on audit worker tasks
pub const MAX_WORKERS: usize = 64;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Input file names, relative to the audit directory
    #[serde(default)]
    pub files: FilesConfig,
    /// Audit behaviour
    #[serde(default)]
    pub audit: AuditSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Names of the five input files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_daycycle_file")]
    pub daycycle: String,
    #[serde(default = "default_weather_file")]
    pub weather: String,
    #[serde(default = "default_minimums_file")]
    pub minimums: String,
    #[serde(default = "default_students_file")]
    pub students: String,
    #[serde(default = "default_lessons_file")]
    pub lessons: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Number of concurrent audit workers
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// What to do with a lesson no minimums row applies to
    #[serde(default)]
    pub missing_minimums: MissingMinimumsPolicy,
    /// Report file name, relative to the audit directory
    #[serde(default = "default_output_file")]
    pub output: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_daycycle_file() -> String {
    "daycycle.json".to_string()
}

fn default_weather_file() -> String {
    "weather.json".to_string()
}

fn default_minimums_file() -> String {
    "minimums.csv".to_string()
}

fn default_students_file() -> String {
    "students.csv".to_string()
}

fn default_lessons_file() -> String {
    "lessons.csv".to_string()
}

fn default_workers() -> usize {
    1
}

fn default_output_file() -> String {
    "violations.csv".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            daycycle: default_daycycle_file(),
            weather: default_weather_file(),
            minimums: default_minimums_file(),
            students: default_students_file(),
            lessons: default_lessons_file(),
        }
    }
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            missing_minimums: MissingMinimumsPolicy::default(),
            output: default_output_file(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AuditConfig {
    /// Load configuration from the given file, or the default location,
    /// then apply environment overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let explicit = config_path.is_some();
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        } else if explicit {
            return Err(AuditError::config(format!(
                "Configuration file {} does not exist",
                config_file.display()
            ))
            .into());
        }

        // Environment overrides, e.g. FLIGHTAUDIT_AUDIT__WORKERS=4
        builder = builder.add_source(
            Environment::with_prefix("FLIGHTAUDIT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AuditConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("flightaudit").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        fn fill(value: &mut String, default: fn() -> String) {
            if value.trim().is_empty() {
                *value = default();
            }
        }

        fill(&mut self.files.daycycle, default_daycycle_file);
        fill(&mut self.files.weather, default_weather_file);
        fill(&mut self.files.minimums, default_minimums_file);
        fill(&mut self.files.students, default_students_file);
        fill(&mut self.files.lessons, default_lessons_file);
        fill(&mut self.audit.output, default_output_file);
        fill(&mut self.logging.level, default_log_level);
        fill(&mut self.logging.format, default_log_format);
        if self.audit.workers == 0 {
            self.audit.workers = default_workers();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.audit.workers > MAX_WORKERS {
            return Err(AuditError::config(format!(
                "Audit workers cannot exceed {MAX_WORKERS}"
            ))
            .into());
        }
        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AuditError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AuditError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let files = &self.files;
        let names = [
            &files.daycycle,
            &files.weather,
            &files.minimums,
            &files.students,
            &files.lessons,
            &self.audit.output,
        ];
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(AuditError::config(format!(
                    "File name '{name}' is configured more than once"
                ))
                .into());
            }
        }

        Ok(())
    }
}
