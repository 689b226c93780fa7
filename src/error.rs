//! Error types and handling for the flight audit

use thiserror::Error;

/// Main error type for the audit library
#[derive(Error, Debug)]
pub enum AuditError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A timestamp string that no supported format accepts
    #[error("Unparseable timestamp: {value}")]
    UnparseableTimestamp { value: String },

    /// A weather measurement with an unexpected shape
    #[error("Malformed measurement: {message}")]
    MalformedMeasurement { message: String },

    /// A table row or JSON entry that cannot be turned into a record
    #[error("Malformed record: {message}")]
    MalformedRecord { message: String },

    /// Day-cycle time zone that is not a known IANA name
    #[error("Unknown time zone: {name}")]
    UnknownTimezone { name: String },

    /// An audit worker task that panicked or was cancelled
    #[error("Audit worker failed: {source}")]
    Worker {
        #[from]
        source: tokio::task::JoinError,
    },

    /// CSV decoding errors
    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    /// JSON decoding errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AuditError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new timestamp error
    pub fn timestamp<S: Into<String>>(value: S) -> Self {
        Self::UnparseableTimestamp {
            value: value.into(),
        }
    }

    /// Create a new measurement error
    pub fn measurement<S: Into<String>>(message: S) -> Self {
        Self::MalformedMeasurement {
            message: message.into(),
        }
    }

    /// Create a new record error
    pub fn record<S: Into<String>>(message: S) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AuditError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            AuditError::UnparseableTimestamp { value } => {
                format!("Could not read the time '{value}'")
            }
            AuditError::MalformedMeasurement { message }
            | AuditError::MalformedRecord { message } => format!("Invalid input: {message}"),
            AuditError::UnknownTimezone { name } => {
                format!("The day-cycle file names an unknown time zone '{name}'")
            }
            AuditError::Csv { .. } | AuditError::Json { .. } => {
                "An input file could not be decoded. Please check its format.".to_string()
            }
            AuditError::Worker { .. } => {
                "The audit stopped unexpectedly. Try again with a single worker.".to_string()
            }
            AuditError::Io { .. } => {
                "File operation failed. Please check the audit directory and permissions."
                    .to_string()
            }
        }
    }
}
