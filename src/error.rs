use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Everything a tracker action can fail with. The `Display` text of the
/// validation variants is what the user sees in the toast.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Enter reps (number).")]
    InvalidReps,

    #[error("Enter weight (number).")]
    InvalidWeight,

    #[error("Enter bodyweight (number).")]
    InvalidBodyweight,

    #[error("Enter date as YYYY-MM-DD.")]
    InvalidDate,

    #[error("Enter valid cadence numbers.")]
    InvalidCadence,

    #[error("Log is empty.")]
    EmptyLog,

    #[error("{0}")]
    NothingToLoad(&'static str),

    #[error("No timestamp left after {0}.")]
    TimestampOverflow(i64),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Storage error for {key}: {source}")]
    Storage {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Could not write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No usable location could be derived for a required directory
    #[error("Missing required directory: {0}")]
    MissingDirectory(&'static str),

    /// An environment variable was set but empty or not valid unicode
    #[error("Invalid value for {0}")]
    InvalidVar(&'static str),
}
