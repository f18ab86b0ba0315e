//! Error types for the streak-tracker library.
//!
//! This module provides custom error types using `thiserror` for better error
//! handling and more specific error messages throughout the application.

use thiserror::Error;

/// Failures while parsing a single streak message.
///
/// A missing day marker is the only fatal parse failure; all other
/// irregularities in a message degrade to skipped fragments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No "N day streak" marker found in the message
    #[error("could not find a day-streak marker (\"<N> day streak\") in the message")]
    NoStreakDay,

    /// A score token outside `1..6` / `X`
    #[error("invalid score token: {0}")]
    InvalidScoreToken(String),

    /// A day marker with a day number outside the valid range
    #[error("invalid streak day number: {0} (day numbers start at 1)")]
    InvalidDayNumber(u32),
}

/// Errors that can occur in the streak-tracker application.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Message parsing failed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Database-related errors
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File I/O errors
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV export errors
    #[error("csv export error: {0}")]
    Csv(#[from] csv::Error),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with `TrackerError`
pub type Result<T> = std::result::Result<T, TrackerError>;

impl From<anyhow::Error> for TrackerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
