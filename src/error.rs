//! Centralized error types for mboxspam.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mboxspam library.
#[derive(Error, Debug)]
pub enum SpamError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("MBOX file not found: {0}")]
    FileNotFound(PathBuf),

    /// A `From:` header whose address has no `@`.
    #[error("Line {line}: sender address '{value}' has no domain")]
    InvalidAddress { line: u64, value: String },

    /// An `X-DSPAM-Confidence:` value that is not a number.
    #[error("Line {line}: spam confidence '{value}' is not a number")]
    InvalidConfidence { line: u64, value: String },

    /// A recognized header with nothing after its name.
    #[error("Line {line}: '{header}' header has no value")]
    MissingValue { line: u64, header: &'static str },

    /// Strict mode: a message lacked one of the required fields.
    #[error("Message starting at line {line} has no {missing}")]
    IncompleteMessage { line: u64, missing: &'static str },

    /// Column input to the loader was not positionally aligned.
    #[error(
        "Misaligned columns: {emails} emails, {domains} domains, \
         {weekdays} weekdays, {confidences} confidences"
    )]
    MisalignedColumns {
        emails: usize,
        domains: usize,
        weekdays: usize,
        confidences: usize,
    },

    /// A weekday name that could not be understood.
    #[error("Unknown weekday: {0}")]
    InvalidWeekday(String),

    /// Any failure reported by SQLite.
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Convenience alias for `Result<T, SpamError>`.
pub type Result<T> = std::result::Result<T, SpamError>;

impl SpamError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
