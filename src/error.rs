//! Error Types Module
//!
//! Fatal errors for the simulation library. Missing or unreadable input
//! files abort a run; missing table entries for individual days do not
//! (those are handled as local skips by the simulator).

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A mandatory input file is missing or unreadable.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input table parsed, but yielded no usable rows.
    #[error("no usable rows in {path}")]
    EmptyTable { path: PathBuf },

    /// The requested period runs backwards.
    #[error("end date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// A run was stopped through its cancellation token.
    #[error("simulation cancelled")]
    Cancelled,

    /// Writing a report failed.
    #[error("failed to write report: {source}")]
    Report {
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn empty_table(path: impl Into<PathBuf>) -> Self {
        Self::EmptyTable { path: path.into() }
    }

    pub fn report(source: std::io::Error) -> Self {
        Self::Report { source }
    }
}
