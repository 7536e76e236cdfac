//! Error types for data operations.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or shaping input tables.
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Input file does not exist
    #[error("Input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// Table loaded without any rows
    #[error("Table {0} is empty")]
    EmptyTable(String),

    /// Required column missing from a frame
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Date string could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Membership interval ends before it starts
    #[error("Invalid membership interval for permno {permno}: start {start} is after end {end}")]
    InvalidMembership {
        /// Security identifier
        permno: i64,
        /// Membership start date
        start: NaiveDate,
        /// Membership end date
        end: NaiveDate,
    },
}
