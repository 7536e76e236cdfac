//! Error types for index approximation.

use chrono::NaiveDate;
use sprecon_data::DataError;
use thiserror::Error;

/// Result type for index approximation.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors raised while approximating the index.
///
/// Missing values never raise; they flow through the arithmetic as nulls.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Input table error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Window start after its end
    #[error("Invalid date window: start {start} is after end {end}")]
    InvalidWindow {
        /// Window start
        start: NaiveDate,
        /// Window end
        end: NaiveDate,
    },

    /// Nothing left after joining and filtering
    #[error("No observations for {0}")]
    EmptyResult(String),

    /// Unknown rebalancing frequency name
    #[error("Unknown rebalancing frequency: {0}")]
    InvalidFrequency(String),
}
