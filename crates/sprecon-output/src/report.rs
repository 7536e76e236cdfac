//! Timestamped JSON reports of a reconstruction run.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A report of one reconstruction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report title.
    pub title: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// First date of the requested window.
    pub start_date: Option<NaiveDate>,

    /// Last date of the requested window.
    pub end_date: Option<NaiveDate>,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report.
    pub fn new(
        title: String,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        contents: serde_json::Value,
    ) -> Self {
        Self {
            title,
            timestamp: Utc::now(),
            start_date,
            end_date,
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    title: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the requested window.
    pub const fn window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Set the report contents from any serializable value.
    pub fn contents<T: Serialize>(mut self, contents: &T) -> Result<Self, ReportError> {
        self.contents = Some(serde_json::to_value(contents)?);
        Ok(self)
    }

    /// Build the report.
    pub fn build(self) -> Report {
        Report::new(
            self.title.unwrap_or_else(|| "S&P 500 reconstruction".to_string()),
            self.start_date,
            self.end_date,
            self.contents.unwrap_or(serde_json::Value::Null),
        )
    }
}
