//! CSV and JSON export of result series and portfolio weights.

use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame, PolarsError};
use serde::{Deserialize, Serialize};
use sprecon_data::dates::from_epoch_days;
use sprecon_index::{RebalancedPortfolio, TrackingStats};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error while reading a frame.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Output that is not valid UTF-8.
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Guess the format from a file extension, CSV when unknown.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::PrettyJson,
            _ => Self::Csv,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::PrettyJson => "pretty-json",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn cell_text(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Date(days) => from_epoch_days(*days)
            .map(|d| d.to_string())
            .unwrap_or_default(),
        AnyValue::Float64(v) => v.to_string(),
        AnyValue::Float32(v) => v.to_string(),
        AnyValue::String(s) => (*s).to_string(),
        other => other.to_string(),
    }
}

fn cell_json(value: &AnyValue<'_>) -> serde_json::Value {
    use serde_json::Value;

    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(*b),
        AnyValue::Date(days) => from_epoch_days(*days)
            .map_or(Value::Null, |d| Value::String(d.to_string())),
        AnyValue::Float64(v) => serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number),
        AnyValue::Float32(v) => {
            serde_json::Number::from_f64(f64::from(*v)).map_or(Value::Null, Value::Number)
        }
        AnyValue::Int64(v) => Value::from(*v),
        AnyValue::Int32(v) => Value::from(*v),
        AnyValue::UInt32(v) => Value::from(*v),
        AnyValue::UInt64(v) => Value::from(*v),
        AnyValue::String(s) => Value::String((*s).to_string()),
        other => Value::String(other.to_string()),
    }
}

/// A named result table, one row per date.
#[derive(Debug, Clone)]
pub struct SeriesExport {
    /// Table name.
    pub name: String,

    /// Result frame.
    pub frame: DataFrame,
}

impl SeriesExport {
    /// Create a new series export.
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_json_rows(&self) -> Result<Vec<serde_json::Value>, ExportError> {
        let columns = self.frame.get_columns();
        let mut rows = Vec::with_capacity(self.frame.height());
        for i in 0..self.frame.height() {
            let mut row = serde_json::Map::with_capacity(columns.len());
            for column in columns {
                let value = column.as_materialized_series().get(i)?;
                row.insert(column.name().to_string(), cell_json(&value));
            }
            rows.push(serde_json::Value::Object(row));
        }
        Ok(rows)
    }
}

impl Exporter for SeriesExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let columns = self.frame.get_columns();
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(columns.iter().map(|c| c.name().as_str()))?;
                for i in 0..self.frame.height() {
                    let mut record = Vec::with_capacity(columns.len());
                    for column in columns {
                        record.push(cell_text(&column.as_materialized_series().get(i)?));
                    }
                    wtr.write_record(&record)?;
                }
                finish_csv(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(&self.to_json_rows()?)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(&self.to_json_rows()?)?),
        }
    }
}

/// A single holding in a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioHolding {
    /// Security identifier.
    pub permno: i64,

    /// Weight in the portfolio (0.0 to 1.0).
    pub weight: f64,
}

impl PortfolioHolding {
    /// Create a new portfolio holding.
    pub const fn new(permno: i64, weight: f64) -> Self {
        Self { permno, weight }
    }
}

/// Weights set on one rebalancing date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightsExport {
    /// Portfolio name or identifier.
    pub name: String,

    /// Rebalancing date.
    pub date: NaiveDate,

    /// Securities in the portfolio with their weights.
    pub holdings: Vec<PortfolioHolding>,
}

impl WeightsExport {
    /// Create a new weights export.
    pub const fn new(name: String, date: NaiveDate, holdings: Vec<PortfolioHolding>) -> Self {
        Self {
            name,
            date,
            holdings,
        }
    }

    /// One export per rebalancing date of a portfolio.
    pub fn from_portfolio(name: &str, portfolio: &RebalancedPortfolio) -> Vec<Self> {
        portfolio
            .snapshots()
            .iter()
            .map(|(date, weights)| {
                let holdings = weights
                    .iter()
                    .map(|(permno, weight)| PortfolioHolding::new(*permno, *weight))
                    .collect();
                Self::new(name.to_string(), *date, holdings)
            })
            .collect()
    }

    /// Get total portfolio weight (should be close to 1.0).
    pub fn total_weight(&self) -> f64 {
        self.holdings.iter().map(|h| h.weight).sum()
    }
}

#[derive(Debug, Serialize)]
struct WeightRow<'a> {
    name: &'a str,
    date: NaiveDate,
    permno: i64,
    weight: f64,
}

impl WeightsExport {
    fn rows(&self) -> impl Iterator<Item = WeightRow<'_>> {
        self.holdings.iter().map(|h| WeightRow {
            name: &self.name,
            date: self.date,
            permno: h.permno,
            weight: h.weight,
        })
    }
}

impl Exporter for WeightsExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut output = String::new();

                output.push_str(&format!("# Portfolio: {}\n", self.name));
                output.push_str(&format!("# Date: {}\n", self.date));
                output.push_str(&format!("# Total Weight: {}\n", self.total_weight()));

                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(["permno", "weight"])?;
                for holding in &self.holdings {
                    wtr.write_record([holding.permno.to_string(), holding.weight.to_string()])?;
                }
                output.push_str(&finish_csv(wtr)?);
                Ok(output)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for Vec<WeightsExport> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for snapshot in self {
                    for row in snapshot.rows() {
                        wtr.serialize(row)?;
                    }
                }
                finish_csv(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for Vec<TrackingStats> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for stats in self {
                    wtr.serialize(stats)?;
                }
                finish_csv(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
