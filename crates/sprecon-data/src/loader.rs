//! Loading the input tables from a data directory.

use crate::error::{DataError, Result};
use crate::frames::{index_frame, membership_frame, stock_frame};
use crate::records::{IndexObservation, MembershipRecord, StockObservation};
use polars::prelude::DataFrame;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default file name of the membership table.
pub const DEFAULT_CONSTITUENTS_FILE: &str = "sp500_constituents.csv";
/// Default file name of the monthly security file.
pub const DEFAULT_STOCK_FILE: &str = "crsp_msf.csv";
/// Default file name of the monthly index file.
pub const DEFAULT_INDEX_FILE: &str = "crsp_msix.csv";

/// Location of the input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    /// Directory holding the CSV files.
    pub data_dir: PathBuf,
    /// Membership table file name.
    pub constituents_file: String,
    /// Monthly security file name.
    pub stock_file: String,
    /// Monthly index file name.
    pub index_file: String,
}

impl DataConfig {
    /// Configuration with default file names under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            constituents_file: DEFAULT_CONSTITUENTS_FILE.to_string(),
            stock_file: DEFAULT_STOCK_FILE.to_string(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
        }
    }

    /// Full path of the membership table.
    pub fn constituents_path(&self) -> PathBuf {
        self.data_dir.join(&self.constituents_file)
    }

    /// Full path of the monthly security file.
    pub fn stock_path(&self) -> PathBuf {
        self.data_dir.join(&self.stock_file)
    }

    /// Full path of the monthly index file.
    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(&self.index_file)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Deserialize headered CSV rows from any reader.
pub fn read_records<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Deserialize headered CSV rows from a file.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(DataError::MissingFile(path.to_path_buf()));
    }
    let rows = read_records(std::fs::File::open(path)?)?;
    debug!(path = %path.display(), rows = rows.len(), "read csv");
    Ok(rows)
}

/// Load and validate the membership table.
pub fn load_constituents(path: &Path) -> Result<Vec<MembershipRecord>> {
    let records: Vec<MembershipRecord> = read_csv(path)?;
    for record in &records {
        record.validate()?;
    }
    Ok(records)
}

/// Load the membership table described by `config`; empty tables are
/// rejected.
pub fn load_membership(config: &DataConfig) -> Result<Vec<MembershipRecord>> {
    let constituents = load_constituents(&config.constituents_path())?;
    if constituents.is_empty() {
        return Err(DataError::EmptyTable(config.constituents_file.clone()));
    }
    Ok(constituents)
}

/// Load the monthly security file.
pub fn load_stock_file(path: &Path) -> Result<Vec<StockObservation>> {
    read_csv(path)
}

/// Load the monthly index file, sorted by date.
pub fn load_index_file(path: &Path) -> Result<Vec<IndexObservation>> {
    let mut rows: Vec<IndexObservation> = read_csv(path)?;
    rows.sort_by_key(|r| r.date);
    Ok(rows)
}

/// The three input tables of one run.
///
/// Snapshots are read once and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    /// Membership intervals.
    pub constituents: Vec<MembershipRecord>,
    /// Monthly security observations.
    pub stocks: Vec<StockObservation>,
    /// Official index series.
    pub index: Vec<IndexObservation>,
}

impl MarketData {
    /// Bundle already loaded tables, validating membership intervals.
    pub fn new(
        constituents: Vec<MembershipRecord>,
        stocks: Vec<StockObservation>,
        mut index: Vec<IndexObservation>,
    ) -> Result<Self> {
        for record in &constituents {
            record.validate()?;
        }
        index.sort_by_key(|r| r.date);
        Ok(Self {
            constituents,
            stocks,
            index,
        })
    }

    /// Load all three tables described by `config`.
    pub fn load(config: &DataConfig) -> Result<Self> {
        let constituents = load_membership(config)?;
        let stocks = load_stock_file(&config.stock_path())?;
        if stocks.is_empty() {
            return Err(DataError::EmptyTable(config.stock_file.clone()));
        }
        let index = load_index_file(&config.index_path())?;
        if index.is_empty() {
            return Err(DataError::EmptyTable(config.index_file.clone()));
        }

        info!(
            constituents = constituents.len(),
            stocks = stocks.len(),
            index = index.len(),
            "loaded input tables"
        );

        Ok(Self {
            constituents,
            stocks,
            index,
        })
    }

    /// Membership table as a frame.
    pub fn constituents_frame(&self) -> Result<DataFrame> {
        membership_frame(&self.constituents)
    }

    /// Security observations as a frame.
    pub fn stocks_frame(&self) -> Result<DataFrame> {
        stock_frame(&self.stocks)
    }

    /// Official index series as a frame.
    pub fn index_frame(&self) -> Result<DataFrame> {
        index_frame(&self.index)
    }
}
