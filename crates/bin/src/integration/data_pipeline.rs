//! Loading the input tables for a command.

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use sprecon::MembershipTable;
use sprecon::pipeline::Reconstruction;
use sprecon_data::loader::load_membership;
use sprecon_data::{DataConfig, MarketData};
use sprecon_index::DateWindow;
use std::time::Duration;
use tracing::info;

/// Error type for data pipeline operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum DataPipelineError {
    /// Input tables could not be read.
    #[error("Data error: {0}")]
    Data(#[from] sprecon_data::DataError),
    /// Membership table or window rejected.
    #[error("Index error: {0}")]
    Index(#[from] sprecon_index::IndexError),
    /// Progress bar template error.
    #[error("Progress template error: {0}")]
    Template(#[from] indicatif::style::TemplateError),
}

fn spinner(message: String) -> Result<ProgressBar, DataPipelineError> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Ok(pb)
}

/// Load the membership table alone; the market files are not read.
pub(crate) fn load_membership_table(
    config: &DataConfig,
) -> Result<MembershipTable, DataPipelineError> {
    let pb = spinner(format!(
        "Loading membership table from {}...",
        config.constituents_path().display()
    ))?;
    let loaded = load_membership(config);
    pb.finish_and_clear();

    let records = loaded?;
    info!(intervals = records.len(), "membership table loaded");
    Ok(MembershipTable::new(records)?)
}

/// Load the three tables behind a spinner and index the membership table.
pub(crate) fn load_reconstruction(config: &DataConfig) -> Result<Reconstruction, DataPipelineError> {
    let pb = spinner(format!(
        "Loading CRSP tables from {}...",
        config.data_dir.display()
    ))?;
    let loaded = MarketData::load(config);
    pb.finish_and_clear();

    let data = loaded?;
    info!(
        dir = %config.data_dir.display(),
        constituents = data.constituents.len(),
        stocks = data.stocks.len(),
        index = data.index.len(),
        "data directory loaded"
    );
    Ok(Reconstruction::new(data)?)
}

/// Build a validated window from optional bounds.
pub(crate) fn window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DateWindow, DataPipelineError> {
    let window = DateWindow::new(start, end);
    window.validate()?;
    Ok(window)
}
