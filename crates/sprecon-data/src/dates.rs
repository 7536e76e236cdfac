//! Date parsing and conversion between [`NaiveDate`] and polars' physical
//! `Date` representation (days since the Unix epoch).

use crate::error::{DataError, Result};
use chrono::{DateTime, NaiveDate, TimeDelta};
use polars::prelude::*;
use serde::{Deserialize, Deserializer};

const FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"];

/// Parse a date in ISO, compact (`YYYYMMDD`) or US (`MM/DD/YYYY`) form.
///
/// A trailing time component (`2019-03-29 00:00:00`, `2019-03-29T00:00:00`)
/// is ignored.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let day_part = trimmed
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(trimmed);

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day_part, fmt).ok())
        .ok_or_else(|| DataError::InvalidDate(raw.to_string()))
}

/// Convert a date to days since the Unix epoch.
pub fn to_epoch_days(date: NaiveDate) -> i32 {
    // Every representable date is within ±2^31 days of the epoch.
    date.signed_duration_since(DateTime::UNIX_EPOCH.date_naive()).num_days() as i32
}

/// Convert days since the Unix epoch back to a date.
pub fn from_epoch_days(days: i32) -> Option<NaiveDate> {
    DateTime::UNIX_EPOCH.date_naive().checked_add_signed(TimeDelta::days(days.into()))
}

/// A literal expression of polars `Date` type.
pub fn date_lit(date: NaiveDate) -> Expr {
    lit(to_epoch_days(date)).cast(DataType::Date)
}

/// Serde adapter for required date fields.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

/// Serde adapter for optional date fields; blank cells load as `None`.
pub(crate) fn deserialize_opt<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s).map(Some).map_err(serde::de::Error::custom),
    }
}
