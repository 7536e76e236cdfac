//! Typed rows of the three input tables.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One membership interval of a security in the index.
///
/// Both bounds are inclusive. A missing end date means the security is
/// still a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    /// Security identifier.
    pub permno: i64,
    /// Index number.
    pub indno: i64,
    /// First day of membership.
    #[serde(deserialize_with = "crate::dates::deserialize")]
    pub mbrstartdt: NaiveDate,
    /// Last day of membership.
    #[serde(default, deserialize_with = "crate::dates::deserialize_opt")]
    pub mbrenddt: Option<NaiveDate>,
    /// Membership flag.
    #[serde(default)]
    pub mbrflg: String,
    /// Index family.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub indfam: Option<i64>,
}

impl MembershipRecord {
    /// Create a new membership interval.
    pub fn new(
        permno: i64,
        indno: i64,
        start: NaiveDate,
        end: Option<NaiveDate>,
        flag: impl Into<String>,
    ) -> Self {
        Self {
            permno,
            indno,
            mbrstartdt: start,
            mbrenddt: end,
            mbrflg: flag.into(),
            indfam: None,
        }
    }

    /// Check that the interval does not end before it starts.
    pub fn validate(&self) -> Result<()> {
        match self.mbrenddt {
            Some(end) if end < self.mbrstartdt => Err(DataError::InvalidMembership {
                permno: self.permno,
                start: self.mbrstartdt,
                end,
            }),
            _ => Ok(()),
        }
    }

    /// Whether the interval contains `date`, both ends inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.mbrstartdt <= date && self.mbrenddt.is_none_or(|end| date <= end)
    }
}

/// A monthly observation of a security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockObservation {
    /// Security identifier.
    pub permno: i64,
    /// Observation date.
    #[serde(deserialize_with = "crate::dates::deserialize")]
    pub date: NaiveDate,
    /// Price; negative when CRSP substituted the bid/ask midpoint.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub prc: Option<f64>,
    /// Shares outstanding.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub shrout: Option<f64>,
    /// Cumulative share adjustment factor.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cfacshr: Option<f64>,
    /// Cumulative price adjustment factor.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cfacpr: Option<f64>,
    /// Return including distributions.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub ret: Option<f64>,
    /// Return excluding distributions.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub retx: Option<f64>,
    /// Exchange code.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub exchcd: Option<i64>,
    /// Share code.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub shrcd: Option<i64>,
    /// SIC code; CRSP uses letters for some historical rows.
    #[serde(default)]
    pub siccd: Option<String>,
}

impl StockObservation {
    /// Create an observation with unit adjustment factors.
    pub const fn new(
        permno: i64,
        date: NaiveDate,
        prc: f64,
        shrout: f64,
        retx: Option<f64>,
    ) -> Self {
        Self {
            permno,
            date,
            prc: Some(prc),
            shrout: Some(shrout),
            cfacshr: Some(1.0),
            cfacpr: Some(1.0),
            ret: retx,
            retx,
            exchcd: None,
            shrcd: None,
            siccd: None,
        }
    }

    /// Set the cumulative adjustment factors.
    pub const fn with_factors(mut self, cfacshr: f64, cfacpr: f64) -> Self {
        self.cfacshr = Some(cfacshr);
        self.cfacpr = Some(cfacpr);
        self
    }

    /// Shares outstanding times the share adjustment factor.
    pub fn adj_shrout(&self) -> Option<f64> {
        Some(self.shrout? * self.cfacshr?)
    }

    /// Absolute price divided by the price adjustment factor.
    pub fn adj_prc(&self) -> Option<f64> {
        Some(self.prc?.abs() / self.cfacpr?)
    }

    /// Adjusted price times adjusted shares.
    pub fn market_cap(&self) -> Option<f64> {
        Some(self.adj_prc()? * self.adj_shrout()?)
    }
}

/// A monthly observation of the official index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexObservation {
    /// Calendar date.
    #[serde(
        rename = "caldt",
        alias = "date",
        deserialize_with = "crate::dates::deserialize"
    )]
    pub date: NaiveDate,
    /// Official index level.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub spindx: Option<f64>,
    /// Official index return (price only).
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub sprtrn: Option<f64>,
}

impl IndexObservation {
    /// Create a new index observation.
    pub const fn new(date: NaiveDate, spindx: f64, sprtrn: Option<f64>) -> Self {
        Self {
            date,
            spindx: Some(spindx),
            sprtrn,
        }
    }
}
