//! Inclusive date windows.

use crate::error::{IndexError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sprecon_data::dates::date_lit;

/// An optional `[start, end]` range, both ends inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First date kept.
    pub start: Option<NaiveDate>,
    /// Last date kept.
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    /// Create a window.
    pub const fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// A window that keeps every date.
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Reject windows whose start is after their end.
    pub fn validate(&self) -> Result<()> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => {
                Err(IndexError::InvalidWindow { start, end })
            }
            _ => Ok(()),
        }
    }

    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| s <= date) && self.end.is_none_or(|e| date <= e)
    }

    /// Filter expression on a `Date` column, `None` when unbounded.
    pub fn predicate(&self, column: &str) -> Option<Expr> {
        let lower = self.start.map(|s| col(column).gt_eq(date_lit(s)));
        let upper = self.end.map(|e| col(column).lt_eq(date_lit(e)));
        match (lower, upper) {
            (Some(l), Some(u)) => Some(l.and(u)),
            (l, u) => l.or(u),
        }
    }

    /// Restrict a lazy frame to the window.
    pub fn apply(&self, frame: LazyFrame, column: &str) -> LazyFrame {
        match self.predicate(column) {
            Some(predicate) => frame.filter(predicate),
            None => frame,
        }
    }
}
