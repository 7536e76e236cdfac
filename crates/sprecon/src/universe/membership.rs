//! Membership interval lookups.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sprecon_data::{MembershipRecord, Result};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// All membership intervals, indexed by security.
#[derive(Debug, Clone, Default)]
pub struct MembershipTable {
    records: Vec<MembershipRecord>,
    by_permno: HashMap<i64, Vec<usize>>,
}

impl MembershipTable {
    /// Build the table, rejecting intervals that end before they start.
    pub fn new(records: Vec<MembershipRecord>) -> Result<Self> {
        let mut by_permno: HashMap<i64, Vec<usize>> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            record.validate()?;
            by_permno.entry(record.permno).or_default().push(i);
        }
        debug!(
            intervals = records.len(),
            securities = by_permno.len(),
            "membership table indexed"
        );
        Ok(Self { records, by_permno })
    }

    /// All intervals, in load order.
    pub fn records(&self) -> &[MembershipRecord] {
        &self.records
    }

    /// Number of intervals.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no intervals.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Intervals containing `date`, ordered by start then end date.
    ///
    /// Open-ended intervals sort after closed ones with the same start.
    pub fn constituents_at(&self, date: NaiveDate) -> Vec<&MembershipRecord> {
        let mut active: Vec<&MembershipRecord> =
            self.records.iter().filter(|r| r.contains(date)).collect();
        active.sort_by_key(|r| (r.mbrstartdt, r.mbrenddt.is_none(), r.mbrenddt, r.permno));
        active
    }

    /// Whether `permno` is a member on `date`.
    pub fn is_member(&self, permno: i64, date: NaiveDate) -> bool {
        self.by_permno
            .get(&permno)
            .is_some_and(|idx| idx.iter().any(|&i| self.records[i].contains(date)))
    }

    /// Identifiers of the members on `date`.
    pub fn permnos_at(&self, date: NaiveDate) -> BTreeSet<i64> {
        self.records
            .iter()
            .filter(|r| r.contains(date))
            .map(|r| r.permno)
            .collect()
    }

    /// Intervals of one security, in load order.
    pub fn intervals(&self, permno: i64) -> Vec<&MembershipRecord> {
        self.by_permno
            .get(&permno)
            .map(|idx| idx.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Securities that joined or left between two dates.
    pub fn changes_between(&self, from: NaiveDate, to: NaiveDate) -> MembershipChanges {
        let before = self.permnos_at(from);
        let after = self.permnos_at(to);
        MembershipChanges {
            from,
            to,
            added: after.difference(&before).copied().collect(),
            removed: before.difference(&after).copied().collect(),
        }
    }

    /// The members on `date` as a [`Universe`](super::Universe).
    pub const fn at(&self, date: NaiveDate) -> PointInTime<'_> {
        PointInTime { table: self, date }
    }
}

/// Membership as of one date.
#[derive(Debug, Clone, Copy)]
pub struct PointInTime<'a> {
    table: &'a MembershipTable,
    date: NaiveDate,
}

impl<'a> PointInTime<'a> {
    /// The underlying table.
    pub const fn table(&self) -> &'a MembershipTable {
        self.table
    }

    /// The as-of date.
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Identifiers of the members.
    pub fn permnos(&self) -> BTreeSet<i64> {
        self.table.permnos_at(self.date)
    }
}

/// Additions and removals between two dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipChanges {
    /// Earlier date.
    pub from: NaiveDate,
    /// Later date.
    pub to: NaiveDate,
    /// Members on `to` that were not members on `from`.
    pub added: BTreeSet<i64>,
    /// Members on `from` that are not members on `to`.
    pub removed: BTreeSet<i64>,
}

impl MembershipChanges {
    /// Whether the member set is unchanged.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
