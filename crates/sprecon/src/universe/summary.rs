//! Descriptive statistics of a membership table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sprecon_data::MembershipRecord;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Counts and date range of a membership table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSummary {
    /// Number of intervals.
    pub rows: usize,
    /// Number of distinct securities.
    pub unique_permnos: usize,
    /// Intervals per membership flag.
    pub by_flag: BTreeMap<String, usize>,
    /// Intervals per index number.
    pub by_indno: BTreeMap<i64, usize>,
    /// Intervals per index family.
    pub by_indfam: BTreeMap<i64, usize>,
    /// Intervals without an index family.
    pub missing_indfam: usize,
    /// Intervals without an end date.
    pub open_ended: usize,
    /// Earliest start date.
    pub earliest_start: Option<NaiveDate>,
    /// Latest end date among closed intervals.
    pub latest_end: Option<NaiveDate>,
}

impl MembershipSummary {
    /// Summarize a set of intervals.
    pub fn from_records(records: &[MembershipRecord]) -> Self {
        let mut summary = Self {
            rows: records.len(),
            ..Self::default()
        };
        let mut permnos = BTreeSet::new();

        for record in records {
            permnos.insert(record.permno);
            *summary.by_flag.entry(record.mbrflg.clone()).or_default() += 1;
            *summary.by_indno.entry(record.indno).or_default() += 1;
            match record.indfam {
                Some(fam) => *summary.by_indfam.entry(fam).or_default() += 1,
                None => summary.missing_indfam += 1,
            }
            if record.mbrenddt.is_none() {
                summary.open_ended += 1;
            }
            summary.earliest_start = Some(
                summary
                    .earliest_start
                    .map_or(record.mbrstartdt, |d| d.min(record.mbrstartdt)),
            );
            summary.latest_end = summary.latest_end.max(record.mbrenddt);
        }

        summary.unique_permnos = permnos.len();
        summary
    }
}

impl fmt::Display for MembershipSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = |d: Option<NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());

        writeln!(f, "Membership intervals: {}", self.rows)?;
        writeln!(f, "  Unique securities:  {}", self.unique_permnos)?;
        writeln!(f, "  Open-ended:         {}", self.open_ended)?;
        writeln!(f, "  Earliest start:     {}", date(self.earliest_start))?;
        writeln!(f, "  Latest end:         {}", date(self.latest_end))?;
        writeln!(f, "  By membership flag:")?;
        for (flag, n) in &self.by_flag {
            writeln!(f, "    {:<12} {}", flag, n)?;
        }
        writeln!(f, "  By index number:")?;
        for (indno, n) in &self.by_indno {
            writeln!(f, "    {:<12} {}", indno, n)?;
        }
        writeln!(f, "  By index family:")?;
        for (fam, n) in &self.by_indfam {
            writeln!(f, "    {:<12} {}", fam, n)?;
        }
        if self.missing_indfam > 0 {
            writeln!(f, "    {:<12} {}", "(missing)", self.missing_indfam)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_summary_counts() {
        let mut with_family = MembershipRecord::new(1, 1000500, date(1990, 1, 1), None, "Y");
        with_family.indfam = Some(1000500);
        let records = vec![
            with_family,
            MembershipRecord::new(2, 1000500, date(1957, 3, 1), Some(date(1999, 12, 31)), "Y"),
            MembershipRecord::new(2, 1000500, date(2005, 3, 1), Some(date(2020, 6, 30)), "Y"),
            MembershipRecord::new(3, 1000600, date(1980, 1, 1), Some(date(1985, 1, 1)), "N"),
        ];

        let summary = MembershipSummary::from_records(&records);
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.unique_permnos, 3);
        assert_eq!(summary.by_flag["Y"], 3);
        assert_eq!(summary.by_flag["N"], 1);
        assert_eq!(summary.by_indno[&1000500], 3);
        assert_eq!(summary.by_indfam[&1000500], 1);
        assert_eq!(summary.missing_indfam, 3);
        assert_eq!(summary.open_ended, 1);
        assert_eq!(summary.earliest_start, Some(date(1957, 3, 1)));
        assert_eq!(summary.latest_end, Some(date(2020, 6, 30)));
    }

    #[test]
    fn test_empty_summary() {
        let summary = MembershipSummary::from_records(&[]);
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.earliest_start, None);
        assert!(summary.to_string().contains("Membership intervals: 0"));
    }
}
