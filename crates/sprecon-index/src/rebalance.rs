//! Rebalancing schedules.

use crate::error::IndexError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How often the portfolio weights are reset to the index weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceFrequency {
    /// Every observation date
    Monthly,
    /// End of March, June, September and December
    #[default]
    Quarterly,
    /// End of December
    Annual,
}

impl RebalanceFrequency {
    /// All frequencies.
    pub const ALL: [Self; 3] = [Self::Monthly, Self::Quarterly, Self::Annual];

    /// Period a date falls in, as `(year, period)`.
    pub fn period_of(&self, date: NaiveDate) -> (i32, u32) {
        let period = match self {
            Self::Monthly => date.month0(),
            Self::Quarterly => date.month0() / 3,
            Self::Annual => 0,
        };
        (date.year(), period)
    }

    /// Whether `date` lies in the last month of its period.
    pub fn is_period_end_month(&self, date: NaiveDate) -> bool {
        match self {
            Self::Monthly => true,
            Self::Quarterly => date.month() % 3 == 0,
            Self::Annual => date.month() == 12,
        }
    }

    /// Rebalancing dates within an observation calendar.
    ///
    /// The first calendar date always rebalances, since it sets the initial
    /// weights. After that a date rebalances when it is the last observed
    /// date of its period. The final calendar date only counts when it falls
    /// in a period-end month, as later observations of its period may exist.
    pub fn rebalance_dates(&self, calendar: &BTreeSet<NaiveDate>) -> BTreeSet<NaiveDate> {
        let dates: Vec<NaiveDate> = calendar.iter().copied().collect();
        let mut out = BTreeSet::new();

        let Some(first) = dates.first() else {
            return out;
        };
        out.insert(*first);

        for pair in dates.windows(2) {
            if self.period_of(pair[0]) != self.period_of(pair[1]) {
                out.insert(pair[0]);
            }
        }
        if let Some(last) = dates.last()
            && self.is_period_end_month(*last)
        {
            out.insert(*last);
        }

        out
    }

    /// Lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }
}

impl fmt::Display for RebalanceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RebalanceFrequency {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "m" => Ok(Self::Monthly),
            "quarterly" | "q" => Ok(Self::Quarterly),
            "annual" | "yearly" | "a" | "y" => Ok(Self::Annual),
            other => Err(IndexError::InvalidFrequency(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month_ends(year: i32) -> BTreeSet<NaiveDate> {
        (1..=12)
            .map(|m| {
                let next = if m == 12 {
                    date(year + 1, 1, 1)
                } else {
                    date(year, m + 1, 1)
                };
                next.pred_opt().unwrap()
            })
            .collect()
    }

    #[test]
    fn test_quarterly_picks_quarter_end_months() {
        let calendar = month_ends(2019);
        let dates: Vec<u32> = RebalanceFrequency::Quarterly
            .rebalance_dates(&calendar)
            .iter()
            .map(|d| d.month())
            .collect();

        // January is the starting portfolio.
        assert_eq!(dates, vec![1, 3, 6, 9, 12]);
    }

    #[test]
    fn test_monthly_rebalances_everywhere() {
        let calendar = month_ends(2019);
        assert_eq!(
            RebalanceFrequency::Monthly.rebalance_dates(&calendar),
            calendar
        );
    }

    #[test]
    fn test_annual_picks_december() {
        let mut calendar = month_ends(2018);
        calendar.extend(month_ends(2019));
        let dates: Vec<NaiveDate> = RebalanceFrequency::Annual
            .rebalance_dates(&calendar)
            .into_iter()
            .collect();
        assert_eq!(
            dates,
            vec![date(2018, 1, 31), date(2018, 12, 31), date(2019, 12, 31)]
        );
    }

    #[test]
    fn test_incomplete_final_period_is_not_a_rebalance() {
        let calendar: BTreeSet<NaiveDate> =
            [date(2019, 1, 31), date(2019, 2, 28), date(2019, 3, 29), date(2019, 4, 30)]
                .into_iter()
                .collect();
        let dates = RebalanceFrequency::Quarterly.rebalance_dates(&calendar);
        assert!(dates.contains(&date(2019, 3, 29)));
        assert!(!dates.contains(&date(2019, 4, 30)));
    }

    #[test]
    fn test_gap_in_calendar_uses_last_observed_date() {
        // No March observation: February closes the first quarter.
        let calendar: BTreeSet<NaiveDate> =
            [date(2019, 1, 31), date(2019, 2, 28), date(2019, 4, 30)]
                .into_iter()
                .collect();
        let dates = RebalanceFrequency::Quarterly.rebalance_dates(&calendar);
        assert!(dates.contains(&date(2019, 2, 28)));
    }

    #[test]
    fn test_empty_calendar() {
        assert!(
            RebalanceFrequency::Quarterly
                .rebalance_dates(&BTreeSet::new())
                .is_empty()
        );
    }

    #[rstest]
    #[case("monthly", RebalanceFrequency::Monthly)]
    #[case("Quarterly", RebalanceFrequency::Quarterly)]
    #[case("q", RebalanceFrequency::Quarterly)]
    #[case("annual", RebalanceFrequency::Annual)]
    #[case(" yearly ", RebalanceFrequency::Annual)]
    fn test_from_str(#[case] input: &str, #[case] expected: RebalanceFrequency) {
        assert_eq!(input.parse::<RebalanceFrequency>().unwrap(), expected);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!(matches!(
            "weekly".parse::<RebalanceFrequency>(),
            Err(IndexError::InvalidFrequency(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for freq in RebalanceFrequency::ALL {
            assert_eq!(freq.to_string().parse::<RebalanceFrequency>().unwrap(), freq);
        }
    }

    #[test]
    fn test_default_is_quarterly() {
        assert_eq!(RebalanceFrequency::default(), RebalanceFrequency::Quarterly);
    }
}
