//! Joining security observations to membership intervals.

use polars::prelude::*;
use sprecon_data::schema::{DATE, MBRENDDT, MBRSTARTDT, PERMNO};

/// Keep the security observations that fall inside a membership interval.
///
/// Both interval bounds are inclusive, so a security joining or leaving on a
/// quarter boundary is a member on that date. A null end date is open ended.
/// Intervals of one security are assumed not to overlap, so every kept
/// observation appears once.
pub fn active_observations(constituents: LazyFrame, stocks: LazyFrame) -> LazyFrame {
    let intervals = constituents.select([col(PERMNO), col(MBRSTARTDT), col(MBRENDDT)]);

    stocks
        .join(
            intervals,
            [col(PERMNO)],
            [col(PERMNO)],
            JoinArgs::new(JoinType::Inner),
        )
        .filter(
            col(DATE).gt_eq(col(MBRSTARTDT)).and(
                col(DATE)
                    .lt_eq(col(MBRENDDT))
                    .or(col(MBRENDDT).is_null()),
            ),
        )
}
