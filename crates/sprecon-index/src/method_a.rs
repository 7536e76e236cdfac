//! Method A: ratio of total constituent market cap.
//!
//! The index level moves with the sum of the constituents' market caps:
//!
//! ```text
//! level(t) = level(t-1) × cap(t) / cap(t-1)
//! ```
//!
//! The result tracks a buy-everything-at-market-cap aggregate, not a tradable
//! portfolio: additions and removals change the total without any offsetting
//! trade, and rebalancing costs are ignored.

use crate::columns::*;
use crate::error::{IndexError, Result};
use crate::membership::active_observations;
use crate::series::{chained, compounded, simple_return};
use crate::window::DateWindow;
use polars::prelude::*;
use sprecon_data::MarketData;
use sprecon_data::derived::with_market_cap;
use sprecon_data::schema::{DATE, MARKET_CAP, PERMNO, SPINDX, SPRTRN};
use tracing::{debug, info};

/// Total market cap of the active constituents on every date.
///
/// Returns a frame `[date, sp500_market_cap, n_constituents]` sorted by date.
/// A constituent with a null market cap is left out of the sum; a NaN market
/// cap makes the total NaN. The total is null on a date where no constituent
/// has a market cap.
pub fn calculate_total_market_cap(
    constituents: &DataFrame,
    stocks: &DataFrame,
    window: DateWindow,
) -> Result<DataFrame> {
    window.validate()?;

    let stocks = window.apply(with_market_cap(stocks.clone().lazy()), DATE);
    let totals = active_observations(constituents.clone().lazy(), stocks)
        .group_by([col(DATE)])
        .agg([
            when(col(MARKET_CAP).count().gt(lit(0)))
                .then(col(MARKET_CAP).sum())
                .otherwise(lit(NULL))
                .alias(SP500_MARKET_CAP),
            col(PERMNO).count().alias(N_CONSTITUENTS),
        ])
        .sort([DATE], SortMultipleOptions::default())
        .collect()?;

    debug!(dates = totals.height(), "total market cap computed");
    Ok(totals)
}

/// Join the official series and add the Method A columns.
///
/// Adds `level_approx_A` (normalized to the official level on the first
/// joined date), `ret_approx_A`, `cumret_approx_A` and `sp500_cumret`.
pub fn append_official_index_and_returns_a(
    total_market_cap: &DataFrame,
    index: &DataFrame,
) -> Result<DataFrame> {
    let df = total_market_cap
        .clone()
        .lazy()
        .join(
            index.clone().lazy().select([col(DATE), col(SPINDX), col(SPRTRN)]),
            [col(DATE)],
            [col(DATE)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([DATE], SortMultipleOptions::default())
        .with_column(chained(SP500_MARKET_CAP, col(SPINDX).first()).alias(LEVEL_APPROX_A))
        .with_columns([
            simple_return(LEVEL_APPROX_A).alias(RET_APPROX_A),
            chained(SP500_MARKET_CAP, lit(1.0)).alias(CUMRET_APPROX_A),
            compounded(SPRTRN, lit(1.0)).alias(SP500_CUMRET),
        ])
        .collect()?;

    if df.height() == 0 {
        return Err(IndexError::EmptyResult(
            "market cap joined with the official index".to_string(),
        ));
    }

    Ok(df)
}

/// Method A over a loaded data set.
pub fn approximate(data: &MarketData, window: DateWindow) -> Result<DataFrame> {
    let totals =
        calculate_total_market_cap(&data.constituents_frame()?, &data.stocks_frame()?, window)?;
    let index = window.apply(data.index_frame()?.lazy(), DATE).collect()?;
    let df = append_official_index_and_returns_a(&totals, &index)?;
    info!(dates = df.height(), "method A complete");
    Ok(df)
}
