//! Method B: a market-cap-weighted portfolio rebalanced on a schedule.
//!
//! At every rebalancing date the weights reset to the index weights
//!
//! ```text
//! w(i, t) = cap(i, t) / Σ cap(j, t)   over the active constituents
//! ```
//!
//! and stay fixed until the next rebalancing date. The first portfolio is
//! formed on the first date with index weights, scheduled or not. The
//! portfolio return is
//! `R(t) = Σ w(i, t-1) × retx(i, t)`. Price-only returns are used because
//! the official index excludes ordinary dividends.

use crate::columns::*;
use crate::error::{IndexError, Result};
use crate::membership::active_observations;
use crate::rebalance::RebalanceFrequency;
use crate::series::compounded;
use crate::window::DateWindow;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sprecon_data::MarketData;
use sprecon_data::dates::to_epoch_days;
use sprecon_data::derived::with_market_cap;
use sprecon_data::frames::{date_values, f64_values, i64_values};
use sprecon_data::schema::{DATE, MARKET_CAP, PERMNO, RETX, SPINDX, SPRTRN};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Weights keyed by security identifier.
pub type Weights = BTreeMap<i64, f64>;

/// Window and schedule of a rebalanced portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceConfig {
    /// Dates considered.
    pub window: DateWindow,
    /// Rebalancing frequency.
    pub frequency: RebalanceFrequency,
}

impl RebalanceConfig {
    /// Quarterly rebalancing over `window`.
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            frequency: RebalanceFrequency::default(),
        }
    }

    /// Set the rebalancing frequency.
    pub const fn with_frequency(mut self, frequency: RebalanceFrequency) -> Self {
        self.frequency = frequency;
        self
    }
}

/// Index weights of the active constituents on every date.
///
/// Returns `[date, permno, market_cap, weight]` sorted by date and permno.
/// Constituents without a market cap get no weight.
pub fn index_weights(
    constituents: &DataFrame,
    stocks: &DataFrame,
    window: DateWindow,
) -> Result<DataFrame> {
    window.validate()?;

    let stocks = window.apply(with_market_cap(stocks.clone().lazy()), DATE);
    let weights = active_observations(constituents.clone().lazy(), stocks)
        .filter(col(MARKET_CAP).is_not_null())
        .select([
            col(DATE),
            col(PERMNO),
            col(MARKET_CAP),
            (col(MARKET_CAP) / col(MARKET_CAP).sum().over([col(DATE)])).alias(WEIGHT),
        ])
        .sort([DATE, PERMNO], SortMultipleOptions::default())
        .collect()?;

    debug!(rows = weights.height(), "index weights computed");
    Ok(weights)
}

/// Weighted sum of the available returns.
///
/// A holding without a return on the date contributes nothing. `None` when
/// no holding has a return.
fn portfolio_return(weights: &Weights, returns: Option<&BTreeMap<i64, f64>>) -> Option<f64> {
    let returns = returns?;
    let mut total = None;
    for (permno, weight) in weights {
        if let Some(r) = returns.get(permno) {
            *total.get_or_insert(0.0) += weight * r;
        }
    }
    total
}

/// Outcome of running a rebalanced portfolio over an observation calendar.
#[derive(Debug, Clone)]
pub struct RebalancedPortfolio {
    frequency: RebalanceFrequency,
    calendar: Vec<NaiveDate>,
    snapshots: BTreeMap<NaiveDate, Weights>,
    returns: Vec<Option<f64>>,
    holdings: Vec<usize>,
}

impl RebalancedPortfolio {
    /// Run the portfolio.
    ///
    /// `weights` is the output of [`index_weights`]; `stocks` supplies the
    /// returns of every held security, member or not.
    pub fn build(
        weights: &DataFrame,
        stocks: &DataFrame,
        config: &RebalanceConfig,
    ) -> Result<Self> {
        let stocks = config.window.apply(stocks.clone().lazy(), DATE).collect()?;

        let stock_dates = date_values(&stocks, DATE)?;
        let stock_permnos = i64_values(&stocks, PERMNO)?;
        let stock_returns = f64_values(&stocks, RETX)?;

        let mut returns_by_date: BTreeMap<NaiveDate, BTreeMap<i64, f64>> = BTreeMap::new();
        let mut calendar = BTreeSet::new();
        for ((date, permno), ret) in stock_dates.into_iter().zip(stock_permnos).zip(stock_returns) {
            let Some(date) = date else { continue };
            calendar.insert(date);
            if let (Some(permno), Some(ret)) = (permno, ret) {
                returns_by_date.entry(date).or_default().insert(permno, ret);
            }
        }

        let mut index_by_date: BTreeMap<NaiveDate, Weights> = BTreeMap::new();
        let weight_dates = date_values(weights, DATE)?;
        let weight_permnos = i64_values(weights, PERMNO)?;
        let weight_values = f64_values(weights, WEIGHT)?;
        for ((date, permno), weight) in weight_dates.into_iter().zip(weight_permnos).zip(weight_values)
        {
            if let (Some(date), Some(permno), Some(weight)) = (date, permno, weight) {
                index_by_date.entry(date).or_default().insert(permno, weight);
            }
        }

        let schedule = config.frequency.rebalance_dates(&calendar);
        let calendar: Vec<NaiveDate> = calendar.into_iter().collect();

        let mut held = Weights::new();
        let mut snapshots = BTreeMap::new();
        let mut returns = Vec::with_capacity(calendar.len());
        let mut holdings = Vec::with_capacity(calendar.len());

        for (i, date) in calendar.iter().enumerate() {
            returns.push(if i == 0 {
                None
            } else {
                portfolio_return(&held, returns_by_date.get(date))
            });

            let scheduled = schedule.contains(date);
            if scheduled || held.is_empty() {
                match index_by_date.remove(date) {
                    Some(weights) if !weights.is_empty() => {
                        held = weights;
                        snapshots.insert(*date, held.clone());
                    }
                    _ if scheduled && !held.is_empty() => {
                        warn!(%date, "no index weights on rebalancing date, keeping previous weights");
                    }
                    _ => {}
                }
            }
            holdings.push(held.len());
        }

        debug!(
            dates = calendar.len(),
            rebalances = snapshots.len(),
            "rebalanced portfolio built"
        );

        Ok(Self {
            frequency: config.frequency,
            calendar,
            snapshots,
            returns,
            holdings,
        })
    }

    /// Rebalancing frequency used.
    pub const fn frequency(&self) -> RebalanceFrequency {
        self.frequency
    }

    /// Observation dates.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.calendar
    }

    /// Portfolio return on every date, `None` on the first.
    pub fn returns(&self) -> &[Option<f64>] {
        &self.returns
    }

    /// Compounded returns, 1 on the first date.
    pub fn cumulative_returns(&self) -> Result<Vec<Option<f64>>> {
        Ok(f64_values(&self.to_frame()?, CUMRET_APPROX_B)?)
    }

    /// Dates on which the weights were reset.
    pub fn rebalance_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.snapshots.keys().copied()
    }

    /// Weights held after the close of `date`.
    pub fn weights_on(&self, date: NaiveDate) -> Option<&Weights> {
        self.snapshots.range(..=date).next_back().map(|(_, w)| w)
    }

    /// Weights set on each rebalancing date.
    pub const fn snapshots(&self) -> &BTreeMap<NaiveDate, Weights> {
        &self.snapshots
    }

    /// `[date, ret_approx_B, cumret_approx_B, n_holdings]`
    pub fn to_frame(&self) -> Result<DataFrame> {
        let days: Vec<i32> = self.calendar.iter().map(|d| to_epoch_days(*d)).collect();
        let holdings: Vec<u32> = self
            .holdings
            .iter()
            .map(|n| u32::try_from(*n).unwrap_or(u32::MAX))
            .collect();

        let df = DataFrame::new(vec![
            Series::new(DATE.into(), days).cast(&DataType::Date)?.into(),
            Series::new(RET_APPROX_B.into(), self.returns.clone()).into(),
            Series::new(N_HOLDINGS.into(), holdings).into(),
        ])?
        .lazy()
        .select([
            col(DATE),
            col(RET_APPROX_B),
            compounded(RET_APPROX_B, lit(1.0)).alias(CUMRET_APPROX_B),
            col(N_HOLDINGS),
        ])
        .collect()?;
        Ok(df)
    }

    /// `[date, permno, weight]` for every rebalancing date.
    pub fn weights_frame(&self) -> Result<DataFrame> {
        let mut days = Vec::new();
        let mut permnos = Vec::new();
        let mut weights = Vec::new();
        for (date, snapshot) in &self.snapshots {
            for (permno, weight) in snapshot {
                days.push(to_epoch_days(*date));
                permnos.push(*permno);
                weights.push(*weight);
            }
        }

        let df = DataFrame::new(vec![
            Series::new(DATE.into(), days).cast(&DataType::Date)?.into(),
            Series::new(PERMNO.into(), permnos).into(),
            Series::new(WEIGHT.into(), weights).into(),
        ])?;
        Ok(df)
    }
}

/// Run the rebalanced portfolio from the raw tables.
pub fn build_portfolio(
    constituents: &DataFrame,
    stocks: &DataFrame,
    config: &RebalanceConfig,
) -> Result<RebalancedPortfolio> {
    let weights = index_weights(constituents, stocks, config.window)?;
    RebalancedPortfolio::build(&weights, stocks, config)
}

/// Method B returns.
///
/// Returns `[date, ret_approx_B, cumret_approx_B, n_holdings]`.
pub fn calculate_returns_with_rebalancing(
    constituents: &DataFrame,
    stocks: &DataFrame,
    config: &RebalanceConfig,
) -> Result<DataFrame> {
    build_portfolio(constituents, stocks, config)?.to_frame()
}

/// Join the official series and add `level_approx_B`.
///
/// `level_approx_B` compounds the portfolio return from the official level
/// on the first joined date. `cumret_approx_B` and `sp500_cumret` are
/// renormalized to 1 on that date.
pub fn append_official_index_and_levels_b(
    returns_b: &DataFrame,
    index: &DataFrame,
) -> Result<DataFrame> {
    let df = index
        .clone()
        .lazy()
        .select([col(DATE), col(SPINDX), col(SPRTRN)])
        .join(
            returns_b.clone().lazy(),
            [col(DATE)],
            [col(DATE)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([DATE], SortMultipleOptions::default())
        .with_columns([
            compounded(RET_APPROX_B, lit(1.0)).alias(CUMRET_APPROX_B),
            compounded(RET_APPROX_B, col(SPINDX).first()).alias(LEVEL_APPROX_B),
            compounded(SPRTRN, lit(1.0)).alias(SP500_CUMRET),
        ])
        .collect()?;

    if df.height() == 0 {
        return Err(IndexError::EmptyResult(
            "portfolio returns joined with the official index".to_string(),
        ));
    }

    Ok(df)
}

/// Method B over a loaded data set, plus the portfolio that produced it.
pub fn approximate(
    data: &MarketData,
    config: &RebalanceConfig,
) -> Result<(DataFrame, RebalancedPortfolio)> {
    let portfolio = build_portfolio(&data.constituents_frame()?, &data.stocks_frame()?, config)?;
    let index = config.window.apply(data.index_frame()?.lazy(), DATE).collect()?;
    let df = append_official_index_and_levels_b(&portfolio.to_frame()?, &index)?;
    info!(
        dates = df.height(),
        rebalances = portfolio.snapshots().len(),
        frequency = %config.frequency,
        "method B complete"
    );
    Ok((df, portfolio))
}
