//! Comparison of the approximations with the official index.

use crate::columns::*;
use crate::error::Result;
use crate::method_a;
use crate::method_b::{RebalanceConfig, calculate_returns_with_rebalancing};
use crate::rebalance::RebalanceFrequency;
use crate::series::{compounded, last_valid};
use crate::window::DateWindow;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sprecon_data::MarketData;
use sprecon_data::frames::{date_values, f64_values};
use sprecon_data::schema::{DATE, SPINDX, SPRTRN};
use tracing::info;

const LEFT: &str = "left";
const RIGHT: &str = "right";
const DIFFERENCE: &str = "difference";
const MEAN: &str = "mean";
const STD: &str = "std";
const COUNT: &str = "count";
const CORRELATION: &str = "correlation";

/// Rows where both columns are finite, renamed to `left` and `right`.
fn paired(frame: &DataFrame, a: &str, b: &str) -> LazyFrame {
    frame
        .clone()
        .lazy()
        .select([
            col(a).cast(DataType::Float64).alias(LEFT),
            col(b).cast(DataType::Float64).alias(RIGHT),
        ])
        .filter(col(LEFT).is_finite().and(col(RIGHT).is_finite()))
}

fn scalar(df: &DataFrame, name: &str) -> Result<Option<f64>> {
    Ok(f64_values(df, name)?.first().copied().flatten())
}

/// Pearson correlation of two columns over the rows where both are finite.
///
/// `None` with fewer than two paired rows or a constant column.
pub fn pairwise_correlation(frame: &DataFrame, a: &str, b: &str) -> Result<Option<f64>> {
    let df = paired(frame, a, b)
        .select([pearson_corr(col(LEFT), col(RIGHT)).alias(CORRELATION)])
        .collect()?;
    Ok(scalar(&df, CORRELATION)?.filter(|r| r.is_finite()))
}

/// How closely one approximation tracks the official index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingStats {
    /// Approximation name.
    pub method: String,
    /// Pearson correlation of returns.
    pub correlation: Option<f64>,
    /// Mean of `approx - official` returns.
    pub mean_difference: Option<f64>,
    /// Sample standard deviation of `approx - official` returns.
    pub tracking_error: Option<f64>,
    /// Last cumulative return of the approximation.
    pub final_cumret_approx: Option<f64>,
    /// Last cumulative return of the official index.
    pub final_cumret_official: Option<f64>,
    /// Dates on which both returns are available.
    pub observations: usize,
}

impl TrackingStats {
    /// Compare the return column `approx` with `official`.
    ///
    /// `frame` is sorted by `date`. Cumulative returns are compounded from
    /// the returns, so both start at 1 on the first date.
    pub fn compute(
        method: impl Into<String>,
        frame: &DataFrame,
        approx: &str,
        official: &str,
    ) -> Result<Self> {
        let moments = paired(frame, approx, official)
            .with_column((col(LEFT) - col(RIGHT)).alias(DIFFERENCE))
            .select([
                col(DIFFERENCE).mean().alias(MEAN),
                col(DIFFERENCE).std(1).alias(STD),
                col(DIFFERENCE).count().cast(DataType::Float64).alias(COUNT),
            ])
            .collect()?;

        let finals = frame
            .clone()
            .lazy()
            .select([
                last_valid(compounded(approx, lit(1.0))).alias(LEFT),
                last_valid(compounded(official, lit(1.0))).alias(RIGHT),
            ])
            .collect()?;

        Ok(Self {
            method: method.into(),
            correlation: pairwise_correlation(frame, approx, official)?,
            mean_difference: scalar(&moments, MEAN)?,
            tracking_error: scalar(&moments, STD)?,
            final_cumret_approx: scalar(&finals, LEFT)?,
            final_cumret_official: scalar(&finals, RIGHT)?,
            observations: scalar(&moments, COUNT)?.map_or(0, |n| n as usize),
        })
    }
}

/// Pairwise return correlations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Series names, in row and column order.
    pub labels: Vec<String>,
    /// `values[i][j]` is the correlation of series `i` and `j`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlate every pair of the named columns of `frame`.
    pub fn compute(frame: &DataFrame, columns: &[&str]) -> Result<Self> {
        let mut values = vec![vec![None; columns.len()]; columns.len()];
        for (i, a) in columns.iter().enumerate() {
            for (j, b) in columns.iter().enumerate().skip(i) {
                let r = pairwise_correlation(frame, a, b)?;
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        Ok(Self {
            labels: columns.iter().map(|name| (*name).to_string()).collect(),
            values,
        })
    }

    /// Correlation between two named series.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.values[i][j]
    }
}

/// Both approximations merged with the official series.
#[derive(Debug, Clone)]
pub struct Approximations {
    /// Merged table, one row per date.
    pub frame: DataFrame,
    /// Tracking statistics, Method A first.
    pub tracking: Vec<TrackingStats>,
    /// Return correlations of the official index and both methods.
    pub correlation: CorrelationMatrix,
    /// First date in the table.
    pub start: Option<NaiveDate>,
    /// Last date in the table.
    pub end: Option<NaiveDate>,
}

impl Approximations {
    /// Tracking statistics of one method.
    pub fn stats(&self, method: &str) -> Option<&TrackingStats> {
        self.tracking.iter().find(|s| s.method == method)
    }
}

/// Run both methods and merge them with the official series.
///
/// The frame holds `[date, spindx, sprtrn, sp500_market_cap, level_approx_A,
/// ret_approx_A, cumret_approx_A, sp500_cumret, ret_approx_B,
/// cumret_approx_B, level_approx_B, n_constituents, n_holdings]`. Dates are
/// those where Method A and the official series overlap.
pub fn create_index_approximations(
    data: &MarketData,
    window: DateWindow,
    frequency: RebalanceFrequency,
) -> Result<Approximations> {
    let method_a = method_a::approximate(data, window)?;

    let config = RebalanceConfig::new(window).with_frequency(frequency);
    let returns_b =
        calculate_returns_with_rebalancing(&data.constituents_frame()?, &data.stocks_frame()?, &config)?;

    let frame = method_a
        .lazy()
        .join(
            returns_b.lazy().select([col(DATE), col(RET_APPROX_B), col(N_HOLDINGS)]),
            [col(DATE)],
            [col(DATE)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([DATE], SortMultipleOptions::default())
        .with_columns([
            compounded(RET_APPROX_B, lit(1.0)).alias(CUMRET_APPROX_B),
            compounded(RET_APPROX_B, col(SPINDX).first()).alias(LEVEL_APPROX_B),
        ])
        .select([
            col(DATE),
            col(SPINDX),
            col(SPRTRN),
            col(SP500_MARKET_CAP),
            col(LEVEL_APPROX_A),
            col(RET_APPROX_A),
            col(CUMRET_APPROX_A),
            col(SP500_CUMRET),
            col(RET_APPROX_B),
            col(CUMRET_APPROX_B),
            col(LEVEL_APPROX_B),
            col(N_CONSTITUENTS),
            col(N_HOLDINGS),
        ])
        .collect()?;

    let tracking = vec![
        TrackingStats::compute("A", &frame, RET_APPROX_A, SPRTRN)?,
        TrackingStats::compute("B", &frame, RET_APPROX_B, SPRTRN)?,
    ];
    let correlation = CorrelationMatrix::compute(&frame, &[SPRTRN, RET_APPROX_A, RET_APPROX_B])?;

    let dates = date_values(&frame, DATE)?;
    let start = dates.first().copied().flatten();
    let end = dates.last().copied().flatten();

    info!(
        dates = frame.height(),
        corr_a = ?tracking[0].correlation,
        corr_b = ?tracking[1].correlation,
        "index approximations complete"
    );

    Ok(Approximations {
        frame,
        tracking,
        correlation,
        start,
        end,
    })
}
