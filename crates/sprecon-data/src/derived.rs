//! Derived security columns.
//!
//! CRSP reports a negative price when no trade occurred and the bid/ask
//! midpoint was used instead, so prices enter the market cap in absolute
//! value. The cumulative factors `cfacshr` and `cfacpr` are not always equal
//! (spinoffs, rights, unusual distributions), so both are applied.

use crate::schema::*;
use polars::prelude::*;

/// `shrout × cfacshr`
pub fn adj_shrout_expr() -> Expr {
    (col(SHROUT) * col(CFACSHR)).alias(ADJ_SHROUT)
}

/// `|prc| / cfacpr`
pub fn adj_prc_expr() -> Expr {
    let abs_prc = when(col(PRC).lt(lit(0.0)))
        .then(lit(0.0) - col(PRC))
        .otherwise(col(PRC));
    (abs_prc / col(CFACPR)).alias(ADJ_PRC)
}

/// Add `adj_shrout`, `adj_prc` and `market_cap` to a security frame.
pub fn with_market_cap(stocks: LazyFrame) -> LazyFrame {
    stocks
        .with_columns([adj_shrout_expr(), adj_prc_expr()])
        .with_column((col(ADJ_PRC) * col(ADJ_SHROUT)).alias(MARKET_CAP))
}
