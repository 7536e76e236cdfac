//! Date-ordered series expressions.
//!
//! Every expression expects a frame sorted by `date` with one row per date.
//! Nulls are missing values and are never invented, `NaN` propagates.

use polars::prelude::*;
use sprecon_data::schema::DATE;

fn first_row() -> Expr {
    col(DATE).eq(col(DATE).first())
}

/// Chain an index level from a column of totals.
///
/// `level(t) = level(t-1) × x(t) / x(t-1)` with `level(0) = seed`. Computed
/// in closed form, `seed × x(t) / x(0)`, so a missing total only blanks its
/// own date.
pub fn chained(total: &str, seed: Expr) -> Expr {
    seed * col(total) / col(total).first()
}

/// Period-over-period simple return, null on the first date.
pub fn simple_return(level: &str) -> Expr {
    col(level) / col(level).shift(lit(1)) - lit(1.0)
}

/// Compound a return column into a level equal to `seed` on the first date.
///
/// The return on the first date is ignored. A missing return leaves a gap
/// at its date and the running level carries over unchanged.
pub fn compounded(returns: &str, seed: Expr) -> Expr {
    let growth = when(first_row())
        .then(lit(1.0))
        .otherwise(lit(1.0) + col(returns).cast(DataType::Float64))
        .fill_null(lit(1.0))
        .cum_prod(false);

    when(first_row())
        .then(seed.clone())
        .when(col(returns).is_null())
        .then(lit(NULL))
        .otherwise(seed * growth)
}

/// Last non-null value of a column.
pub fn last_valid(expr: Expr) -> Expr {
    expr.drop_nulls().last()
}
