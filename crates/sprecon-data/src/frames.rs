//! Conversion between typed records and polars frames.

use crate::dates::{from_epoch_days, to_epoch_days};
use crate::error::{DataError, Result};
use crate::records::{IndexObservation, MembershipRecord, StockObservation};
use crate::schema::*;
use chrono::NaiveDate;
use polars::prelude::*;

fn date_series(name: &str, dates: impl Iterator<Item = Option<NaiveDate>>) -> Result<Column> {
    let days: Vec<Option<i32>> = dates.map(|d| d.map(to_epoch_days)).collect();
    Ok(Series::new(name.into(), days)
        .cast(&DataType::Date)?
        .into())
}

/// Build a frame from membership intervals.
///
/// Columns: `[permno, indno, mbrstartdt, mbrenddt, mbrflg, indfam]`.
pub fn membership_frame(records: &[MembershipRecord]) -> Result<DataFrame> {
    let permnos: Vec<i64> = records.iter().map(|r| r.permno).collect();
    let indnos: Vec<i64> = records.iter().map(|r| r.indno).collect();
    let flags: Vec<&str> = records.iter().map(|r| r.mbrflg.as_str()).collect();
    let families: Vec<Option<i64>> = records.iter().map(|r| r.indfam).collect();

    let df = DataFrame::new(vec![
        Series::new(PERMNO.into(), permnos).into(),
        Series::new(INDNO.into(), indnos).into(),
        date_series(MBRSTARTDT, records.iter().map(|r| Some(r.mbrstartdt)))?,
        date_series(MBRENDDT, records.iter().map(|r| r.mbrenddt))?,
        Series::new(MBRFLG.into(), flags).into(),
        Series::new(INDFAM.into(), families).into(),
    ])?;

    Ok(df)
}

/// Build a frame from security observations.
///
/// Columns: `[permno, date, prc, shrout, cfacshr, cfacpr, ret, retx]`.
pub fn stock_frame(observations: &[StockObservation]) -> Result<DataFrame> {
    let permnos: Vec<i64> = observations.iter().map(|o| o.permno).collect();
    let prcs: Vec<Option<f64>> = observations.iter().map(|o| o.prc).collect();
    let shrouts: Vec<Option<f64>> = observations.iter().map(|o| o.shrout).collect();
    let cfacshrs: Vec<Option<f64>> = observations.iter().map(|o| o.cfacshr).collect();
    let cfacprs: Vec<Option<f64>> = observations.iter().map(|o| o.cfacpr).collect();
    let rets: Vec<Option<f64>> = observations.iter().map(|o| o.ret).collect();
    let retxs: Vec<Option<f64>> = observations.iter().map(|o| o.retx).collect();

    let df = DataFrame::new(vec![
        Series::new(PERMNO.into(), permnos).into(),
        date_series(DATE, observations.iter().map(|o| Some(o.date)))?,
        Series::new(PRC.into(), prcs).into(),
        Series::new(SHROUT.into(), shrouts).into(),
        Series::new(CFACSHR.into(), cfacshrs).into(),
        Series::new(CFACPR.into(), cfacprs).into(),
        Series::new(RET.into(), rets).into(),
        Series::new(RETX.into(), retxs).into(),
    ])?;

    Ok(df)
}

/// Build a frame from the official index series.
///
/// Columns: `[date, spindx, sprtrn]`.
pub fn index_frame(observations: &[IndexObservation]) -> Result<DataFrame> {
    let levels: Vec<Option<f64>> = observations.iter().map(|o| o.spindx).collect();
    let returns: Vec<Option<f64>> = observations.iter().map(|o| o.sprtrn).collect();

    let df = DataFrame::new(vec![
        date_series(DATE, observations.iter().map(|o| Some(o.date)))?,
        Series::new(SPINDX.into(), levels).into(),
        Series::new(SPRTRN.into(), returns).into(),
    ])?;

    Ok(df)
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))
}

/// Read a `Date` column as chrono dates.
pub fn date_values(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let days = column(df, name)?
        .as_materialized_series()
        .cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|d| d.and_then(from_epoch_days))
        .collect())
}

/// Read a numeric column as `f64`, nulls preserved.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let values = column(df, name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// Read an integer column as `i64`, nulls preserved.
pub fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let values = column(df, name)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    Ok(values.i64()?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_membership_frame_columns() {
        let records = vec![
            MembershipRecord::new(1, 500, date(2000, 1, 31), Some(date(2010, 6, 30)), "Y"),
            MembershipRecord::new(2, 500, date(2005, 3, 31), None, "Y"),
        ];
        let df = membership_frame(&records).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.column(MBRSTARTDT).unwrap().dtype(), &DataType::Date);

        let ends = date_values(&df, MBRENDDT).unwrap();
        assert_eq!(ends, vec![Some(date(2010, 6, 30)), None]);
    }

    #[test]
    fn test_stock_frame_preserves_nulls() {
        let mut missing = StockObservation::new(2, date(2020, 1, 31), 10.0, 5.0, None);
        missing.prc = None;
        let observations = vec![
            StockObservation::new(1, date(2020, 1, 31), 20.0, 10.0, Some(0.01)),
            missing,
        ];
        let df = stock_frame(&observations).unwrap();

        assert_eq!(f64_values(&df, PRC).unwrap(), vec![Some(20.0), None]);
        assert_eq!(f64_values(&df, RETX).unwrap(), vec![Some(0.01), None]);
        assert_eq!(i64_values(&df, PERMNO).unwrap(), vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_index_frame_dates_round_trip() {
        let observations = vec![
            IndexObservation::new(date(1960, 1, 29), 55.61, None),
            IndexObservation::new(date(1960, 2, 29), 56.12, Some(0.0092)),
        ];
        let df = index_frame(&observations).unwrap();
        assert_eq!(
            date_values(&df, DATE).unwrap(),
            vec![Some(date(1960, 1, 29)), Some(date(1960, 2, 29))]
        );
    }

    #[test]
    fn test_missing_column_error() {
        let df = index_frame(&[]).unwrap();
        assert!(matches!(
            f64_values(&df, "nope"),
            Err(DataError::MissingColumn(name)) if name == "nope"
        ));
    }
}
