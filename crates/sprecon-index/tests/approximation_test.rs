//! End-to-end checks of both approximations on generated universes.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sprecon_data::frames::{date_values, f64_values};
use sprecon_data::schema::DATE;
use sprecon_data::{IndexObservation, MarketData, MembershipRecord, StockObservation};
use sprecon_index::columns::*;
use sprecon_index::method_b::build_portfolio;
use sprecon_index::{
    DateWindow, RebalanceConfig, RebalanceFrequency, calculate_total_market_cap,
    create_index_approximations,
};
use std::collections::BTreeMap;

fn month_end(year: i32, month: u32) -> NaiveDate {
    let (y, m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap().pred_opt().unwrap()
}

fn calendar(months: usize) -> Vec<NaiveDate> {
    (0..months)
        .map(|i| month_end(2015 + (i / 12) as i32, (i % 12) as u32 + 1))
        .collect()
}

/// Random-walk prices with price-only returns consistent with the prices.
fn generate(
    rng: &mut StdRng,
    securities: i64,
    dates: &[NaiveDate],
    membership: impl Fn(&mut StdRng, i64) -> MembershipRecord,
) -> MarketData {
    let mut constituents = Vec::new();
    let mut stocks = Vec::new();

    for permno in 1..=securities {
        constituents.push(membership(&mut *rng, permno));
        let shrout = rng.gen_range(1_000.0..50_000.0);
        let mut price: f64 = rng.gen_range(5.0..200.0);
        for (i, date) in dates.iter().enumerate() {
            let retx = if i == 0 {
                None
            } else {
                let r = rng.gen_range(-0.15..0.15);
                price *= 1.0 + r;
                Some(r)
            };
            // Some rows carry bid/ask midpoints.
            let quoted = if rng.gen_bool(0.1) { -price } else { price };
            stocks.push(StockObservation::new(permno, *date, quoted, shrout, retx));
        }
    }

    let index = dates
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let r = (i > 0).then(|| rng.gen_range(-0.05..0.05));
            IndexObservation::new(*d, 2000.0 + i as f64, r)
        })
        .collect();

    MarketData::new(constituents, stocks, index).unwrap()
}

#[test]
fn test_total_market_cap_matches_record_arithmetic() {
    let mut rng = StdRng::seed_from_u64(11);
    let dates = calendar(24);
    let first = dates[0];
    let data = generate(&mut rng, 40, &dates, |rng, permno| {
        let start = first + chrono::Days::new(rng.gen_range(0..400));
        let end = rng
            .gen_bool(0.5)
            .then(|| start + chrono::Days::new(rng.gen_range(0..400)));
        MembershipRecord::new(permno, 500, start, end, "Y")
    });

    let totals = calculate_total_market_cap(
        &data.constituents_frame().unwrap(),
        &data.stocks_frame().unwrap(),
        DateWindow::unbounded(),
    )
    .unwrap();

    let mut expected: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for obs in &data.stocks {
        let member = data
            .constituents
            .iter()
            .any(|r| r.permno == obs.permno && r.contains(obs.date));
        if member {
            *expected.entry(obs.date).or_default() += obs.market_cap().unwrap();
        }
    }

    let got_dates = date_values(&totals, DATE).unwrap();
    let got_caps = f64_values(&totals, SP500_MARKET_CAP).unwrap();
    assert_eq!(got_dates.len(), expected.len());
    for (date, cap) in got_dates.into_iter().zip(got_caps) {
        let want = expected[&date.unwrap()];
        assert_relative_eq!(cap.unwrap(), want, max_relative = 1e-12);
    }
}

#[test]
fn test_monthly_rebalancing_matches_market_cap_ratio() {
    // With a fixed membership and constant shares, a portfolio reset to index
    // weights every month earns exactly the change in total market cap.
    let mut rng = StdRng::seed_from_u64(3);
    let dates = calendar(18);
    let start = dates[0];
    let data = generate(&mut rng, 25, &dates, |_, permno| {
        MembershipRecord::new(permno, 500, start, None, "Y")
    });

    let result =
        create_index_approximations(&data, DateWindow::unbounded(), RebalanceFrequency::Monthly)
            .unwrap();
    let ret_a = f64_values(&result.frame, RET_APPROX_A).unwrap();
    let ret_b = f64_values(&result.frame, RET_APPROX_B).unwrap();

    assert_eq!(ret_a[0], None);
    assert_eq!(ret_b[0], None);
    for (a, b) in ret_a.iter().zip(&ret_b).skip(1) {
        assert_relative_eq!(a.unwrap(), b.unwrap(), epsilon = 1e-10);
    }

    let level_a = f64_values(&result.frame, LEVEL_APPROX_A).unwrap();
    let level_b = f64_values(&result.frame, LEVEL_APPROX_B).unwrap();
    assert_relative_eq!(level_a[0].unwrap(), 2000.0);
    assert_relative_eq!(level_b[0].unwrap(), 2000.0);
    assert_relative_eq!(
        level_a[17].unwrap(),
        level_b[17].unwrap(),
        max_relative = 1e-9
    );

    let corr = result.correlation.get(RET_APPROX_A, RET_APPROX_B).unwrap();
    assert_relative_eq!(corr, 1.0, epsilon = 1e-9);
    assert_eq!(result.start, Some(dates[0]));
    assert_eq!(result.end, Some(dates[17]));
}

#[test]
fn test_quarterly_weights_sum_to_one_and_hold_between_rebalances() {
    let mut rng = StdRng::seed_from_u64(29);
    let dates = calendar(24);
    let first = dates[0];
    let data = generate(&mut rng, 30, &dates, |rng, permno| {
        let start = if permno == 1 {
            first
        } else {
            first + chrono::Days::new(rng.gen_range(0..200))
        };
        MembershipRecord::new(permno, 500, start, None, "Y")
    });

    let config = RebalanceConfig::new(DateWindow::unbounded());
    let portfolio = build_portfolio(
        &data.constituents_frame().unwrap(),
        &data.stocks_frame().unwrap(),
        &config,
    )
    .unwrap();

    let rebalances: Vec<NaiveDate> = portfolio.rebalance_dates().collect();
    assert!(rebalances.len() >= 8);
    for date in &rebalances {
        let sum: f64 = portfolio.weights_on(*date).unwrap().values().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
    }

    for date in portfolio.dates() {
        let last_rebalance = rebalances.iter().rev().find(|r| *r <= date).unwrap();
        assert_eq!(
            portfolio.weights_on(*date),
            portfolio.weights_on(*last_rebalance)
        );
    }
}

#[test]
fn test_window_narrows_every_output() {
    let mut rng = StdRng::seed_from_u64(5);
    let dates = calendar(24);
    let start = dates[0];
    let data = generate(&mut rng, 10, &dates, |_, permno| {
        MembershipRecord::new(permno, 500, start, None, "Y")
    });

    let window = DateWindow::new(Some(dates[6]), Some(dates[11]));
    let result =
        create_index_approximations(&data, window, RebalanceFrequency::Quarterly).unwrap();

    assert_eq!(result.frame.height(), 6);
    assert_eq!(result.start, Some(dates[6]));
    let cumret_b = f64_values(&result.frame, CUMRET_APPROX_B).unwrap();
    let official = f64_values(&result.frame, SP500_CUMRET).unwrap();
    assert_relative_eq!(cumret_b[0].unwrap(), 1.0);
    assert_relative_eq!(official[0].unwrap(), 1.0);
    assert_eq!(result.tracking.len(), 2);
    assert_eq!(result.stats("B").unwrap().observations, 5);
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_membership_starting_after_first_stock_date() {
    let dates = [
        date(2019, 1, 31),
        date(2019, 2, 28),
        date(2019, 3, 29),
        date(2019, 4, 30),
        date(2019, 5, 31),
    ];
    let prices = [10.0, 10.0, 11.0, 11.0, 11.0];
    let returns = [None, Some(0.0), Some(0.1), Some(0.0), Some(0.0)];
    let stocks = dates
        .iter()
        .zip(prices.iter().zip(returns))
        .map(|(d, (p, r))| StockObservation::new(1, *d, *p, 100.0, r))
        .collect();
    let index = dates
        .iter()
        .map(|d| IndexObservation::new(*d, 100.0, Some(0.0)))
        .collect();
    let data = MarketData::new(
        vec![MembershipRecord::new(1, 500, date(2019, 2, 15), None, "Y")],
        stocks,
        index,
    )
    .unwrap();

    let result =
        create_index_approximations(&data, DateWindow::unbounded(), RebalanceFrequency::Quarterly)
            .unwrap();
    assert_eq!(result.start, Some(date(2019, 2, 28)));

    let ret_a = f64_values(&result.frame, RET_APPROX_A).unwrap();
    let ret_b = f64_values(&result.frame, RET_APPROX_B).unwrap();
    assert_relative_eq!(ret_a[1].unwrap(), 0.1, epsilon = 1e-12);
    assert_relative_eq!(ret_b[1].unwrap(), 0.1, epsilon = 1e-12);

    let level_a = f64_values(&result.frame, LEVEL_APPROX_A).unwrap();
    let level_b = f64_values(&result.frame, LEVEL_APPROX_B).unwrap();
    assert_eq!(level_b.len(), 4);
    for (a, b) in level_a.iter().zip(&level_b) {
        assert_relative_eq!(a.unwrap(), b.unwrap(), epsilon = 1e-9);
    }
    assert_relative_eq!(level_b[3].unwrap(), 110.0, epsilon = 1e-9);
}

#[test]
fn test_date_without_market_caps_leaves_a_gap() {
    let dates = [
        date(2019, 1, 31),
        date(2019, 2, 28),
        date(2019, 3, 29),
        date(2019, 4, 30),
    ];
    let mut stocks = Vec::new();
    for (i, d) in dates.iter().enumerate() {
        for permno in [1, 2] {
            let mut obs = StockObservation::new(permno, *d, 10.0 + i as f64, 100.0, Some(0.0));
            if i == 2 {
                obs.prc = None;
            }
            stocks.push(obs);
        }
    }
    let index = dates
        .iter()
        .map(|d| IndexObservation::new(*d, 500.0, Some(0.0)))
        .collect();
    let data = MarketData::new(
        vec![
            MembershipRecord::new(1, 500, date(2019, 1, 1), None, "Y"),
            MembershipRecord::new(2, 500, date(2019, 1, 1), None, "Y"),
        ],
        stocks,
        index,
    )
    .unwrap();

    let result =
        create_index_approximations(&data, DateWindow::unbounded(), RebalanceFrequency::Monthly)
            .unwrap();
    let caps = f64_values(&result.frame, SP500_MARKET_CAP).unwrap();
    let levels = f64_values(&result.frame, LEVEL_APPROX_A).unwrap();
    let returns = f64_values(&result.frame, RET_APPROX_A).unwrap();

    assert_eq!(caps[2], None);
    assert_eq!(levels[2], None);
    assert_eq!(returns[2], None);
    assert_eq!(returns[3], None);
    assert!(returns.iter().flatten().all(|r| r.is_finite()));

    // The level resumes from the chain, not from the gap.
    assert_relative_eq!(levels[3].unwrap(), 500.0 * 13.0 / 10.0, epsilon = 1e-9);
    assert_eq!(result.stats("A").unwrap().observations, 1);
}
