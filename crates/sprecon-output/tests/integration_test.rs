//! Integration tests for exporting a full reconstruction run.

use chrono::NaiveDate;
use sprecon_data::{IndexObservation, MarketData, MembershipRecord, StockObservation};
use sprecon_index::method_b::build_portfolio;
use sprecon_index::{DateWindow, RebalanceConfig, RebalanceFrequency, create_index_approximations};
use sprecon_output::{
    ComparisonSummary, ExportFormat, Exporter, ReportBuilder, SeriesExport, WeightsExport,
};
use std::fs;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_data() -> MarketData {
    let dates = [
        date(2019, 1, 31),
        date(2019, 2, 28),
        date(2019, 3, 29),
        date(2019, 4, 30),
    ];
    let constituents = vec![
        MembershipRecord::new(10107, 500, date(1994, 6, 7), None, "Y"),
        MembershipRecord::new(14593, 500, date(1982, 11, 30), None, "Y"),
    ];
    let mut stocks = Vec::new();
    let mut index = Vec::new();
    for (i, d) in dates.iter().enumerate() {
        let ret = (i > 0).then_some(0.01);
        let growth = 1.01_f64.powi(i as i32);
        stocks.push(StockObservation::new(10107, *d, 100.0 * growth, 7_600.0, ret));
        stocks.push(StockObservation::new(14593, *d, 170.0 * growth, 4_700.0, ret));
        index.push(IndexObservation::new(*d, 2704.10 * growth, ret));
    }
    MarketData::new(constituents, stocks, index).unwrap()
}

#[test]
fn test_full_export_workflow() {
    let data = sample_data();
    let result = create_index_approximations(
        &data,
        DateWindow::unbounded(),
        RebalanceFrequency::Quarterly,
    )
    .unwrap();

    let dir = std::env::temp_dir().join(format!("sprecon_output_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    let csv_path = dir.join("comparison.csv");
    SeriesExport::new("comparison", result.frame.clone())
        .export_to_file(&csv_path, ExportFormat::Csv)
        .unwrap();

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "date");
    assert!(headers.iter().any(|h| h == "level_approx_B"));
    assert_eq!(reader.records().count(), 4);

    let summary = ComparisonSummary::new("S&P 500", RebalanceFrequency::Quarterly, &result);
    let markdown = summary.to_markdown();
    assert!(markdown.contains("2019-01-31 to 2019-04-30"));
    // Every series grows 1% a month, so both methods match the index.
    assert!(summary.to_ascii_table().contains("1.0303"));

    let report_path = dir.join("report.json");
    ReportBuilder::new()
        .title("compare")
        .window(result.start, result.end)
        .contents(&summary)
        .unwrap()
        .build()
        .write(&report_path)
        .unwrap();
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["contents"]["frequency"], "quarterly");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_weights_export_from_portfolio() {
    let data = sample_data();
    let portfolio = build_portfolio(
        &data.constituents_frame().unwrap(),
        &data.stocks_frame().unwrap(),
        &RebalanceConfig::new(DateWindow::unbounded()),
    )
    .unwrap();

    let exports = WeightsExport::from_portfolio("method_b", &portfolio);
    assert_eq!(exports.len(), 2);
    for export in &exports {
        assert!((export.total_weight() - 1.0).abs() < 1e-12);
    }

    let csv = exports.export_to_string(ExportFormat::Csv).unwrap();
    assert_eq!(csv.lines().count(), 1 + 2 * 2);
}
