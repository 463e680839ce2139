use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::Arc;

use ledgerfolio_market_data::{ManualOracle, PriceOracle};

use super::*;
use crate::activities::{TransactionCategory, TransactionRecord};
use crate::errors::{CalculatorError, Error};
use crate::portfolio::history::HoldingsSnapshot;
use crate::portfolio::ledger::BalanceAnchor;
use crate::settings::{InstrumentMapping, PipelineSettings};
use crate::warnings::{count_of, WarningKind};

const SAMSUNG: &str = "KR7005930003";

fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

fn settings() -> PipelineSettings {
    let mut settings = PipelineSettings {
        as_of: Some(d(2, 2)),
        ..PipelineSettings::default()
    };
    settings
        .instruments
        .insert(SAMSUNG.to_string(), InstrumentMapping::new("005930.KS", "KRW"));
    settings
}

fn oracle() -> Arc<dyn PriceOracle> {
    Arc::new(
        ManualOracle::new()
            .with_series("005930.KS", "KRW", &[(d(1, 10), dec!(70000)), (d(1, 31), dec!(75000))])
            .with_series("SPY", "USD", &[(d(1, 2), dec!(475)), (d(2, 2), dec!(494))])
            .with_series("QQQ", "USD", &[(d(1, 2), dec!(400))]),
    )
}

fn inputs() -> PipelineInputs {
    PipelineInputs {
        transactions: vec![
            TransactionRecord::cash(d(1, 1), TransactionCategory::Deposit, dec!(1000000), "KRW"),
            TransactionRecord::trade(
                d(1, 10),
                TransactionCategory::Buy,
                SAMSUNG,
                dec!(10),
                dec!(700000),
                "KRW",
            ),
            TransactionRecord::cash(d(1, 15), TransactionCategory::Deposit, dec!(200000), "KRW"),
        ],
        anchors: vec![
            BalanceAnchor::new(d(1, 1), dec!(1000000)),
            BalanceAnchor::new(d(1, 31), dec!(1300000)),
        ],
        holdings: Some(HoldingsSnapshot::new().with_position(SAMSUNG, dec!(10))),
    }
}

#[tokio::test]
async fn test_full_run_produces_aligned_tables() {
    let pipeline = PortfolioPipeline::new(settings(), oracle()).unwrap();
    let report = pipeline.run(&inputs()).await.unwrap();

    assert_eq!(report.ledger.len(), 33);
    assert_eq!(report.performance.len(), report.ledger.len());
    assert_eq!(report.holdings.len(), 33);
    assert_eq!(report.ledger.asset_on(d(1, 31)), Some(dec!(1300000)));

    // Flows-only tail after the last anchor
    assert_eq!(report.ledger.asset_on(d(2, 2)), Some(dec!(1300000)));

    for row in &report.holdings.rows {
        assert_eq!(row.total_value(), report.ledger.asset_on(row.date).unwrap());
    }
    assert_eq!(
        report.holdings.get(d(2, 2)).unwrap().valuations["005930.KS"],
        dec!(750000)
    );
    assert!(report.performance.summary.mwr.is_some());
    assert!(!report.has_warnings());
}

#[tokio::test]
async fn test_missing_anchors_fail_the_run() {
    let pipeline = PortfolioPipeline::new(settings(), oracle()).unwrap();
    let mut inputs = inputs();
    inputs.anchors.clear();

    let err = pipeline.run(&inputs).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Calculation(CalculatorError::NoBalanceAnchors)
    ));
}

#[tokio::test]
async fn test_missing_holdings_only_skips_reconstruction() {
    let pipeline = PortfolioPipeline::new(settings(), oracle()).unwrap();
    let mut inputs = inputs();
    inputs.holdings = None;

    let report = pipeline.run(&inputs).await.unwrap();
    assert!(report.holdings.is_empty());
    assert_eq!(report.performance.len(), 33);
    assert_eq!(count_of(&report.warnings, WarningKind::MissingInput), 1);
}

#[tokio::test]
async fn test_runs_are_idempotent() {
    let pipeline = PortfolioPipeline::new(settings(), oracle()).unwrap();
    let first = pipeline.run(&inputs()).await.unwrap();
    let second = pipeline.run(&inputs()).await.unwrap();

    assert_eq!(first.ledger, second.ledger);
    assert_eq!(first.performance, second.performance);
    assert_eq!(first.holdings, second.holdings);
}

#[tokio::test]
async fn test_unmapped_instrument_degrades_with_warning() {
    let mut settings = settings();
    settings.instruments.clear();
    let pipeline = PortfolioPipeline::new(settings, oracle()).unwrap();

    let report = pipeline.run(&inputs()).await.unwrap();
    assert!(report.holdings.tickers.is_empty());
    assert_eq!(report.holdings.len(), 33);
    // All value sits in the cash plug
    assert_eq!(
        report.holdings.get(d(1, 31)).unwrap().cash,
        Some(dec!(1300000))
    );
    assert_eq!(count_of(&report.warnings, WarningKind::UnmappedInstrument), 1);
}

#[test]
fn test_invalid_settings_are_rejected() {
    let settings = PipelineSettings {
        fetch_concurrency: 0,
        ..PipelineSettings::default()
    };
    assert!(PortfolioPipeline::new(settings, oracle()).is_err());
}

#[tokio::test]
async fn test_benchmarks_over_performance_period() {
    let pipeline = PortfolioPipeline::new(settings(), oracle()).unwrap();
    let report = pipeline.run(&inputs()).await.unwrap();
    let comparison = pipeline.compare_benchmarks(&report.performance).await.unwrap();

    let spy = comparison.get("SPY").unwrap();
    assert_eq!(spy.points.len(), 33);
    assert_eq!(spy.total_return(), Some(dec!(0.04)));
    assert!(comparison.get("QQQ").is_some());
    assert_eq!(comparison.warnings.len(), 1);
    assert_eq!(comparison.warnings[0].subject, "IWM");
}
