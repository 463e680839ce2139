use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashSet;

use ledgerfolio_market_data::PriceOracle;

use super::benchmark_model::{BenchmarkComparison, BenchmarkPoint, BenchmarkSeries};
use crate::constants::DEFAULT_FETCH_CONCURRENCY;
use crate::errors::{CalculatorError, Result};
use crate::portfolio::history::{fetch_market_series, SeriesRequest};
use crate::series::FillPolicy;
use crate::utils::time_utils::get_days_between;
use crate::warnings::{DataQualityWarning, WarningKind};

/// Builds benchmark return series aligned to every calendar day of a window.
#[derive(Debug, Clone)]
pub struct BenchmarkService {
    fetch_concurrency: usize,
}

impl Default for BenchmarkService {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_CONCURRENCY)
    }
}

impl BenchmarkService {
    pub fn new(fetch_concurrency: usize) -> Self {
        Self {
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    /// Fetches each ticker, fills weekends and holidays forward then
    /// backward, and rebases to the first day of the window.
    pub async fn compare(
        &self,
        oracle: &dyn PriceOracle,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BenchmarkComparison> {
        if start > end {
            return Err(CalculatorError::InvalidWindow { start, end }.into());
        }

        // Repeated tickers are fetched and reported once, first occurrence wins
        let mut seen = HashSet::new();
        let tickers: Vec<&String> = tickers.iter().filter(|t| seen.insert(*t)).collect();

        let requests: Vec<SeriesRequest> = tickers.iter().map(|t| SeriesRequest::price(t)).collect();
        let fetched = fetch_market_series(oracle, &requests, start, end, self.fetch_concurrency).await;
        let mut warnings = fetched.warnings.clone();
        let days = get_days_between(start, end);

        let mut benchmarks = Vec::with_capacity(tickers.len());
        for ticker in tickers.iter().copied() {
            let Some(series) = fetched.get(ticker) else {
                continue;
            };
            let closes = series.align(start, end, FillPolicy::ForwardThenBackward);
            let base = match closes.first().copied().flatten() {
                Some(base) if !base.is_zero() => base,
                _ => {
                    warnings.push(DataQualityWarning::new(
                        WarningKind::MissingPriceSeries,
                        ticker.as_str(),
                        "no usable first close in the window, benchmark skipped",
                    ));
                    continue;
                }
            };

            let points = days
                .iter()
                .zip(closes)
                .filter_map(|(date, close)| {
                    close.map(|close| BenchmarkPoint {
                        date: *date,
                        close,
                        cumulative_return: close / base - Decimal::ONE,
                    })
                })
                .collect();
            benchmarks.push(BenchmarkSeries {
                ticker: ticker.clone(),
                points,
            });
        }

        debug!(
            "Benchmarks {}..={}: {} of {} tickers available",
            start,
            end,
            benchmarks.len(),
            tickers.len()
        );

        Ok(BenchmarkComparison {
            benchmarks,
            warnings,
        })
    }
}

/// Portfolio return in excess of the benchmark over the same window.
pub fn excess_return(portfolio_twr: Decimal, benchmark: &BenchmarkSeries) -> Option<Decimal> {
    benchmark.total_return().map(|b| portfolio_twr - b)
}
