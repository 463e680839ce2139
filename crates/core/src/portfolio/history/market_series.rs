//! Bounded-concurrency retrieval of price and FX series from a [`PriceOracle`].

use chrono::NaiveDate;
use futures::future::join_all;
use log::debug;
use std::collections::BTreeMap;
use std::time::Instant;

use ledgerfolio_market_data::{MarketDataError, PriceOracle, Quote};

use crate::series::DailySeries;
use crate::warnings::{DataQualityWarning, WarningKind};

/// What a requested symbol is used for. Decides the warning kind on a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Price,
    Fx,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub symbol: String,
    pub kind: SeriesKind,
}

impl SeriesRequest {
    pub fn price(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind: SeriesKind::Price,
        }
    }

    pub fn fx(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind: SeriesKind::Fx,
        }
    }
}

/// Fetched series keyed by symbol. Symbols with no usable data are absent.
#[derive(Debug, Clone, Default)]
pub struct MarketSeries {
    pub series: BTreeMap<String, DailySeries>,
    pub warnings: Vec<DataQualityWarning>,
}

impl MarketSeries {
    pub fn get(&self, symbol: &str) -> Option<&DailySeries> {
        self.series.get(symbol)
    }
}

/// Fetches every request over `[start, end]`, `concurrency` calls at a time.
///
/// A failed or empty series only costs that symbol: it becomes a warning and
/// the rest are still returned. Results are merged by symbol, so the output
/// does not depend on completion order.
pub async fn fetch_market_series(
    oracle: &dyn PriceOracle,
    requests: &[SeriesRequest],
    start: NaiveDate,
    end: NaiveDate,
    concurrency: usize,
) -> MarketSeries {
    let started = Instant::now();
    let mut out = MarketSeries::default();

    for chunk in requests.chunks(concurrency.max(1)) {
        let futures: Vec<_> = chunk
            .iter()
            .map(|request| async move {
                let result = oracle
                    .get_historical_quotes(&request.symbol, start, end)
                    .await;
                (request, result)
            })
            .collect();

        for (request, result) in join_all(futures).await {
            match into_series(request, result, oracle.id()) {
                Ok(series) => {
                    out.series.insert(request.symbol.clone(), series);
                }
                Err(warning) => out.warnings.push(warning),
            }
        }
    }

    debug!(
        "Fetched {}/{} series from {} in {:?}",
        out.series.len(),
        requests.len(),
        oracle.id(),
        started.elapsed()
    );
    out
}

fn into_series(
    request: &SeriesRequest,
    result: Result<Vec<Quote>, MarketDataError>,
    oracle_id: &str,
) -> Result<DailySeries, DataQualityWarning> {
    let missing_kind = match request.kind {
        SeriesKind::Price => WarningKind::MissingPriceSeries,
        SeriesKind::Fx => WarningKind::MissingFxSeries,
    };

    match result {
        Ok(quotes) => {
            let series: DailySeries = quotes.into_iter().map(|q| (q.date, q.close)).collect();
            if series.is_empty() {
                Err(DataQualityWarning::new(
                    missing_kind,
                    request.symbol.as_str(),
                    format!("{} returned no observations, valued at zero", oracle_id),
                ))
            } else {
                Ok(series)
            }
        }
        Err(e) if e.is_missing_data() => Err(DataQualityWarning::new(
            missing_kind,
            request.symbol.as_str(),
            format!("{}, valued at zero", e),
        )),
        Err(e) => Err(DataQualityWarning::new(
            WarningKind::OracleFailure,
            request.symbol.as_str(),
            format!("{} failed: {}", oracle_id, e),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ledgerfolio_market_data::ManualOracle;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    /// Fails every symbol listed in `broken` and counts calls.
    struct FlakyOracle {
        inner: ManualOracle,
        broken: Vec<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceOracle for FlakyOracle {
        fn id(&self) -> &'static str {
            "FLAKY"
        }

        async fn get_historical_quotes(
            &self,
            symbol: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<Quote>, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken.contains(&symbol) {
                return Err(MarketDataError::Timeout {
                    provider: "FLAKY".to_string(),
                });
            }
            self.inner.get_historical_quotes(symbol, start, end).await
        }
    }

    fn oracle() -> FlakyOracle {
        let inner = ManualOracle::new()
            .with_series("AAPL", "USD", &[(d(1), dec!(170)), (d(3), dec!(172))])
            .with_series("005930.KS", "KRW", &[(d(2), dec!(80000))])
            .with_series("USDKRW=X", "KRW", &[(d(1), dec!(1350))])
            .with_empty_series("DELISTED");
        FlakyOracle {
            inner,
            broken: vec!["MSFT"],
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_symbol() {
        let oracle = oracle();
        let requests = vec![
            SeriesRequest::price("MSFT"),
            SeriesRequest::price("AAPL"),
            SeriesRequest::price("DELISTED"),
            SeriesRequest::price("UNKNOWN"),
            SeriesRequest::fx("USDKRW=X"),
            SeriesRequest::fx("JPYKRW=X"),
            SeriesRequest::price("005930.KS"),
        ];
        let fetched = fetch_market_series(&oracle, &requests, d(1), d(5), 2).await;

        assert_eq!(oracle.calls.load(Ordering::SeqCst), requests.len());
        let symbols: Vec<&str> = fetched.series.keys().map(String::as_str).collect();
        assert_eq!(symbols, vec!["005930.KS", "AAPL", "USDKRW=X"]);

        let kinds: Vec<(WarningKind, &str)> = fetched
            .warnings
            .iter()
            .map(|w| (w.kind, w.subject.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (WarningKind::OracleFailure, "MSFT"),
                (WarningKind::MissingPriceSeries, "DELISTED"),
                (WarningKind::MissingPriceSeries, "UNKNOWN"),
                (WarningKind::MissingFxSeries, "JPYKRW=X"),
            ]
        );
    }

    #[tokio::test]
    async fn test_result_does_not_depend_on_request_order_or_batch_size() {
        let oracle = oracle();
        let forward = vec![SeriesRequest::price("AAPL"), SeriesRequest::price("005930.KS")];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();

        let a = fetch_market_series(&oracle, &forward, d(1), d(5), 1).await;
        let b = fetch_market_series(&oracle, &reversed, d(1), d(5), 10).await;
        assert_eq!(a.series, b.series);
        assert_eq!(a.get("AAPL").unwrap().get(d(3)), Some(dec!(172)));
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_fetches() {
        let oracle = oracle();
        let fetched =
            fetch_market_series(&oracle, &[SeriesRequest::price("AAPL")], d(1), d(5), 0).await;
        assert_eq!(fetched.series.len(), 1);
    }
}
