use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::errors::MarketDataError;
use crate::models::Quote;

use super::traits::PriceOracle;

const PROVIDER_ID: &str = "MANUAL";

/// Oracle over observations loaded up front.
///
/// Each symbol keeps its closes in a `BTreeMap` keyed by date, so range
/// queries are ordered and a re-inserted date overwrites the older value.
#[derive(Debug, Default, Clone)]
pub struct ManualOracle {
    series: HashMap<String, BTreeMap<NaiveDate, Quote>>,
}

impl ManualOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) one observation.
    pub fn insert(&mut self, symbol: &str, date: NaiveDate, close: Decimal, currency: &str) {
        let quote = Quote::new(date, close, currency.to_string(), PROVIDER_ID.to_string());
        self.series
            .entry(symbol.to_string())
            .or_default()
            .insert(date, quote);
    }

    /// Builder-style variant of [`ManualOracle::insert`] for a whole series.
    pub fn with_series(
        mut self,
        symbol: &str,
        currency: &str,
        observations: &[(NaiveDate, Decimal)],
    ) -> Self {
        for (date, close) in observations {
            self.insert(symbol, *date, *close, currency);
        }
        self
    }

    /// Registers a symbol with no observations at all.
    pub fn with_empty_series(mut self, symbol: &str) -> Self {
        self.series.entry(symbol.to_string()).or_default();
        self
    }
}

#[async_trait]
impl PriceOracle for ManualOracle {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Quote>, MarketDataError> {
        if start > end {
            return Err(MarketDataError::InvalidRange(format!(
                "{} is after {}",
                start, end
            )));
        }

        let history = self
            .series
            .get(symbol)
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        let quotes: Vec<Quote> = history.range(start..=end).map(|(_, q)| q.clone()).collect();
        debug!(
            "{}: {} observations for {} between {} and {}",
            PROVIDER_ID,
            quotes.len(),
            symbol,
            start,
            end
        );
        Ok(quotes)
    }
}
