use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use ledgerfolio_market_data::{fx_symbol, PriceOracle};

use super::history_model::{HistoricalHoldingsRow, HistoricalHoldingsTable, HoldingsSnapshot};
use super::market_series::{fetch_market_series, MarketSeries, SeriesRequest};
use super::quantity_walk::reverse_accumulate;
use crate::activities::TransactionRecord;
use crate::constants::DEFAULT_FETCH_CONCURRENCY;
use crate::portfolio::ledger::DailyLedger;
use crate::series::FillPolicy;
use crate::settings::{InstrumentMap, PipelineSettings};
use crate::utils::time_utils::get_days_between;
use crate::warnings::{DataQualityWarning, WarningKind};

/// Quantities for one ticker over the horizon.
#[derive(Debug, Clone, PartialEq)]
struct TickerPositions {
    currency: String,
    quantities: Vec<Decimal>,
}

/// Everything the reconstruction needs that does not depend on market data
/// or the ledger: horizon, per-ticker quantities and the symbols to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionPlan {
    /// `None` when there is nothing to reconstruct
    horizon: Option<(NaiveDate, NaiveDate)>,
    positions: BTreeMap<String, TickerPositions>,
    requests: Vec<SeriesRequest>,
    warnings: Vec<DataQualityWarning>,
}

impl ReconstructionPlan {
    pub fn horizon(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.horizon
    }

    pub fn tickers(&self) -> Vec<String> {
        self.positions.keys().cloned().collect()
    }

    /// Reconstructed quantities of `ticker`, one per horizon day.
    pub fn quantities(&self, ticker: &str) -> Option<&[Decimal]> {
        self.positions.get(ticker).map(|p| p.quantities.as_slice())
    }

    pub fn requests(&self) -> &[SeriesRequest] {
        &self.requests
    }

    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    pub(crate) fn empty(warnings: Vec<DataQualityWarning>) -> Self {
        Self {
            horizon: None,
            positions: BTreeMap::new(),
            requests: Vec::new(),
            warnings,
        }
    }
}

/// Rebuilds daily per-instrument holdings and valuations.
///
/// Work is split in three steps so the oracle fetch can overlap with other
/// stages: [`plan`](Self::plan) (pure), [`fetch`](Self::fetch) (I/O) and
/// [`assemble`](Self::assemble) (pure, needs the ledger for the cash plug).
#[derive(Debug, Clone)]
pub struct HoldingsReconstructor {
    instruments: InstrumentMap,
    base_currency: String,
    fetch_concurrency: usize,
    negative_cash_tolerance: Decimal,
}

impl HoldingsReconstructor {
    pub fn new(instruments: InstrumentMap, base_currency: &str) -> Self {
        Self {
            instruments,
            base_currency: base_currency.trim().to_uppercase(),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            negative_cash_tolerance: Decimal::ZERO,
        }
    }

    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::new(settings.instruments.clone(), &settings.base_currency)
            .with_fetch_concurrency(settings.fetch_concurrency)
            .with_negative_cash_tolerance(settings.negative_cash_tolerance)
    }

    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency.max(1);
        self
    }

    pub fn with_negative_cash_tolerance(mut self, tolerance: Decimal) -> Self {
        self.negative_cash_tolerance = tolerance.abs();
        self
    }

    /// Runs all three steps.
    pub async fn reconstruct(
        &self,
        transactions: &[TransactionRecord],
        snapshot: &HoldingsSnapshot,
        oracle: &dyn PriceOracle,
        ledger: Option<&DailyLedger>,
        as_of: NaiveDate,
    ) -> HistoricalHoldingsTable {
        let plan = self.plan(transactions, snapshot, as_of);
        let market = self.fetch(&plan, oracle).await;
        self.assemble(plan, market, ledger)
    }

    /// Maps instruments to tickers, sets the horizon and walks quantities
    /// backward from the snapshot.
    pub fn plan(
        &self,
        transactions: &[TransactionRecord],
        snapshot: &HoldingsSnapshot,
        as_of: NaiveDate,
    ) -> ReconstructionPlan {
        let mut warnings = Vec::new();

        let (current, future): (Vec<&TransactionRecord>, Vec<&TransactionRecord>) =
            transactions.iter().partition(|tx| tx.date <= as_of);
        if !future.is_empty() {
            warnings.push(DataQualityWarning::new(
                WarningKind::FutureTransaction,
                "transactions",
                format!("{} transaction(s) dated after {} ignored", future.len(), as_of),
            ));
        }

        let Some(start) = current.iter().map(|tx| tx.date).min() else {
            warnings.push(DataQualityWarning::new(
                WarningKind::MissingInput,
                "transactions",
                "no transactions on or before the valuation date, nothing to reconstruct",
            ));
            return ReconstructionPlan::empty(warnings);
        };
        let days = get_days_between(start, as_of);

        let mut unmapped: BTreeSet<String> = BTreeSet::new();
        let mut deltas: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();
        let mut currencies: BTreeMap<String, String> = BTreeMap::new();
        let mut terminals: BTreeMap<String, Decimal> = BTreeMap::new();

        for tx in current.iter().filter(|tx| tx.category.is_trade()) {
            let Some(instrument_id) = tx.instrument_id.as_deref() else {
                unmapped.insert(String::new());
                continue;
            };
            let Some(mapping) = self.instruments.get(instrument_id) else {
                unmapped.insert(instrument_id.to_string());
                continue;
            };
            let series = deltas
                .entry(mapping.ticker.clone())
                .or_insert_with(|| vec![Decimal::ZERO; days.len()]);
            let index = (tx.date - start).num_days() as usize;
            series[index] += tx.signed_quantity();
            currencies
                .entry(mapping.ticker.clone())
                .or_insert_with(|| mapping.currency.trim().to_uppercase());
        }

        for (instrument_id, quantity) in &snapshot.quantities {
            let Some(mapping) = self.instruments.get(instrument_id) else {
                unmapped.insert(instrument_id.clone());
                continue;
            };
            *terminals
                .entry(mapping.ticker.clone())
                .or_insert(Decimal::ZERO) += *quantity;
            currencies
                .entry(mapping.ticker.clone())
                .or_insert_with(|| mapping.currency.trim().to_uppercase());
        }

        for instrument_id in &unmapped {
            let subject = if instrument_id.is_empty() {
                "(no instrument id)"
            } else {
                instrument_id.as_str()
            };
            warnings.push(DataQualityWarning::new(
                WarningKind::UnmappedInstrument,
                subject,
                "no ticker mapping, excluded from reconstruction",
            ));
        }

        let mut positions = BTreeMap::new();
        for (ticker, currency) in currencies {
            let terminal = terminals.get(&ticker).copied().unwrap_or(Decimal::ZERO);
            let quantities = match deltas.get(&ticker) {
                Some(series) => reverse_accumulate(series, terminal),
                None => vec![terminal; days.len()],
            };
            positions.insert(
                ticker,
                TickerPositions {
                    currency,
                    quantities,
                },
            );
        }

        let mut requests: Vec<SeriesRequest> =
            positions.keys().map(|t| SeriesRequest::price(t)).collect();
        let fx_currencies: BTreeSet<&str> = positions
            .values()
            .map(|p| p.currency.as_str())
            .filter(|c| !c.eq_ignore_ascii_case(&self.base_currency))
            .collect();
        requests.extend(
            fx_currencies
                .into_iter()
                .map(|c| SeriesRequest::fx(&fx_symbol(c, &self.base_currency))),
        );

        debug!(
            "Reconstruction plan {}..={}: {} tickers, {} series to fetch",
            start,
            as_of,
            positions.len(),
            requests.len()
        );

        ReconstructionPlan {
            horizon: Some((start, as_of)),
            positions,
            requests,
            warnings,
        }
    }

    /// Fetches every price and FX series the plan needs.
    pub async fn fetch(&self, plan: &ReconstructionPlan, oracle: &dyn PriceOracle) -> MarketSeries {
        match plan.horizon {
            Some((start, end)) if !plan.requests.is_empty() => {
                fetch_market_series(oracle, &plan.requests, start, end, self.fetch_concurrency)
                    .await
            }
            _ => MarketSeries::default(),
        }
    }

    /// Values each day and reconciles against the ledger.
    pub fn assemble(
        &self,
        plan: ReconstructionPlan,
        market: MarketSeries,
        ledger: Option<&DailyLedger>,
    ) -> HistoricalHoldingsTable {
        let MarketSeries {
            series,
            warnings: market_warnings,
        } = market;
        let mut warnings = plan.warnings;
        warnings.extend(market_warnings);

        let Some((start, end)) = plan.horizon else {
            return HistoricalHoldingsTable::empty(warnings);
        };
        let days = get_days_between(start, end);

        // Per-ticker valuation columns; a missing price or FX series values at zero
        let mut valuations: BTreeMap<&str, Vec<Decimal>> = BTreeMap::new();
        for (ticker, position) in &plan.positions {
            let prices = series
                .get(ticker)
                .map(|s| s.align(start, end, FillPolicy::ForwardThenBackward));
            let fx_rates = if position.currency.eq_ignore_ascii_case(&self.base_currency) {
                Some(vec![Some(Decimal::ONE); days.len()])
            } else {
                series
                    .get(&fx_symbol(&position.currency, &self.base_currency))
                    .map(|s| s.align(start, end, FillPolicy::ForwardThenBackward))
            };

            let column = match (prices, fx_rates) {
                (Some(prices), Some(fx_rates)) => position
                    .quantities
                    .iter()
                    .zip(prices.iter().zip(fx_rates.iter()))
                    .map(|(qty, (price, fx))| match (price, fx) {
                        (Some(price), Some(fx)) => *qty * *price * *fx,
                        _ => Decimal::ZERO,
                    })
                    .collect(),
                _ => vec![Decimal::ZERO; days.len()],
            };
            valuations.insert(ticker.as_str(), column);
        }

        // Cash plug against the ledger, aligned with forward-then-backward fill
        let assets: Option<Vec<Option<Decimal>>> = match ledger {
            Some(ledger) if !ledger.is_empty() => Some(ledger.asset_series().align(
                start,
                end,
                FillPolicy::ForwardThenBackward,
            )),
            _ => {
                warnings.push(DataQualityWarning::new(
                    WarningKind::MissingInput,
                    "ledger",
                    "no ledger available, cash plug disabled",
                ));
                None
            }
        };

        let mut rows = Vec::with_capacity(days.len());
        let mut negative_days = 0usize;
        let mut worst: Option<(NaiveDate, Decimal)> = None;

        for (i, date) in days.iter().enumerate() {
            let mut row = HistoricalHoldingsRow {
                date: *date,
                quantities: plan
                    .positions
                    .iter()
                    .map(|(ticker, p)| (ticker.clone(), p.quantities[i]))
                    .collect(),
                valuations: valuations
                    .iter()
                    .map(|(ticker, column)| (ticker.to_string(), column[i]))
                    .collect(),
                cash: None,
                unclamped_cash: None,
            };

            if let Some(asset) = assets.as_ref().and_then(|a| a[i]) {
                let plug = asset - row.invested_value();
                if plug < -self.negative_cash_tolerance {
                    negative_days += 1;
                    if worst.map_or(true, |(_, value)| plug < value) {
                        worst = Some((*date, plug));
                    }
                }
                row.unclamped_cash = Some(plug);
                row.cash = Some(plug.max(Decimal::ZERO));
            }
            rows.push(row);
        }

        if let Some((worst_date, worst_value)) = worst {
            warnings.push(DataQualityWarning::on_date(
                WarningKind::NegativeCashPlug,
                "cash",
                worst_date,
                format!(
                    "cash plug negative on {} day(s), worst {} on {}; floored at zero \
                     (possible leverage, data error or FX mismatch)",
                    negative_days, worst_value, worst_date
                ),
            ));
        }

        HistoricalHoldingsTable {
            tickers: plan.positions.keys().cloned().collect(),
            rows,
            warnings,
        }
    }
}
