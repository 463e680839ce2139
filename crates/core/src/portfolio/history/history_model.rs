use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::WEIGHT_DECIMAL_PRECISION;
use crate::utils::time_utils::find_by_date;
use crate::warnings::DataQualityWarning;

/// Label of the cash plug in allocation views.
pub const CASH_SYMBOL: &str = "CASH";

/// Ground-truth quantities observed today, keyed by internal instrument id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsSnapshot {
    pub quantities: BTreeMap<String, Decimal>,
}

impl HoldingsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, instrument_id: &str, quantity: Decimal) -> Self {
        *self
            .quantities
            .entry(instrument_id.to_string())
            .or_insert(Decimal::ZERO) += quantity;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

/// Reconstructed state of the account on one day, keyed by ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalHoldingsRow {
    pub date: NaiveDate,
    pub quantities: BTreeMap<String, Decimal>,
    /// `quantity x price x fx`, in the base currency
    pub valuations: BTreeMap<String, Decimal>,
    /// Ledger asset minus instrument valuations, floored at zero.
    /// `None` when no ledger was available.
    pub cash: Option<Decimal>,
    /// The plug before the zero floor
    pub unclamped_cash: Option<Decimal>,
}

impl HistoricalHoldingsRow {
    pub fn invested_value(&self) -> Decimal {
        self.valuations.values().copied().sum()
    }

    pub fn total_value(&self) -> Decimal {
        self.invested_value() + self.cash.unwrap_or(Decimal::ZERO)
    }
}

/// One line of an allocation view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    pub symbol: String,
    pub quantity: Option<Decimal>,
    pub value: Decimal,
    /// Percent of the day's total, rounded for display
    pub weight: Decimal,
}

/// Daily valuation table over the reconstruction horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalHoldingsTable {
    /// Ticker columns, sorted
    pub tickers: Vec<String>,
    pub rows: Vec<HistoricalHoldingsRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DataQualityWarning>,
}

impl HistoricalHoldingsTable {
    pub fn empty(warnings: Vec<DataQualityWarning>) -> Self {
        Self {
            tickers: Vec::new(),
            rows: Vec::new(),
            warnings,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&HistoricalHoldingsRow> {
        find_by_date(&self.rows, date, |r| r.date)
    }

    /// Strictly positive holdings and cash on `date`, largest first, with
    /// their weight in percent of the day's total.
    pub fn allocation_on(&self, date: NaiveDate) -> Vec<AllocationEntry> {
        let Some(row) = self.get(date) else {
            return Vec::new();
        };

        let mut entries: Vec<AllocationEntry> = row
            .valuations
            .iter()
            .filter(|(_, value)| **value > Decimal::ZERO)
            .map(|(ticker, value)| AllocationEntry {
                symbol: ticker.clone(),
                quantity: row.quantities.get(ticker).copied(),
                value: *value,
                weight: Decimal::ZERO,
            })
            .collect();
        if let Some(cash) = row.cash.filter(|c| *c > Decimal::ZERO) {
            entries.push(AllocationEntry {
                symbol: CASH_SYMBOL.to_string(),
                quantity: None,
                value: cash,
                weight: Decimal::ZERO,
            });
        }

        let total: Decimal = entries.iter().map(|e| e.value).sum();
        if total > Decimal::ZERO {
            for entry in entries.iter_mut() {
                entry.weight = (entry.value / total * Decimal::ONE_HUNDRED)
                    .round_dp(WEIGHT_DECIMAL_PRECISION);
            }
        }
        entries.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.symbol.cmp(&b.symbol)));
        entries
    }

    /// Allocation on the most recent day: current holdings plus the cash plug.
    pub fn latest_allocation(&self) -> Vec<AllocationEntry> {
        match self.end_date() {
            Some(date) => self.allocation_on(date),
            None => Vec::new(),
        }
    }
}
