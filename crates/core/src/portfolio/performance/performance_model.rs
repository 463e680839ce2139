use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::time_utils::find_by_date;
use crate::warnings::DataQualityWarning;

/// Return and risk figures for one ledger day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub date: NaiveDate,
    pub daily_return: Decimal,
    pub cumulative_twr: Decimal,
    /// Growth of one unit since the start of the series
    pub wealth_index: Decimal,
    /// Distance below the running wealth peak, always <= 0
    pub drawdown: Decimal,
}

/// Period statistics of a performance series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub period_start_date: Option<NaiveDate>,
    pub period_end_date: Option<NaiveDate>,
    pub cumulative_twr: Decimal,
    pub annualized_twr: Decimal,
    /// Money-weighted return; `None` when the solver gave no usable rate
    pub mwr: Option<Decimal>,
    pub max_drawdown: Decimal,
    pub volatility: Decimal,
    pub gain_loss_amount: Decimal,
    pub net_flow: Decimal,
}

impl PerformanceSummary {
    pub fn empty() -> Self {
        Self {
            period_start_date: None,
            period_end_date: None,
            cumulative_twr: Decimal::ZERO,
            annualized_twr: Decimal::ZERO,
            mwr: None,
            max_drawdown: Decimal::ZERO,
            volatility: Decimal::ZERO,
            gain_loss_amount: Decimal::ZERO,
            net_flow: Decimal::ZERO,
        }
    }
}

/// Per-day records, one per ledger day, plus the period summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSeries {
    pub records: Vec<PerformanceRecord>,
    pub summary: PerformanceSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DataQualityWarning>,
}

impl PerformanceSeries {
    pub fn empty(warnings: Vec<DataQualityWarning>) -> Self {
        Self {
            records: Vec::new(),
            summary: PerformanceSummary::empty(),
            warnings,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&PerformanceRecord> {
        find_by_date(&self.records, date, |r| r.date)
    }

    pub fn last(&self) -> Option<&PerformanceRecord> {
        self.records.last()
    }
}
