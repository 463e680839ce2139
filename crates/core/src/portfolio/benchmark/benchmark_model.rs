use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::warnings::DataQualityWarning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkPoint {
    pub date: NaiveDate,
    pub close: Decimal,
    /// `close / first close - 1`
    pub cumulative_return: Decimal,
}

/// Rebased daily series of one benchmark ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkSeries {
    pub ticker: String,
    pub points: Vec<BenchmarkPoint>,
}

impl BenchmarkSeries {
    /// Cumulative return over the whole window.
    pub fn total_return(&self) -> Option<Decimal> {
        self.points.last().map(|p| p.cumulative_return)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&BenchmarkPoint> {
        let start = self.points.first()?.date;
        let offset = (date - start).num_days();
        if offset < 0 {
            return None;
        }
        self.points.get(offset as usize)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    /// In the order the tickers were requested; tickers without data are absent
    pub benchmarks: Vec<BenchmarkSeries>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DataQualityWarning>,
}

impl BenchmarkComparison {
    pub fn get(&self, ticker: &str) -> Option<&BenchmarkSeries> {
        self.benchmarks.iter().find(|b| b.ticker == ticker)
    }
}
