use serde::{Deserialize, Serialize};

use crate::activities::TransactionRecord;
use crate::portfolio::history::{HistoricalHoldingsTable, HoldingsSnapshot};
use crate::portfolio::ledger::{BalanceAnchor, DailyLedger};
use crate::portfolio::performance::PerformanceSeries;
use crate::warnings::DataQualityWarning;

/// Normalized inputs of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInputs {
    pub transactions: Vec<TransactionRecord>,
    pub anchors: Vec<BalanceAnchor>,
    /// Today's holdings; without it only the reconstruction is skipped
    pub holdings: Option<HoldingsSnapshot>,
}

/// Every table of a run plus all warnings raised along the way.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub ledger: DailyLedger,
    pub performance: PerformanceSeries,
    pub holdings: HistoricalHoldingsTable,
    pub warnings: Vec<DataQualityWarning>,
}

impl PipelineReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
