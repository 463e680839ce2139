use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::series::DailySeries;
use crate::utils::time_utils::ensure_contiguous_days;
use crate::warnings::DataQualityWarning;

/// An independently observed balance of the whole account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAnchor {
    pub date: NaiveDate,
    pub net_asset_value: Decimal,
}

impl BalanceAnchor {
    pub fn new(date: NaiveDate, net_asset_value: Decimal) -> Self {
        Self {
            date,
            net_asset_value,
        }
    }
}

/// One calendar day of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerDay {
    pub date: NaiveDate,
    /// Present only on anchor dates
    pub anchor_value: Option<Decimal>,
    /// Net external cash movement of the day
    pub external_flow: Decimal,
    pub calculated_asset: Decimal,
}

/// Contiguous, gap-free daily ledger.
///
/// Day `i` is `start + i`, so lookups by date are index arithmetic.
/// Deserialization rejects day vectors that break this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredLedger")]
pub struct DailyLedger {
    days: Vec<LedgerDay>,
}

#[derive(Deserialize)]
struct StoredLedger {
    days: Vec<LedgerDay>,
}

impl TryFrom<StoredLedger> for DailyLedger {
    type Error = ValidationError;

    fn try_from(stored: StoredLedger) -> Result<Self, Self::Error> {
        Self::try_from_days(stored.days)
    }
}

impl DailyLedger {
    /// Wraps a day vector that is already contiguous and ascending.
    pub(crate) fn from_days(days: Vec<LedgerDay>) -> Self {
        Self { days }
    }

    /// Wraps a day vector after checking it is contiguous and ascending.
    pub fn try_from_days(days: Vec<LedgerDay>) -> Result<Self, ValidationError> {
        ensure_contiguous_days(days.iter().map(|d| d.date))?;
        Ok(Self { days })
    }

    pub fn days(&self) -> &[LedgerDay] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|d| d.date)
    }

    /// Position of `date` in the day array.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let start = self.start_date()?;
        let offset = (date - start).num_days();
        if offset < 0 || offset as usize >= self.days.len() {
            return None;
        }
        Some(offset as usize)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&LedgerDay> {
        self.index_of(date).map(|i| &self.days[i])
    }

    pub fn asset_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.get(date).map(|d| d.calculated_asset)
    }

    /// Days in `[start, end]` clipped to the ledger range.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> &[LedgerDay] {
        let (Some(first), Some(last)) = (self.start_date(), self.end_date()) else {
            return &[];
        };
        let start = start.max(first);
        let end = end.min(last);
        match (self.index_of(start), self.index_of(end)) {
            (Some(i), Some(j)) if i <= j => &self.days[i..=j],
            _ => &[],
        }
    }

    /// Calculated assets as a sparse series, for joins with a fill policy.
    pub fn asset_series(&self) -> DailySeries {
        self.days
            .iter()
            .map(|d| (d.date, d.calculated_asset))
            .collect()
    }

    pub fn latest_asset(&self) -> Option<Decimal> {
        self.days.last().map(|d| d.calculated_asset)
    }
}

/// Ledger plus the warnings found while building it.
#[derive(Debug, Clone)]
pub struct LedgerBuildResult {
    pub ledger: DailyLedger,
    pub warnings: Vec<DataQualityWarning>,
}

impl LedgerBuildResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
