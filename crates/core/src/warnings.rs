//! Data-quality warnings recorded next to successful stage results.

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of degradation a warning describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    /// Several anchors on the same date; only the last one was kept
    DuplicateAnchor,
    /// Instrument id has no ticker in the instrument map
    UnmappedInstrument,
    /// Oracle returned no usable prices for a ticker
    MissingPriceSeries,
    /// Oracle returned no usable rates for a currency pair
    MissingFxSeries,
    /// Oracle call failed for a reason other than missing data
    OracleFailure,
    /// Pre-clamp cash plug went below zero
    NegativeCashPlug,
    /// A stage input was absent; the stage returned an empty result
    MissingInput,
    /// IRR solver did not produce a usable rate
    NumericalNonConvergence,
    /// Transaction dated after the valuation date
    FutureTransaction,
}

/// A degraded-but-usable condition found while computing a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityWarning {
    pub kind: WarningKind,
    /// Instrument id, ticker, currency pair or stage the warning is about
    pub subject: String,
    pub date: Option<NaiveDate>,
    pub message: String,
}

impl DataQualityWarning {
    /// Creates the warning and emits it through the `log` facade.
    pub fn new(kind: WarningKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        let warning = Self {
            kind,
            subject: subject.into(),
            date: None,
            message: message.into(),
        };
        warn!("{}", warning);
        warning
    }

    /// Same as [`DataQualityWarning::new`] but pinned to a date.
    pub fn on_date(
        kind: WarningKind,
        subject: impl Into<String>,
        date: NaiveDate,
        message: impl Into<String>,
    ) -> Self {
        let warning = Self {
            kind,
            subject: subject.into(),
            date: Some(date),
            message: message.into(),
        };
        warn!("{}", warning);
        warning
    }
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => write!(
                f,
                "{:?} [{}] on {}: {}",
                self.kind, self.subject, date, self.message
            ),
            None => write!(f, "{:?} [{}]: {}", self.kind, self.subject, self.message),
        }
    }
}

/// Counts warnings of a given kind.
pub fn count_of(warnings: &[DataQualityWarning], kind: WarningKind) -> usize {
    warnings.iter().filter(|w| w.kind == kind).count()
}
