use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Daily closing observation for a symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Trading date of the close
    pub date: NaiveDate,

    /// Closing price (or FX rate for currency pair symbols)
    pub close: Decimal,

    /// Quote currency
    pub currency: String,

    /// Source of the quote (MANUAL, YAHOO, ...)
    pub source: String,
}

impl Quote {
    /// Create a new quote with all required fields
    pub fn new(date: NaiveDate, close: Decimal, currency: String, source: String) -> Self {
        Self {
            date,
            close,
            currency,
            source,
        }
    }
}
