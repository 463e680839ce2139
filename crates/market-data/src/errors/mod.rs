//! Error types for oracle operations.

use thiserror::Error;

/// Errors that can occur while fetching market data from an oracle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// The requested symbol is unknown to the oracle.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The symbol exists but has no observations in the requested range.
    #[error("No data for {symbol} between {start} and {end}")]
    NoDataForRange {
        symbol: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// The request range is malformed (start after end).
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// The provider behind the oracle reported a failure.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The oracle did not answer in time.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },
}

impl MarketDataError {
    /// Returns true when the oracle answered but simply had nothing for the symbol.
    ///
    /// Callers treat these as an empty series rather than a failed fetch.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            MarketDataError::SymbolNotFound(_) | MarketDataError::NoDataForRange { .. }
        )
    }
}
