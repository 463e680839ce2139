//! Core error types for Ledgerfolio.
//!
//! Only structural failures travel as `Err`. Degraded-but-usable conditions
//! (unmapped instruments, empty price series, solver non-convergence) are
//! reported as [`DataQualityWarning`](crate::warnings::DataQualityWarning)s
//! next to a successful result.

use chrono::NaiveDate;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engines.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Calculation failed: {0}")]
    Calculation(#[from] CalculatorError),
}

/// Errors that occur inside a computation stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculatorError {
    #[error("At least one balance anchor is required to build the daily ledger")]
    NoBalanceAnchors,

    #[error("Invalid window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
}

/// Validation errors for configuration and parsed input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown transaction category '{0}'")]
    UnknownCategory(String),

    #[error("Daily rows must be contiguous: expected {expected}, found {found}")]
    NonContiguousDays { expected: NaiveDate, found: NaiveDate },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::ConfigParse(err))
    }
}
