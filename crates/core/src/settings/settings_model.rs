use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{DEFAULT_BASE_CURRENCY, DEFAULT_BENCHMARKS, DEFAULT_FETCH_CONCURRENCY};
use crate::errors::{Result, ValidationError};
use crate::utils::time_utils::valuation_date_today;

// ============================================================================
// Flow classification policy
// ============================================================================

/// Which categories count as external cash flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FlowPolicy {
    /// Deposits, withdrawals, dividends, interest and taxes
    #[default]
    Standard,
    /// Only deposits and withdrawals
    ContributionsOnly,
}

// ============================================================================
// IRR solver settings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IrrSettings {
    /// Starting rate for Newton iteration
    pub initial_guess: f64,
    pub max_iterations: u32,
    /// Convergence threshold on the step size
    pub tolerance: f64,
}

impl Default for IrrSettings {
    fn default() -> Self {
        Self {
            initial_guess: 0.1,
            max_iterations: 100,
            tolerance: 1e-10,
        }
    }
}

// ============================================================================
// Instrument identifier map
// ============================================================================

/// Ticker and trading currency for one internal security identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentMapping {
    pub ticker: String,
    pub currency: String,
}

impl InstrumentMapping {
    pub fn new(ticker: &str, currency: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            currency: currency.to_uppercase(),
        }
    }
}

/// Internal security identifier -> tradable ticker. Unmapped ids are excluded
/// from reconstruction.
pub type InstrumentMap = BTreeMap<String, InstrumentMapping>;

// ============================================================================
// Pipeline settings
// ============================================================================

/// Settings for a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSettings {
    /// Currency of the ledger and of every valuation
    pub base_currency: String,
    /// Valuation date. Falls back to today in the statement timezone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    pub flow_policy: FlowPolicy,
    /// Oracle requests issued per batch
    pub fetch_concurrency: usize,
    pub irr: IrrSettings,
    /// Pre-clamp cash below `-negative_cash_tolerance` is reported
    pub negative_cash_tolerance: Decimal,
    pub instruments: InstrumentMap,
    pub benchmarks: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            as_of: None,
            flow_policy: FlowPolicy::default(),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            irr: IrrSettings::default(),
            negative_cash_tolerance: Decimal::ZERO,
            instruments: InstrumentMap::new(),
            benchmarks: DEFAULT_BENCHMARKS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PipelineSettings {
    /// Parses settings from JSON and validates them.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: PipelineSettings =
            serde_json::from_str(json).map_err(ValidationError::ConfigParse)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_currency.trim().is_empty() {
            return Err(ValidationError::InvalidInput("baseCurrency must not be empty".into()).into());
        }
        if self.fetch_concurrency == 0 {
            return Err(
                ValidationError::InvalidInput("fetchConcurrency must be at least 1".into()).into(),
            );
        }
        if self.irr.max_iterations == 0 {
            return Err(
                ValidationError::InvalidInput("irr.maxIterations must be at least 1".into()).into(),
            );
        }
        if !(self.irr.tolerance.is_finite() && self.irr.tolerance > 0.0) {
            return Err(
                ValidationError::InvalidInput("irr.tolerance must be a positive number".into())
                    .into(),
            );
        }
        if !self.irr.initial_guess.is_finite() || self.irr.initial_guess <= -1.0 {
            return Err(ValidationError::InvalidInput(
                "irr.initialGuess must be greater than -1".into(),
            )
            .into());
        }
        if self.negative_cash_tolerance < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(
                "negativeCashTolerance must not be negative".into(),
            )
            .into());
        }
        for (id, mapping) in &self.instruments {
            if mapping.ticker.trim().is_empty() {
                return Err(ValidationError::InvalidInput(format!(
                    "instrument '{}' has an empty ticker",
                    id
                ))
                .into());
            }
        }
        Ok(())
    }

    /// The configured valuation date, or today.
    pub fn valuation_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(valuation_date_today)
    }

    pub fn base_currency(&self) -> String {
        self.base_currency.trim().to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_from_empty_object() {
        let settings = PipelineSettings::from_json_str("{}").unwrap();
        assert_eq!(settings, PipelineSettings::default());
        assert_eq!(settings.base_currency, "KRW");
        assert_eq!(settings.fetch_concurrency, 10);
        assert_eq!(settings.irr.max_iterations, 100);
        assert_eq!(settings.benchmarks, vec!["SPY", "QQQ", "IWM"]);
        assert_eq!(settings.flow_policy, FlowPolicy::Standard);
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{
            "baseCurrency": "usd",
            "asOf": "2024-06-30",
            "flowPolicy": "contributionsOnly",
            "fetchConcurrency": 4,
            "irr": { "initialGuess": 0.05 },
            "negativeCashTolerance": 1000,
            "instruments": {
                "US0378331005": { "ticker": "AAPL", "currency": "USD" }
            }
        }"#;
        let settings = PipelineSettings::from_json_str(json).unwrap();
        assert_eq!(settings.base_currency(), "USD");
        assert_eq!(settings.as_of, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(settings.flow_policy, FlowPolicy::ContributionsOnly);
        assert_eq!(settings.fetch_concurrency, 4);
        assert_eq!(settings.irr.initial_guess, 0.05);
        assert_eq!(settings.irr.max_iterations, 100);
        assert_eq!(settings.negative_cash_tolerance, dec!(1000));
        assert_eq!(settings.instruments["US0378331005"].ticker, "AAPL");
        assert_eq!(
            settings.valuation_date(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
        );
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let err = PipelineSettings::from_json_str(r#"{"fetchConcurrency": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_a_config_error() {
        let err = PipelineSettings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::ConfigParse(_))));
    }

    #[test]
    fn test_negative_tolerance_is_rejected() {
        let settings = PipelineSettings {
            negative_cash_tolerance: dec!(-1),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
