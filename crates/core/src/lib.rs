//! Ledgerfolio Core - daily ledger, performance metrics and historical
//! holdings reconstruction for an investment account.
//!
//! The crate turns sparse balance anchors and a transaction log into:
//!
//! - a gap-free daily asset ledger ([`portfolio::ledger`]),
//! - time- and money-weighted returns with drawdown ([`portfolio::performance`]),
//! - a per-instrument daily valuation table reconciled to the ledger through a
//!   cash plug ([`portfolio::history`]).
//!
//! Prices and FX rates come from any [`ledgerfolio_market_data::PriceOracle`].

pub mod activities;
pub mod constants;
pub mod errors;
pub mod portfolio;
pub mod series;
pub mod settings;
pub mod utils;
pub mod warnings;

pub use activities::{TransactionCategory, TransactionRecord};
pub use portfolio::*;
pub use settings::PipelineSettings;
pub use warnings::{DataQualityWarning, WarningKind};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
