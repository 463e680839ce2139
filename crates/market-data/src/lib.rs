//! Ledgerfolio Market Data Crate
//!
//! This crate defines the provider-agnostic contract through which the
//! Ledgerfolio engines consume historical closing prices and FX rates.
//!
//! # Overview
//!
//! ```text
//! +------------------+     +------------------+     +------------------+
//! |  Reconstructor   | --> |   PriceOracle    | --> |   Vec<Quote>     |
//! |  / Benchmarks    |     |  (any provider)  |     | (sparse, sorted) |
//! +------------------+     +------------------+     +------------------+
//! ```
//!
//! The oracle returns whatever observations it has for a symbol and date range.
//! Gaps (weekends, holidays, missing sessions) are expected and are filled by
//! the consumer, never by the oracle.
//!
//! # Core Types
//!
//! - [`Quote`] - A single daily close observation
//! - [`PriceOracle`] - The async trait every price/FX source implements
//! - [`ManualOracle`] - In-memory oracle backed by pre-loaded series
//! - [`MarketDataError`] - Errors an oracle may return

pub mod errors;
pub mod fx;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;
pub use fx::fx_symbol;
pub use models::Quote;
pub use provider::{ManualOracle, PriceOracle};
