//! Price oracle trait definition.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::Quote;

/// Source of historical daily closes for securities and FX pairs.
///
/// Implementations may be backed by a live provider, a cache, or static data.
/// The engines never assume a dense series: weekends, holidays and outages
/// show up as missing dates and are filled by the caller.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use ledgerfolio_market_data::{MarketDataError, PriceOracle, Quote};
///
/// struct MyOracle;
///
/// #[async_trait]
/// impl PriceOracle for MyOracle {
///     fn id(&self) -> &'static str {
///         "MY_ORACLE"
///     }
///
///     async fn get_historical_quotes(
///         &self,
///         symbol: &str,
///         start: NaiveDate,
///         end: NaiveDate,
///     ) -> Result<Vec<Quote>, MarketDataError> {
///         // ... fetch from somewhere
///     }
/// }
/// ```
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Unique identifier for this oracle, used for logging.
    fn id(&self) -> &'static str;

    /// Fetch daily closes for `symbol` between `start` and `end` (both inclusive).
    ///
    /// # Returns
    ///
    /// Quotes ordered by date ascending. The series may be sparse and may be
    /// empty; a symbol the oracle does not know returns `SymbolNotFound`.
    async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Quote>, MarketDataError>;
}
