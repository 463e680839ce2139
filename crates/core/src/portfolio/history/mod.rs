//! Historical Holdings Reconstructor: walks trades backward from today's
//! holdings, values each day with filled price and FX series, and reconciles
//! against the ledger through a cash plug.

mod history_model;
mod holdings_reconstructor;
mod market_series;
mod quantity_walk;


pub use history_model::{
    AllocationEntry, HistoricalHoldingsRow, HistoricalHoldingsTable, HoldingsSnapshot,
    CASH_SYMBOL,
};
pub use holdings_reconstructor::{HoldingsReconstructor, ReconstructionPlan};
pub use market_series::{fetch_market_series, MarketSeries, SeriesKind, SeriesRequest};
pub use quantity_walk::reverse_accumulate;
