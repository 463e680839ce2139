//! Metrics Engine: time-weighted and money-weighted returns, wealth index and
//! drawdown over the daily ledger, for the full history or any sub-window.

mod irr;
mod performance_calculator;
mod performance_model;


pub use irr::{mwr_cash_flows, solve_xirr, IrrError};
pub use performance_calculator::PerformanceCalculator;
pub use performance_model::{PerformanceRecord, PerformanceSeries, PerformanceSummary};
