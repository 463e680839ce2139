//! Ledger Builder: sparse balance anchors plus external flows into a gap-free
//! daily asset series.

mod flow_classifier;
mod ledger_builder;
mod ledger_model;


pub use flow_classifier::{FlowRule, FlowRuleTable};
pub use ledger_builder::LedgerBuilder;
pub use ledger_model::{BalanceAnchor, DailyLedger, LedgerBuildResult, LedgerDay};
