//! Activities module - normalized transaction records.

mod activities_constants;
mod activities_model;

pub use activities_constants::*;
pub use activities_model::{TransactionCategory, TransactionRecord};
