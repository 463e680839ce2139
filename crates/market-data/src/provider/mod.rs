//! Price oracle abstractions and the in-memory implementation.
//!
//! This module contains:
//! - The `PriceOracle` trait every price/FX source implements
//! - `ManualOracle`, an oracle over pre-loaded observations

mod manual;
mod traits;

pub use manual::ManualOracle;
pub use traits::PriceOracle;
