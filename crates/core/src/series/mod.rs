//! Date-keyed series with explicit fill policies.

mod daily_series;

pub use daily_series::{DailySeries, FillPolicy};
