/// Decimal precision used when rounding reported metrics
pub const DECIMAL_PRECISION: u32 = 6;

/// Display precision for allocation weights (percent)
pub const WEIGHT_DECIMAL_PRECISION: u32 = 2;

/// Default base currency of the ledger
pub const DEFAULT_BASE_CURRENCY: &str = "KRW";

/// Default number of oracle requests issued per batch
pub const DEFAULT_FETCH_CONCURRENCY: usize = 10;

/// Default benchmark tickers
pub const DEFAULT_BENCHMARKS: [&str; 3] = ["SPY", "QQQ", "IWM"];

/// Day count used to annualize IRR cash-flow offsets
pub const IRR_DAYS_PER_YEAR: f64 = 365.0;
