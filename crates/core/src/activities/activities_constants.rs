/// Purchase of an instrument (quantity increases)
pub const TRANSACTION_TYPE_BUY: &str = "BUY";

/// Sale of an instrument (quantity decreases)
pub const TRANSACTION_TYPE_SELL: &str = "SELL";

/// Cash paid into the account from outside
pub const TRANSACTION_TYPE_DEPOSIT: &str = "DEPOSIT";

/// Cash taken out of the account
pub const TRANSACTION_TYPE_WITHDRAW: &str = "WITHDRAW";

/// Dividend income
pub const TRANSACTION_TYPE_DIVIDEND: &str = "DIVIDEND";

/// Interest income
pub const TRANSACTION_TYPE_INTEREST: &str = "INTEREST";

/// Broker or account fee
pub const TRANSACTION_TYPE_FEE: &str = "FEE";

/// Withholding or other tax
pub const TRANSACTION_TYPE_TAX: &str = "TAX";

/// Movement between sub-accounts or currencies inside the same account
pub const TRANSACTION_TYPE_INTERNAL_TRANSFER: &str = "INTERNAL_TRANSFER";

/// Categories that move instrument quantities.
pub const TRADING_TRANSACTION_TYPES: [&str; 2] = [TRANSACTION_TYPE_BUY, TRANSACTION_TYPE_SELL];

