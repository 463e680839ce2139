use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::activities_constants::*;
use crate::errors::ValidationError;

/// Normalized transaction category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionCategory {
    Buy,
    Sell,
    Deposit,
    Withdraw,
    Dividend,
    Interest,
    Fee,
    Tax,
    InternalTransfer,
}

impl TransactionCategory {
    pub const ALL: [TransactionCategory; 9] = [
        TransactionCategory::Buy,
        TransactionCategory::Sell,
        TransactionCategory::Deposit,
        TransactionCategory::Withdraw,
        TransactionCategory::Dividend,
        TransactionCategory::Interest,
        TransactionCategory::Fee,
        TransactionCategory::Tax,
        TransactionCategory::InternalTransfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionCategory::Buy => TRANSACTION_TYPE_BUY,
            TransactionCategory::Sell => TRANSACTION_TYPE_SELL,
            TransactionCategory::Deposit => TRANSACTION_TYPE_DEPOSIT,
            TransactionCategory::Withdraw => TRANSACTION_TYPE_WITHDRAW,
            TransactionCategory::Dividend => TRANSACTION_TYPE_DIVIDEND,
            TransactionCategory::Interest => TRANSACTION_TYPE_INTEREST,
            TransactionCategory::Fee => TRANSACTION_TYPE_FEE,
            TransactionCategory::Tax => TRANSACTION_TYPE_TAX,
            TransactionCategory::InternalTransfer => TRANSACTION_TYPE_INTERNAL_TRANSFER,
        }
    }

    pub fn is_trade(&self) -> bool {
        TRADING_TRANSACTION_TYPES.contains(&self.as_str())
    }
}

impl fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        // Common synonyms seen in broker exports
        let normalized = match normalized.as_str() {
            "WITHDRAWAL" => TRANSACTION_TYPE_WITHDRAW.to_string(),
            "TRANSFER" => TRANSACTION_TYPE_INTERNAL_TRANSFER.to_string(),
            _ => normalized,
        };
        TransactionCategory::ALL
            .iter()
            .find(|c| c.as_str() == normalized)
            .copied()
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// A single normalized ledger transaction. Immutable input to every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub category: TransactionCategory,
    /// Internal security identifier, absent for pure cash movements
    pub instrument_id: Option<String>,
    /// Quantity moved; its sign is ignored for buys and sells
    pub quantity_delta: Decimal,
    /// Cash amount in `currency`; sign handling is owned by the flow rules
    pub amount: Decimal,
    pub currency: String,
}

impl TransactionRecord {
    /// A cash-only transaction (deposit, withdrawal, income, fee, tax...).
    pub fn cash(
        date: NaiveDate,
        category: TransactionCategory,
        amount: Decimal,
        currency: &str,
    ) -> Self {
        Self {
            date,
            category,
            instrument_id: None,
            quantity_delta: Decimal::ZERO,
            amount,
            currency: currency.to_string(),
        }
    }

    /// A trade of `quantity` units of `instrument_id`.
    pub fn trade(
        date: NaiveDate,
        category: TransactionCategory,
        instrument_id: &str,
        quantity: Decimal,
        amount: Decimal,
        currency: &str,
    ) -> Self {
        Self {
            date,
            category,
            instrument_id: Some(instrument_id.to_string()),
            quantity_delta: quantity,
            amount,
            currency: currency.to_string(),
        }
    }

    /// Signed quantity change this record applies to its instrument.
    ///
    /// Buys add `|quantity_delta|`, sells subtract it. Every other category
    /// leaves quantities untouched.
    pub fn signed_quantity(&self) -> Decimal {
        match self.category {
            TransactionCategory::Buy => self.quantity_delta.abs(),
            TransactionCategory::Sell => -self.quantity_delta.abs(),
            _ => Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    #[test]
    fn test_category_round_trip_through_str() {
        for category in TransactionCategory::ALL {
            let parsed: TransactionCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_category_synonyms() {
        assert_eq!(
            "withdrawal".parse::<TransactionCategory>().unwrap(),
            TransactionCategory::Withdraw
        );
        assert_eq!(
            "internal-transfer".parse::<TransactionCategory>().unwrap(),
            TransactionCategory::InternalTransfer
        );
        assert!("SPLIT".parse::<TransactionCategory>().is_err());
    }

    #[test]
    fn test_sell_negates_quantity_regardless_of_sign() {
        let sell = TransactionRecord::trade(
            day(),
            TransactionCategory::Sell,
            "US0378331005",
            dec!(5),
            dec!(900),
            "USD",
        );
        assert_eq!(sell.signed_quantity(), dec!(-5));

        let mut already_negative = sell.clone();
        already_negative.quantity_delta = dec!(-5);
        assert_eq!(already_negative.signed_quantity(), dec!(-5));

        let buy = TransactionRecord::trade(
            day(),
            TransactionCategory::Buy,
            "US0378331005",
            dec!(-3),
            dec!(540),
            "USD",
        );
        assert_eq!(buy.signed_quantity(), dec!(3));
    }

    #[test]
    fn test_cash_records_do_not_move_quantities() {
        let dividend =
            TransactionRecord::cash(day(), TransactionCategory::Dividend, dec!(12.5), "USD");
        assert_eq!(dividend.signed_quantity(), Decimal::ZERO);
        assert!(!dividend.category.is_trade());
    }

    #[test]
    fn test_serde_uses_screaming_case_categories() {
        let record = TransactionRecord::cash(day(), TransactionCategory::InternalTransfer, dec!(1), "KRW");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"INTERNAL_TRANSFER\""));
        assert!(json.contains("\"quantityDelta\""));
    }
}
