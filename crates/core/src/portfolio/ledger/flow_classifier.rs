//! Flow classification for the daily ledger.
//!
//! Each transaction category maps to one [`FlowRule`] in a [`FlowRuleTable`].
//! Only external flows (money crossing the account boundary) reach the
//! ledger; trades and internal transfers are reallocations and are excluded.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::activities::{TransactionCategory, TransactionRecord};
use crate::settings::FlowPolicy;

/// How a category contributes to the day's external flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowRule {
    /// Money entering the account: `+|amount|`
    Inflow,
    /// Money leaving the account: `-|amount|`
    Outflow,
    /// Signed amount taken as recorded
    AsRecorded,
    /// Not an external flow
    Excluded,
}

impl FlowRule {
    /// Signed external flow for `amount`, `None` when excluded.
    pub fn apply(&self, amount: Decimal) -> Option<Decimal> {
        match self {
            FlowRule::Inflow => Some(amount.abs()),
            FlowRule::Outflow => Some(-amount.abs()),
            FlowRule::AsRecorded => Some(amount),
            FlowRule::Excluded => None,
        }
    }

    pub fn is_external(&self) -> bool {
        !matches!(self, FlowRule::Excluded)
    }
}

/// Declarative category -> flow rule table.
///
/// Categories missing from the table are excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRuleTable {
    rules: BTreeMap<TransactionCategory, FlowRule>,
}

impl FlowRuleTable {
    /// A table that excludes every category.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Deposits, withdrawals, income and taxes are external.
    ///
    /// Fees are charged against money already in the account and stay out,
    /// as do trades and internal transfers.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(TransactionCategory::Deposit, FlowRule::Inflow)
            .with_rule(TransactionCategory::Withdraw, FlowRule::Outflow)
            .with_rule(TransactionCategory::Dividend, FlowRule::Inflow)
            .with_rule(TransactionCategory::Interest, FlowRule::Inflow)
            .with_rule(TransactionCategory::Tax, FlowRule::Outflow)
            .with_rule(TransactionCategory::Fee, FlowRule::Excluded)
            .with_rule(TransactionCategory::Buy, FlowRule::Excluded)
            .with_rule(TransactionCategory::Sell, FlowRule::Excluded)
            .with_rule(TransactionCategory::InternalTransfer, FlowRule::Excluded)
    }

    /// Only deposits and withdrawals are external. Income stays inside the
    /// return.
    pub fn contributions_only() -> Self {
        Self::standard()
            .with_rule(TransactionCategory::Dividend, FlowRule::Excluded)
            .with_rule(TransactionCategory::Interest, FlowRule::Excluded)
            .with_rule(TransactionCategory::Tax, FlowRule::Excluded)
    }

    pub fn for_policy(policy: FlowPolicy) -> Self {
        match policy {
            FlowPolicy::Standard => Self::standard(),
            FlowPolicy::ContributionsOnly => Self::contributions_only(),
        }
    }

    /// Returns the table with `category` mapped to `rule`.
    pub fn with_rule(mut self, category: TransactionCategory, rule: FlowRule) -> Self {
        self.rules.insert(category, rule);
        self
    }

    pub fn rule_for(&self, category: TransactionCategory) -> FlowRule {
        self.rules
            .get(&category)
            .copied()
            .unwrap_or(FlowRule::Excluded)
    }

    /// Every explicit entry, ordered by category.
    pub fn rules(&self) -> impl Iterator<Item = (TransactionCategory, FlowRule)> + '_ {
        self.rules.iter().map(|(c, r)| (*c, *r))
    }

    /// Signed external flow of one transaction, `None` if not external.
    pub fn classify(&self, transaction: &TransactionRecord) -> Option<Decimal> {
        self.rule_for(transaction.category).apply(transaction.amount)
    }

    /// External flows summed per day.
    pub fn daily_flows(&self, transactions: &[TransactionRecord]) -> BTreeMap<NaiveDate, Decimal> {
        let mut flows: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for tx in transactions {
            if let Some(flow) = self.classify(tx) {
                *flows.entry(tx.date).or_insert(Decimal::ZERO) += flow;
            }
        }
        flows
    }
}

impl Default for FlowRuleTable {
    fn default() -> Self {
        Self::standard()
    }
}
