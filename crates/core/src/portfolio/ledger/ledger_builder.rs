use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::time::Instant;

use super::flow_classifier::FlowRuleTable;
use super::ledger_model::{BalanceAnchor, DailyLedger, LedgerBuildResult, LedgerDay};
use crate::activities::TransactionRecord;
use crate::errors::{CalculatorError, Result};
use crate::utils::time_utils::get_days_between;
use crate::warnings::{DataQualityWarning, WarningKind};

/// Builds the daily asset ledger.
///
/// Between two anchors the unexplained change (anchor minus anchor-plus-flows)
/// is spread as an equal daily gain, and the later anchor day is pinned to
/// the anchor value. After the last anchor only flows are applied.
#[derive(Debug, Clone, Default)]
pub struct LedgerBuilder {
    rules: FlowRuleTable,
}

impl LedgerBuilder {
    pub fn new(rules: FlowRuleTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &FlowRuleTable {
        &self.rules
    }

    /// Builds one [`LedgerDay`] per calendar day from the first anchor to
    /// `max(as_of, last anchor)`.
    ///
    /// Fails only when there is no anchor at all.
    pub fn build(
        &self,
        transactions: &[TransactionRecord],
        anchors: &[BalanceAnchor],
        as_of: NaiveDate,
    ) -> Result<LedgerBuildResult> {
        let started = Instant::now();
        let mut warnings = Vec::new();

        let anchors = dedup_anchors(anchors, &mut warnings);
        let (Some(first), Some(last)) = (anchors.first(), anchors.last()) else {
            return Err(CalculatorError::NoBalanceAnchors.into());
        };
        let start = first.date;
        let end = as_of.max(last.date);

        let flows = self.rules.daily_flows(transactions);
        let ignored = flows
            .keys()
            .filter(|d| **d < start || **d > end)
            .count();
        if ignored > 0 {
            debug!(
                "Ledger: {} flow day(s) outside {}..={} ignored",
                ignored, start, end
            );
        }

        let anchor_by_date: BTreeMap<NaiveDate, Decimal> = anchors
            .iter()
            .map(|a| (a.date, a.net_asset_value))
            .collect();

        let mut days: Vec<LedgerDay> = get_days_between(start, end)
            .into_iter()
            .map(|date| LedgerDay {
                date,
                anchor_value: anchor_by_date.get(&date).copied(),
                external_flow: flows.get(&date).copied().unwrap_or(Decimal::ZERO),
                calculated_asset: Decimal::ZERO,
            })
            .collect();

        // Anchor dates are unique and inside the range, so offsets are valid indices
        let anchor_indices: Vec<(usize, Decimal)> = anchors
            .iter()
            .map(|a| ((a.date - start).num_days() as usize, a.net_asset_value))
            .collect();

        days[0].calculated_asset = first.net_asset_value;

        for pair in anchor_indices.windows(2) {
            let (prev_idx, prev_value) = pair[0];
            let (curr_idx, curr_value) = pair[1];
            interpolate_interval(&mut days[prev_idx..=curr_idx], prev_value, curr_value);
        }

        // Past the last anchor there is nothing to aim at: flows only
        let (last_idx, last_value) = anchor_indices[anchor_indices.len() - 1];
        let mut running = last_value;
        for day in days.iter_mut().skip(last_idx + 1) {
            running += day.external_flow;
            day.calculated_asset = running;
        }

        debug!(
            "Ledger built: {} days, {} anchors, {} flow days in {:?}",
            days.len(),
            anchors.len(),
            flows.len(),
            started.elapsed()
        );

        Ok(LedgerBuildResult {
            ledger: DailyLedger::from_days(days),
            warnings,
        })
    }
}

/// Fills `interval[1..]`; `interval[0]` is the previous anchor day and the
/// last element is the next anchor day.
fn interpolate_interval(interval: &mut [LedgerDay], prev_value: Decimal, curr_value: Decimal) {
    let steps = interval.len().saturating_sub(1);
    if steps == 0 {
        return;
    }

    let total_flow: Decimal = interval[1..].iter().map(|d| d.external_flow).sum();
    let theoretical_end = prev_value + total_flow;
    let valuation_gain = curr_value - theoretical_end;
    let daily_gain = valuation_gain / Decimal::from(steps as u64);

    let mut running = prev_value;
    for day in interval[1..].iter_mut() {
        running += day.external_flow + daily_gain;
        day.calculated_asset = running;
    }
    interval[steps].calculated_asset = curr_value;
}

/// Stable sort by date, keeping the last anchor per date.
fn dedup_anchors(
    anchors: &[BalanceAnchor],
    warnings: &mut Vec<DataQualityWarning>,
) -> Vec<BalanceAnchor> {
    let mut sorted: Vec<BalanceAnchor> = anchors.to_vec();
    sorted.sort_by_key(|a| a.date);

    let mut deduped: Vec<BalanceAnchor> = Vec::with_capacity(sorted.len());
    for anchor in sorted {
        match deduped.last_mut() {
            Some(prev) if prev.date == anchor.date => {
                warnings.push(DataQualityWarning::on_date(
                    WarningKind::DuplicateAnchor,
                    "anchors",
                    anchor.date,
                    format!(
                        "anchor {} replaced by later anchor {} on the same date",
                        prev.net_asset_value, anchor.net_asset_value
                    ),
                ));
                *prev = anchor;
            }
            _ => deduped.push(anchor),
        }
    }
    deduped
}
