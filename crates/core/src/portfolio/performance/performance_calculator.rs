use chrono::NaiveDate;
use log::debug;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use super::irr::{mwr_cash_flows, solve_xirr};
use super::performance_model::{PerformanceRecord, PerformanceSeries, PerformanceSummary};
use crate::constants::DECIMAL_PRECISION;
use crate::errors::{CalculatorError, Result};
use crate::portfolio::ledger::{DailyLedger, LedgerDay};
use crate::settings::IrrSettings;
use crate::warnings::{DataQualityWarning, WarningKind};

const TRADING_DAYS_PER_YEAR: u32 = 252;
const DAYS_PER_YEAR_DECIMAL: Decimal = dec!(365.25);
const SQRT_TRADING_DAYS_APPROX: Decimal = dec!(15.874507866); // sqrt(252)

/// Derives return and risk series from a daily ledger.
///
/// Stateless: the full-history and windowed variants read the ledger and
/// nothing else, so windows can be evaluated in any order.
#[derive(Debug, Clone, Default)]
pub struct PerformanceCalculator {
    irr: IrrSettings,
}

impl PerformanceCalculator {
    pub fn new(irr: IrrSettings) -> Self {
        Self { irr }
    }

    /// Full-history metrics.
    pub fn compute(&self, ledger: &DailyLedger) -> PerformanceSeries {
        if ledger.is_empty() {
            return PerformanceSeries::empty(vec![DataQualityWarning::new(
                WarningKind::MissingInput,
                "ledger",
                "ledger is empty, no performance computed",
            )]);
        }
        self.compute_days(ledger.days())
    }

    /// Metrics re-based to `[start, end]`: the chain restarts at `r = 0` on
    /// the first day of the window that the ledger covers.
    pub fn compute_window(
        &self,
        ledger: &DailyLedger,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PerformanceSeries> {
        if start > end {
            return Err(CalculatorError::InvalidWindow { start, end }.into());
        }
        let days = ledger.slice(start, end);
        if days.is_empty() {
            return Ok(PerformanceSeries::empty(vec![DataQualityWarning::new(
                WarningKind::MissingInput,
                "ledger",
                format!("ledger has no days between {} and {}", start, end),
            )]));
        }
        Ok(self.compute_days(days))
    }

    fn compute_days(&self, days: &[LedgerDay]) -> PerformanceSeries {
        let mut warnings = Vec::new();
        let mut records = Vec::with_capacity(days.len());
        let mut daily_returns = Vec::with_capacity(days.len().saturating_sub(1));

        let mut wealth = Decimal::ONE;
        let mut peak = Decimal::ONE;
        let mut max_drawdown = Decimal::ZERO;

        for (i, day) in days.iter().enumerate() {
            let daily_return = if i == 0 {
                Decimal::ZERO
            } else {
                let r = daily_return(days[i - 1].calculated_asset, day);
                daily_returns.push(r);
                r
            };

            wealth = wealth
                .checked_mul(Decimal::ONE + daily_return)
                .unwrap_or(wealth);
            peak = peak.max(wealth);
            let drawdown = if wealth >= peak {
                Decimal::ZERO
            } else {
                (wealth - peak) / peak
            };
            max_drawdown = max_drawdown.min(drawdown);

            records.push(PerformanceRecord {
                date: day.date,
                daily_return,
                cumulative_twr: wealth - Decimal::ONE,
                wealth_index: wealth,
                drawdown,
            });
        }

        // Both exist: callers never pass an empty slice
        let first = &days[0];
        let last = &days[days.len() - 1];

        let mwr = match solve_xirr(&mwr_cash_flows(days), &self.irr) {
            Ok(rate) => Some(rate),
            Err(e) => {
                warnings.push(DataQualityWarning::on_date(
                    WarningKind::NumericalNonConvergence,
                    "mwr",
                    last.date,
                    format!("money-weighted return unavailable: {}", e),
                ));
                None
            }
        };

        let annual_volatility = volatility(&daily_returns).unwrap_or_else(|| {
            warnings.push(DataQualityWarning::on_date(
                WarningKind::NumericalNonConvergence,
                "volatility",
                last.date,
                "daily returns too large to compute volatility, reported as zero",
            ));
            Decimal::ZERO
        });

        let net_flow: Decimal = days[1..].iter().map(|d| d.external_flow).sum();
        let cumulative_twr = wealth - Decimal::ONE;

        let summary = PerformanceSummary {
            period_start_date: Some(first.date),
            period_end_date: Some(last.date),
            cumulative_twr: cumulative_twr.round_dp(DECIMAL_PRECISION),
            annualized_twr: annualized_return(first.date, last.date, cumulative_twr)
                .round_dp(DECIMAL_PRECISION),
            mwr,
            max_drawdown: max_drawdown.round_dp(DECIMAL_PRECISION),
            volatility: annual_volatility.round_dp(DECIMAL_PRECISION),
            gain_loss_amount: last.calculated_asset - first.calculated_asset - net_flow,
            net_flow,
        };

        debug!(
            "Performance {}..={}: twr {}, mdd {}, mwr {:?}",
            first.date, last.date, summary.cumulative_twr, summary.max_drawdown, summary.mwr
        );

        PerformanceSeries {
            records,
            summary,
            warnings,
        }
    }
}

/// `assets_t / (assets_{t-1} + flow_t) - 1`, zero when the base is zero.
fn daily_return(prev_asset: Decimal, day: &LedgerDay) -> Decimal {
    let denominator = prev_asset + day.external_flow;
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    day.calculated_asset
        .checked_div(denominator)
        .map(|ratio| ratio - Decimal::ONE)
        .unwrap_or(Decimal::ZERO)
}

fn annualized_return(start_date: NaiveDate, end_date: NaiveDate, total_return: Decimal) -> Decimal {
    if start_date > end_date {
        return Decimal::ZERO;
    }
    if total_return <= dec!(-1.0) {
        return dec!(-1.0);
    }

    let days = (end_date - start_date).num_days();
    if days <= 0 {
        return total_return;
    }

    let years = Decimal::from(days) / DAYS_PER_YEAR_DECIMAL;
    // Sub-year returns are reported as-is
    if years < Decimal::ONE {
        return total_return;
    }

    let base = Decimal::ONE + total_return;
    if base <= Decimal::ZERO {
        return dec!(-1.0);
    }

    match base.checked_powd(Decimal::ONE / years) {
        Some(growth) => growth - Decimal::ONE,
        None => {
            debug!("Annualization overflowed for total return {}", total_return);
            total_return
        }
    }
}

/// Sample standard deviation of daily returns, scaled by sqrt(252).
///
/// `None` when the squared deviations leave the `Decimal` range.
fn volatility(daily_returns: &[Decimal]) -> Option<Decimal> {
    if daily_returns.len() < 2 {
        return Some(Decimal::ZERO);
    }

    let count = Decimal::from(daily_returns.len());
    let total = daily_returns
        .iter()
        .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(*r))?;
    let mean = total / count;
    let sum_squared_diff = daily_returns.iter().try_fold(Decimal::ZERO, |acc, &r| {
        let diff = r.checked_sub(mean)?;
        acc.checked_add(diff.checked_mul(diff)?)
    })?;

    let variance = sum_squared_diff / (count - Decimal::ONE);
    if variance.is_sign_negative() {
        return Some(Decimal::ZERO);
    }

    let daily_volatility = variance.sqrt().unwrap_or(Decimal::ZERO);
    let annualization_factor = Decimal::from(TRADING_DAYS_PER_YEAR)
        .sqrt()
        .unwrap_or(SQRT_TRADING_DAYS_APPROX);

    daily_volatility.checked_mul(annualization_factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_annualized_return_below_one_year_is_unchanged() {
        assert_eq!(
            annualized_return(d(2024, 1, 1), d(2024, 6, 1), dec!(0.05)),
            dec!(0.05)
        );
    }

    #[test]
    fn test_annualized_return_caps_total_loss() {
        assert_eq!(
            annualized_return(d(2020, 1, 1), d(2024, 1, 1), dec!(-1.5)),
            dec!(-1)
        );
    }

    #[test]
    fn test_annualized_return_two_years() {
        let annualized = annualized_return(d(2022, 1, 1), d(2024, 1, 1), dec!(0.21));
        assert!((annualized - dec!(0.1)).abs() < dec!(0.001), "{annualized}");
    }

    #[test]
    fn test_volatility_of_constant_returns_is_zero() {
        assert_eq!(volatility(&[dec!(0.01); 5]), Some(Decimal::ZERO));
        assert_eq!(volatility(&[dec!(0.01)]), Some(Decimal::ZERO));
        assert!(volatility(&[dec!(0.01), dec!(-0.02), dec!(0.03)]).unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_volatility_out_of_range_is_none() {
        assert_eq!(volatility(&[dec!(1000000000000000), Decimal::ZERO]), None);
        assert_eq!(volatility(&[Decimal::MAX, Decimal::MAX]), None);
    }
}
