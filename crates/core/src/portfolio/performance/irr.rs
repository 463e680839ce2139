//! Internal rate of return over dated cash flows.

use chrono::NaiveDate;
use log::debug;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::constants::{DECIMAL_PRECISION, IRR_DAYS_PER_YEAR};
use crate::portfolio::ledger::LedgerDay;
use crate::settings::IrrSettings;

/// Smallest admissible `1 + rate`. Anything closer to zero is treated as a
/// total loss.
const MIN_GROWTH_FACTOR: f64 = 1e-9;

/// Why no money-weighted return could be produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrrError {
    #[error("IRR needs at least two cash flows with opposite signs")]
    InsufficientCashFlows,

    #[error("IRR did not converge after {iterations} iterations")]
    NonConvergence { iterations: u32 },

    #[error("IRR evaluation overflowed")]
    Overflow,

    #[error("IRR collapsed to a rate of -100% or below")]
    DegenerateRate,

    #[error("IRR derivative vanished at rate {rate}")]
    ZeroDerivative { rate: f64 },
}

/// Builds the investor-side cash flows of a ledger window.
///
/// The opening balance is an outlay, every intermediate external flow is
/// negated, and the last day is replaced by the closing balance. Zero
/// intermediate flows are dropped.
pub fn mwr_cash_flows(days: &[LedgerDay]) -> Vec<(NaiveDate, Decimal)> {
    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return Vec::new();
    };
    if days.len() < 2 {
        return vec![(first.date, -first.calculated_asset)];
    }

    let mut flows = Vec::with_capacity(days.len());
    flows.push((first.date, -first.calculated_asset));
    flows.extend(
        days[1..days.len() - 1]
            .iter()
            .filter(|d| !d.external_flow.is_zero())
            .map(|d| (d.date, -d.external_flow)),
    );
    flows.push((last.date, last.calculated_asset));
    flows
}

/// Solves `sum(cf_i / (1 + rate)^(days_i / 365)) = 0` by Newton iteration.
///
/// Offsets are measured from the first cash flow's date.
pub fn solve_xirr(
    cash_flows: &[(NaiveDate, Decimal)],
    settings: &IrrSettings,
) -> Result<Decimal, IrrError> {
    let Some((first_date, _)) = cash_flows.first() else {
        return Err(IrrError::InsufficientCashFlows);
    };

    let series: Vec<(f64, f64)> = cash_flows
        .iter()
        .map(|(date, amount)| {
            let years = (*date - *first_date).num_days() as f64 / IRR_DAYS_PER_YEAR;
            (amount.to_f64().unwrap_or(0.0), years)
        })
        .collect();

    let has_inflow = series.iter().any(|(cf, _)| *cf > 0.0);
    let has_outflow = series.iter().any(|(cf, _)| *cf < 0.0);
    if series.len() < 2 || !has_inflow || !has_outflow {
        return Err(IrrError::InsufficientCashFlows);
    }

    let mut rate = settings.initial_guess;
    for iteration in 0..settings.max_iterations {
        let (npv, dnpv) = npv_and_derivative(&series, rate);
        if !npv.is_finite() || !dnpv.is_finite() {
            return Err(IrrError::Overflow);
        }
        if dnpv.abs() < f64::EPSILON {
            return Err(IrrError::ZeroDerivative { rate });
        }

        let mut new_rate = rate - npv / dnpv;
        if !new_rate.is_finite() {
            return Err(IrrError::Overflow);
        }
        // Newton may jump past -100%; move halfway towards it instead
        if new_rate <= -1.0 {
            new_rate = (rate - 1.0) / 2.0;
        }
        if 1.0 + new_rate < MIN_GROWTH_FACTOR {
            return Err(IrrError::DegenerateRate);
        }

        if (new_rate - rate).abs() < settings.tolerance {
            debug!("IRR converged to {} after {} iterations", new_rate, iteration + 1);
            return Decimal::from_f64(new_rate)
                .map(|r| r.round_dp(DECIMAL_PRECISION))
                .ok_or(IrrError::Overflow);
        }
        rate = new_rate;
    }

    Err(IrrError::NonConvergence {
        iterations: settings.max_iterations,
    })
}

fn npv_and_derivative(series: &[(f64, f64)], rate: f64) -> (f64, f64) {
    let growth = 1.0 + rate;
    let mut npv = 0.0;
    let mut dnpv = 0.0;
    for &(cf, t) in series {
        let discount = growth.powf(t);
        npv += cf / discount;
        dnpv -= t * cf / (discount * growth);
    }
    (npv, dnpv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn assert_close(actual: Decimal, expected: Decimal) {
        assert!(
            (actual - expected).abs() < dec!(0.000001),
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_one_year_round_trip_recovers_rate() {
        // 2023 is not a leap year, so the two dates are exactly 365 days apart
        for rate in [dec!(0.08), dec!(-0.25), dec!(0.5), dec!(0)] {
            let flows = vec![
                (d(2023, 1, 1), dec!(-1000)),
                (d(2024, 1, 1), dec!(1000) * (Decimal::ONE + rate)),
            ];
            let solved = solve_xirr(&flows, &IrrSettings::default()).unwrap();
            assert_close(solved, rate);
        }
    }

    #[test]
    fn test_half_year_is_annualized() {
        // 10% over ~half a year compounds to ~21% a year
        let flows = vec![(d(2023, 1, 1), dec!(-100)), (d(2023, 7, 2), dec!(110))];
        let solved = solve_xirr(&flows, &IrrSettings::default()).unwrap();
        let expected = 1.1f64.powf(365.0 / 182.0) - 1.0;
        assert_close(solved, Decimal::from_f64(expected).unwrap());
    }

    #[test]
    fn test_intermediate_contribution() {
        // Two yearly contributions and one payout: (1+r)^2 + (1+r) = 2.2
        let flows = vec![
            (d(2022, 1, 1), dec!(-1000)),
            (d(2023, 1, 1), dec!(-1000)),
            (d(2024, 1, 1), dec!(2200)),
        ];
        let solved = solve_xirr(&flows, &IrrSettings::default()).unwrap();
        let g = Decimal::ONE + solved;
        let residual = dec!(1000) * g * g + dec!(1000) * g - dec!(2200);
        assert!(residual.abs() < dec!(0.01), "residual {residual}");
    }

    #[test]
    fn test_single_sign_flows_are_insufficient() {
        let flows = vec![(d(2023, 1, 1), dec!(-100)), (d(2024, 1, 1), dec!(-5))];
        assert_eq!(
            solve_xirr(&flows, &IrrSettings::default()),
            Err(IrrError::InsufficientCashFlows)
        );
        assert_eq!(
            solve_xirr(&[], &IrrSettings::default()),
            Err(IrrError::InsufficientCashFlows)
        );
    }

    #[test]
    fn test_total_loss_is_degenerate_not_a_panic() {
        let flows = vec![(d(2023, 1, 1), dec!(-1000)), (d(2024, 1, 1), dec!(0.0000000001))];
        let err = solve_xirr(&flows, &IrrSettings::default()).unwrap_err();
        assert!(matches!(
            err,
            IrrError::DegenerateRate | IrrError::NonConvergence { .. }
        ));
    }

    #[test]
    fn test_iteration_cap_reports_non_convergence() {
        let settings = IrrSettings {
            max_iterations: 1,
            ..IrrSettings::default()
        };
        let flows = vec![(d(2023, 1, 1), dec!(-1000)), (d(2024, 1, 1), dec!(3000))];
        assert_eq!(
            solve_xirr(&flows, &settings),
            Err(IrrError::NonConvergence { iterations: 1 })
        );
    }

    #[test]
    fn test_cash_flows_from_ledger_window() {
        let day = |n: u32, flow: Decimal, asset: Decimal| LedgerDay {
            date: d(2024, 1, n),
            anchor_value: None,
            external_flow: flow,
            calculated_asset: asset,
        };
        let days = vec![
            day(1, dec!(5), dec!(1000)),
            day(2, dec!(0), dec!(1001)),
            day(3, dec!(200), dec!(1203)),
            day(4, dec!(-50), dec!(1160)),
            day(5, dec!(999), dec!(1170)),
        ];
        let flows = mwr_cash_flows(&days);
        assert_eq!(
            flows,
            vec![
                (d(2024, 1, 1), dec!(-1000)),
                (d(2024, 1, 3), dec!(-200)),
                (d(2024, 1, 4), dec!(50)),
                (d(2024, 1, 5), dec!(1170)),
            ]
        );
    }
}
