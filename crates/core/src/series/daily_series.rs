use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::utils::time_utils::get_days_between;

/// How gaps are filled when a sparse series is aligned to a calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPolicy {
    /// Leave gaps as `None`.
    None,
    /// Carry the last known value forward. Leading gaps stay `None`.
    Forward,
    /// Carry forward, then fill any leading gap from the first known value.
    ForwardThenBackward,
}

/// A sparse, ordered series of decimal observations keyed by date.
///
/// Prices, FX rates and balance values arrive with holiday and weekend gaps.
/// They are kept sparse here and only densified through [`DailySeries::align`],
/// which always takes an explicit [`FillPolicy`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySeries {
    points: BTreeMap<NaiveDate, Decimal>,
}

impl DailySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an observation. A later insert on the same date replaces the earlier one.
    pub fn insert(&mut self, date: NaiveDate, value: Decimal) {
        self.points.insert(date, value);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The exact observation on `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<Decimal> {
        self.points.get(&date).copied()
    }

    /// The most recent observation on or before `date`.
    pub fn latest_on_or_before(&self, date: NaiveDate) -> Option<Decimal> {
        self.points.range(..=date).next_back().map(|(_, v)| *v)
    }

    pub fn first(&self) -> Option<(NaiveDate, Decimal)> {
        self.points.iter().next().map(|(d, v)| (*d, *v))
    }

    pub fn last(&self) -> Option<(NaiveDate, Decimal)> {
        self.points.iter().next_back().map(|(d, v)| (*d, *v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Decimal)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    /// Densifies the series over `[start, end]`, one entry per calendar day.
    pub fn align(&self, start: NaiveDate, end: NaiveDate, policy: FillPolicy) -> Vec<Option<Decimal>> {
        let days = get_days_between(start, end);
        let mut out = Vec::with_capacity(days.len());

        // Seed the forward carry with the last observation before the window
        let mut carry = match policy {
            FillPolicy::None => None,
            _ => start.pred_opt().and_then(|d| self.latest_on_or_before(d)),
        };

        for day in &days {
            let observed = self.get(*day);
            let value = match policy {
                FillPolicy::None => observed,
                FillPolicy::Forward | FillPolicy::ForwardThenBackward => {
                    if observed.is_some() {
                        carry = observed;
                    }
                    carry
                }
            };
            out.push(value);
        }

        if policy == FillPolicy::ForwardThenBackward {
            // Leading gap: back-fill from the first value at or after the window start
            let first_known = out
                .iter()
                .flatten()
                .next()
                .copied()
                .or_else(|| self.points.range(start..).next().map(|(_, v)| *v));
            if let Some(first) = first_known {
                for slot in out.iter_mut() {
                    if slot.is_some() {
                        break;
                    }
                    *slot = Some(first);
                }
            }
        }

        out
    }
}

impl FromIterator<(NaiveDate, Decimal)> for DailySeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Decimal)>>(iter: I) -> Self {
        let mut series = DailySeries::new();
        for (date, value) in iter {
            series.insert(date, value);
        }
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn sample() -> DailySeries {
        // Friday and Tuesday observations with a weekend and Monday holiday in between
        [(d(8), dec!(100)), (d(12), dec!(104))].into_iter().collect()
    }

    #[test]
    fn test_align_without_fill_keeps_gaps() {
        let aligned = sample().align(d(7), d(12), FillPolicy::None);
        assert_eq!(
            aligned,
            vec![None, Some(dec!(100)), None, None, None, Some(dec!(104))]
        );
    }

    #[test]
    fn test_forward_fill_leaves_leading_gap() {
        let aligned = sample().align(d(7), d(13), FillPolicy::Forward);
        assert_eq!(aligned[0], None);
        assert_eq!(aligned[1..5], [Some(dec!(100)); 4]);
        assert_eq!(aligned[5], Some(dec!(104)));
        assert_eq!(aligned[6], Some(dec!(104)));
    }

    #[test]
    fn test_forward_then_backward_fills_leading_gap() {
        let aligned = sample().align(d(5), d(9), FillPolicy::ForwardThenBackward);
        assert_eq!(aligned, vec![Some(dec!(100)); 5]);
    }

    #[test]
    fn test_window_after_last_observation_carries_it() {
        let aligned = sample().align(d(20), d(21), FillPolicy::Forward);
        assert_eq!(aligned, vec![Some(dec!(104)), Some(dec!(104))]);
    }

    #[test]
    fn test_window_before_first_observation_backfills_from_later_point() {
        let aligned = sample().align(d(1), d(3), FillPolicy::ForwardThenBackward);
        assert_eq!(aligned, vec![Some(dec!(100)); 3]);
    }

    #[test]
    fn test_empty_series_stays_empty_under_every_policy() {
        let empty = DailySeries::new();
        for policy in [FillPolicy::None, FillPolicy::Forward, FillPolicy::ForwardThenBackward] {
            assert!(empty.align(d(1), d(3), policy).iter().all(Option::is_none));
        }
    }

    #[test]
    fn test_latest_on_or_before() {
        let s = sample();
        assert_eq!(s.latest_on_or_before(d(7)), None);
        assert_eq!(s.latest_on_or_before(d(10)), Some(dec!(100)));
        assert_eq!(s.latest_on_or_before(d(12)), Some(dec!(104)));
    }
}
