use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::errors::ValidationError;

/// Timezone in which account statements are dated.
pub const DEFAULT_VALUATION_TZ: Tz = chrono_tz::Asia::Seoul;

/// Converts a UTC instant to a valuation date in the given timezone.
pub fn valuation_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Today's valuation date in [`DEFAULT_VALUATION_TZ`].
pub fn valuation_date_today() -> NaiveDate {
    valuation_date_from_utc(Utc::now(), DEFAULT_VALUATION_TZ)
}

/// Every calendar day from `start` to `end`, both inclusive.
pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::with_capacity(days_in_range(start, end));
    let mut current = start;
    while current <= end {
        days.push(current);
        if let Some(next) = current.succ_opt() {
            current = next;
        } else {
            break;
        }
    }
    days
}

/// Number of calendar days in `[start, end]`, zero when the range is inverted.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> usize {
    if start > end {
        0
    } else {
        (end - start).num_days() as usize + 1
    }
}

/// Checks that `dates` ascend one calendar day at a time.
pub fn ensure_contiguous_days<I>(dates: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut dates = dates.into_iter();
    let Some(mut previous) = dates.next() else {
        return Ok(());
    };
    for date in dates {
        match previous.succ_opt() {
            Some(expected) if expected == date => previous = date,
            Some(expected) => {
                return Err(ValidationError::NonContiguousDays {
                    expected,
                    found: date,
                })
            }
            None => {
                return Err(ValidationError::NonContiguousDays {
                    expected: previous,
                    found: date,
                })
            }
        }
    }
    Ok(())
}

/// Finds the row dated `date` in rows sorted by date.
///
/// Tries the contiguous offset first and falls back to a binary search, so
/// rows assembled outside the engines still resolve correctly.
pub fn find_by_date<T, F>(rows: &[T], date: NaiveDate, date_of: F) -> Option<&T>
where
    F: Fn(&T) -> NaiveDate,
{
    let start = date_of(rows.first()?);
    let offset = (date - start).num_days();
    if offset < 0 {
        return None;
    }
    if let Some(row) = usize::try_from(offset).ok().and_then(|i| rows.get(i)) {
        if date_of(row) == date {
            return Some(row);
        }
    }
    rows.binary_search_by_key(&date, &date_of)
        .ok()
        .map(|i| &rows[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_get_days_between_is_inclusive() {
        let days = get_days_between(d(2024, 2, 27), d(2024, 3, 1));
        assert_eq!(
            days,
            vec![d(2024, 2, 27), d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)]
        );
        assert_eq!(days_in_range(d(2024, 2, 27), d(2024, 3, 1)), 4);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert!(get_days_between(d(2024, 3, 1), d(2024, 2, 1)).is_empty());
        assert_eq!(days_in_range(d(2024, 3, 1), d(2024, 2, 1)), 0);
    }

    #[test]
    fn test_ensure_contiguous_days() {
        assert!(ensure_contiguous_days(Vec::new()).is_ok());
        assert!(ensure_contiguous_days(get_days_between(d(2024, 2, 27), d(2024, 3, 2))).is_ok());

        let err = ensure_contiguous_days([d(2024, 1, 1), d(2024, 1, 5)]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NonContiguousDays { expected, found }
                if expected == d(2024, 1, 2) && found == d(2024, 1, 5)
        ));
        assert!(ensure_contiguous_days([d(2024, 1, 2), d(2024, 1, 1)]).is_err());
        assert!(ensure_contiguous_days([d(2024, 1, 2), d(2024, 1, 2)]).is_err());
    }

    #[test]
    fn test_find_by_date_with_gap() {
        let rows = [d(2024, 1, 1), d(2024, 1, 5), d(2024, 1, 6)];
        assert_eq!(find_by_date(&rows, d(2024, 1, 5), |r| *r), Some(&d(2024, 1, 5)));
        assert_eq!(find_by_date(&rows, d(2024, 1, 6), |r| *r), Some(&d(2024, 1, 6)));
        assert_eq!(find_by_date(&rows, d(2024, 1, 2), |r| *r), None);
        assert_eq!(find_by_date(&rows, d(2023, 12, 31), |r| *r), None);

        let contiguous = get_days_between(d(2024, 1, 1), d(2024, 1, 10));
        assert_eq!(
            find_by_date(&contiguous, d(2024, 1, 7), |r| *r),
            Some(&d(2024, 1, 7))
        );
    }

    #[test]
    fn test_valuation_date_crosses_midnight() {
        // 16:00 UTC is already the next day in Seoul
        let instant = Utc.with_ymd_and_hms(2024, 6, 30, 16, 0, 0).unwrap();
        assert_eq!(
            valuation_date_from_utc(instant, DEFAULT_VALUATION_TZ),
            d(2024, 7, 1)
        );
    }
}
