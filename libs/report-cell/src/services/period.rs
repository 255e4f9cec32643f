use chrono::{Datelike, Duration, NaiveDate};

use crate::models::Period;

/// Inclusive date range covered by a report period around `anchor`.
/// Weeks start on Monday.
pub fn period_range(period: Period, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    match period {
        Period::Day => (anchor, anchor),
        Period::Week => {
            let start = anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64);
            (start, start + Duration::days(6))
        }
        Period::Month => {
            let start = anchor.with_day(1).unwrap_or(anchor);
            let next_month = if start.month() == 12 {
                NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
            };
            let end = next_month
                .map(|d| d - Duration::days(1))
                .unwrap_or(anchor);
            (start, end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn day_range_is_single_day() {
        assert_eq!(
            period_range(Period::Day, d(2024, 6, 12)),
            (d(2024, 6, 12), d(2024, 6, 12))
        );
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-06-12 is a Wednesday.
        assert_eq!(
            period_range(Period::Week, d(2024, 6, 12)),
            (d(2024, 6, 10), d(2024, 6, 16))
        );
        // A Monday anchor starts its own week.
        assert_eq!(
            period_range(Period::Week, d(2024, 6, 10)),
            (d(2024, 6, 10), d(2024, 6, 16))
        );
    }

    #[test]
    fn month_covers_calendar_month() {
        assert_eq!(
            period_range(Period::Month, d(2024, 2, 15)),
            (d(2024, 2, 1), d(2024, 2, 29))
        );
        assert_eq!(
            period_range(Period::Month, d(2023, 12, 31)),
            (d(2023, 12, 1), d(2023, 12, 31))
        );
    }
}
