//! Monday-first week arithmetic.

use chrono::{Datelike, Days, NaiveDate};

use super::types::DAYS_IN_WEEK;

/// Monday of the ISO week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Sunday of the week starting `monday`.
#[must_use]
pub fn week_end(monday: NaiveDate) -> NaiveDate {
    day_of_week(monday, DAYS_IN_WEEK - 1)
}

/// The `index`th day (0 = Monday) of the week starting `monday`.
#[must_use]
pub fn day_of_week(monday: NaiveDate, index: usize) -> NaiveDate {
    monday + Days::new(index as u64)
}

/// All seven days of the week starting `monday`.
#[must_use]
pub fn days(monday: NaiveDate) -> [NaiveDate; DAYS_IN_WEEK] {
    std::array::from_fn(|i| day_of_week(monday, i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2025, 1, 6), date(2025, 1, 6))]
    #[case(date(2025, 1, 8), date(2025, 1, 6))]
    #[case(date(2025, 1, 12), date(2025, 1, 6))]
    #[case(date(2025, 1, 1), date(2024, 12, 30))]
    fn test_week_start(#[case] day: NaiveDate, #[case] monday: NaiveDate) {
        assert_eq!(week_start(day), monday);
    }

    #[test]
    fn test_week_days() {
        let monday = date(2024, 12, 30);
        let days = days(monday);
        assert_eq!(days[0], monday);
        assert_eq!(days[6], date(2025, 1, 5));
        assert_eq!(week_end(monday), date(2025, 1, 5));
        // ISO week 1 of 2025 starts in 2024.
        assert_eq!(monday.iso_week().week(), 1);
        assert_eq!(monday.iso_week().year(), 2025);
    }
}
