//! Calendar components for timestamp-derived directory names
//!
//! Week numbering follows ISO-8601: week 1 is the week containing the
//! year's first Thursday, so the ISO year can differ from the calendar year
//! around the Dec 31 / Jan 1 boundary. That spill-over is intentional and
//! must not be "corrected": a run started on 2024-12-30 writes under
//! `2025/01`.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

/// Formatted calendar components of one timestamp
///
/// The week field is digit-only and zero-padded; the earlier letter-prefixed
/// week format is retired and paths written under it do not migrate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarComponents {
    /// 4-digit ISO year
    pub year: String,
    /// 2-digit zero-padded ISO week, `"01"`..`"53"`
    pub week: String,
    /// 4-digit month + day, e.g. `"0107"`
    pub monthday: String,
    /// 6-digit hour + minute + second, e.g. `"181520"`
    pub time: String,
}

impl CalendarComponents {
    /// Derive the components of `timestamp`; total, never fails
    #[must_use]
    pub fn from_timestamp(timestamp: NaiveDateTime) -> Self {
        let iso = timestamp.date().iso_week();
        Self {
            year: format!("{:04}", iso.year()),
            week: format!("{:02}", iso.week()),
            monthday: format!("{:02}{:02}", timestamp.month(), timestamp.day()),
            time: format!(
                "{:02}{:02}{:02}",
                timestamp.hour(),
                timestamp.minute(),
                timestamp.second()
            ),
        }
    }

    /// `yyyymmdd` form of the same date, used for ephemeral roots
    #[must_use]
    pub fn date_compact(timestamp: NaiveDateTime) -> String {
        format!(
            "{:04}{:02}{:02}",
            timestamp.year(),
            timestamp.month(),
            timestamp.day()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn components_of_reference_timestamp() {
        let c = CalendarComponents::from_timestamp(at(2025, 1, 7, 18, 15, 20));
        assert_eq!(c.year, "2025");
        assert_eq!(c.week, "02");
        assert_eq!(c.monthday, "0107");
        assert_eq!(c.time, "181520");
    }

    #[test]
    fn late_december_spills_into_next_iso_year() {
        let c = CalendarComponents::from_timestamp(at(2024, 12, 30, 0, 0, 0));
        assert_eq!(c.year, "2025");
        assert_eq!(c.week, "01");
    }

    #[test]
    fn early_january_can_belong_to_previous_iso_year() {
        // 2021-01-01 was a Friday; ISO places it in 2020's week 53.
        let c = CalendarComponents::from_timestamp(at(2021, 1, 1, 12, 0, 0));
        assert_eq!(c.year, "2020");
        assert_eq!(c.week, "53");
    }

    #[test]
    fn date_compact_uses_calendar_year() {
        assert_eq!(
            CalendarComponents::date_compact(at(2024, 12, 30, 8, 0, 0)),
            "20241230",
        );
    }

    proptest! {
        #[test]
        fn week_is_always_two_digits_in_range(
            days in 0i64..36_500,
            secs in 0u32..86_400,
        ) {
            let date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
                + chrono::Duration::days(days);
            let ts = date.and_hms_opt(secs / 3600, (secs / 60) % 60, secs % 60).unwrap();

            let c = CalendarComponents::from_timestamp(ts);
            prop_assert_eq!(c.week.len(), 2);
            prop_assert!(c.week.chars().all(|ch| ch.is_ascii_digit()));
            let n: u32 = c.week.parse().unwrap();
            prop_assert!((1..=53).contains(&n));
        }

        #[test]
        fn monthday_and_time_are_fixed_width(
            days in 0i64..36_500,
            secs in 0u32..86_400,
        ) {
            let date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
                + chrono::Duration::days(days);
            let ts = date.and_hms_opt(secs / 3600, (secs / 60) % 60, secs % 60).unwrap();

            let c = CalendarComponents::from_timestamp(ts);
            prop_assert_eq!(c.monthday.len(), 4);
            prop_assert_eq!(c.time.len(), 6);
            prop_assert_eq!(c.year.len(), 4);
        }
    }
}
