//! Calendar-day helpers shared by storage, bucketing and notifications.
//!
//! Dates are persisted as epoch days (days since 1970-01-01), so every
//! comparison in the planner is done at day granularity.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// `NaiveDate::num_days_from_ce()` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Converts a calendar date to its epoch day.
pub fn to_epoch_day(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE
}

/// Converts an epoch day back to a calendar date.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn from_epoch_day(epoch_day: i64) -> Option<NaiveDate> {
    let days_from_ce = i32::try_from(epoch_day.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days_from_ce)
}

/// Signed number of days from `earlier` to `later`.
pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// Monday of the calendar week following `today`.
pub fn start_of_next_week(today: NaiveDate) -> NaiveDate {
    let monday = today.week(Weekday::Mon).first_day();
    monday + Days::new(7)
}

/// Human-readable phrase for a due date relative to `today`.
///
/// With `with_preposition` the phrase reads inside a sentence
/// ("is due tomorrow", "is due on October 20, 2026").
pub fn format_due_date(date: NaiveDate, today: NaiveDate, with_preposition: bool) -> String {
    let next_week = start_of_next_week(today);
    match days_between(today, date) {
        0 => pick(with_preposition, "Today", "today"),
        1 => pick(with_preposition, "Tomorrow", "tomorrow"),
        2 => pick(with_preposition, "In two days", "in two days"),
        _ if date >= next_week && date < next_week + Days::new(7) => {
            let weekday = date.format("%A");
            if with_preposition {
                format!("next week on {weekday}")
            } else {
                format!("Next week, {weekday}")
            }
        }
        _ => {
            let long = format_long_date(date);
            if with_preposition {
                format!("on {long}")
            } else {
                long
            }
        }
    }
}

/// Long date form, e.g. `October 20, 2026`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn pick(with_preposition: bool, standalone: &str, inline: &str) -> String {
    if with_preposition {
        inline.to_string()
    } else {
        standalone.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn epoch_day_matches_known_values() {
        assert_eq!(to_epoch_day(date(1970, 1, 1)), 0);
        assert_eq!(to_epoch_day(date(1970, 1, 2)), 1);
        assert_eq!(to_epoch_day(date(1969, 12, 31)), -1);
        assert_eq!(to_epoch_day(date(2000, 1, 1)), 10_957);
    }

    #[test]
    fn from_epoch_day_inverts_to_epoch_day() {
        let original = date(2026, 10, 18);
        assert_eq!(from_epoch_day(to_epoch_day(original)), Some(original));
        assert_eq!(from_epoch_day(i64::MAX), None);
    }

    #[test]
    fn start_of_next_week_is_following_monday() {
        // 2026-10-18 is a Sunday.
        assert_eq!(start_of_next_week(date(2026, 10, 18)), date(2026, 10, 19));
        // 2026-10-19 is a Monday.
        assert_eq!(start_of_next_week(date(2026, 10, 19)), date(2026, 10, 26));
    }

    #[test]
    fn format_due_date_uses_relative_phrases() {
        let today = date(2026, 10, 14); // Wednesday
        assert_eq!(format_due_date(today, today, false), "Today");
        assert_eq!(format_due_date(date(2026, 10, 15), today, true), "tomorrow");
        assert_eq!(format_due_date(date(2026, 10, 16), today, true), "in two days");
        assert_eq!(
            format_due_date(date(2026, 10, 21), today, true),
            "next week on Wednesday"
        );
        assert_eq!(
            format_due_date(date(2026, 10, 17), today, false),
            "October 17, 2026"
        );
        assert_eq!(
            format_due_date(date(2026, 11, 2), today, true),
            "on November 2, 2026"
        );
    }
}
