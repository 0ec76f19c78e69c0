//! Reminder-offset palette and resolver.
//!
//! # Responsibility
//! - Map a `(due date, reminder date)` pair to a palette index and back.
//! - Describe reminders for display, falling back to the literal date for
//!   gaps outside the palette.
//!
//! # Invariants
//! - Palette indices are `0..=6`; every other gap resolves to
//!   [`CUSTOM_REMINDER_INDEX`].
//! - Resolution never fails; callers handle the custom sentinel.

use crate::model::date::{days_between, format_long_date};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Sentinel index for reminder gaps that are not in the palette.
pub const CUSTOM_REMINDER_INDEX: i32 = -1;

/// Fixed reminder choices offered by add/edit forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderOffset {
    SameDay,
    OneDayBefore,
    TwoDaysBefore,
    ThreeDaysBefore,
    FourDaysBefore,
    OneWeekBefore,
    TwoWeeksBefore,
}

impl ReminderOffset {
    /// Palette in index order.
    pub const ALL: [Self; 7] = [
        Self::SameDay,
        Self::OneDayBefore,
        Self::TwoDaysBefore,
        Self::ThreeDaysBefore,
        Self::FourDaysBefore,
        Self::OneWeekBefore,
        Self::TwoWeeksBefore,
    ];

    /// Position of this choice in the palette.
    pub fn index(self) -> i32 {
        match self {
            Self::SameDay => 0,
            Self::OneDayBefore => 1,
            Self::TwoDaysBefore => 2,
            Self::ThreeDaysBefore => 3,
            Self::FourDaysBefore => 4,
            Self::OneWeekBefore => 5,
            Self::TwoWeeksBefore => 6,
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Days between the reminder and the due date.
    pub fn days_before(self) -> u64 {
        match self {
            Self::SameDay => 0,
            Self::OneDayBefore => 1,
            Self::TwoDaysBefore => 2,
            Self::ThreeDaysBefore => 3,
            Self::FourDaysBefore => 4,
            Self::OneWeekBefore => 7,
            Self::TwoWeeksBefore => 14,
        }
    }

    pub fn from_days_before(days: i64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|offset| i64::try_from(offset.days_before()).ok() == Some(days))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SameDay => "Same day",
            Self::OneDayBefore => "1 day before",
            Self::TwoDaysBefore => "2 days before",
            Self::ThreeDaysBefore => "3 days before",
            Self::FourDaysBefore => "4 days before",
            Self::OneWeekBefore => "1 week before",
            Self::TwoWeeksBefore => "2 weeks before",
        }
    }

    /// Reminder date for a given due date.
    ///
    /// Saturates at the earliest representable date instead of panicking.
    pub fn reminder_date(self, due_date: NaiveDate) -> NaiveDate {
        due_date
            .checked_sub_days(Days::new(self.days_before()))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl Display for ReminderOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolves the palette index for a due/reminder pair.
///
/// Returns [`CUSTOM_REMINDER_INDEX`] for any gap outside the palette,
/// including reminders after the due date.
pub fn resolve_index(due_date: NaiveDate, reminder: NaiveDate) -> i32 {
    ReminderOffset::from_days_before(days_between(reminder, due_date))
        .map_or(CUSTOM_REMINDER_INDEX, ReminderOffset::index)
}

/// Inverse of [`resolve_index`].
///
/// The custom sentinel and unknown indices have no date; the caller must
/// supply one explicitly.
pub fn reminder_date_for_index(due_date: NaiveDate, index: i32) -> Option<NaiveDate> {
    ReminderOffset::from_index(index).map(|offset| offset.reminder_date(due_date))
}

/// Palette label for the pair, or the literal reminder date when custom.
pub fn describe_reminder(due_date: NaiveDate, reminder: NaiveDate) -> String {
    match ReminderOffset::from_index(resolve_index(due_date, reminder)) {
        Some(offset) => offset.label().to_string(),
        None => format_long_date(reminder),
    }
}

/// Reminder choice as held by a form: a palette entry or an explicit date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderSelection {
    Offset(ReminderOffset),
    Date(NaiveDate),
}

impl ReminderSelection {
    /// Selection that reproduces a stored due/reminder pair.
    pub fn from_dates(due_date: NaiveDate, reminder: NaiveDate) -> Self {
        match ReminderOffset::from_index(resolve_index(due_date, reminder)) {
            Some(offset) => Self::Offset(offset),
            None => Self::Date(reminder),
        }
    }

    /// Concrete reminder date for the given due date.
    pub fn reminder_date(self, due_date: NaiveDate) -> NaiveDate {
        match self {
            Self::Offset(offset) => offset.reminder_date(due_date),
            Self::Date(date) => date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 20).unwrap()
    }

    fn days_before(days: u64) -> NaiveDate {
        due() - Days::new(days)
    }

    #[test]
    fn small_gaps_resolve_to_their_day_count_and_back() {
        for days in 0..=4u64 {
            let reminder = days_before(days);
            let index = resolve_index(due(), reminder);
            assert_eq!(i64::from(index), days as i64);
            assert_eq!(reminder_date_for_index(due(), index), Some(reminder));
        }
    }

    #[test]
    fn week_gaps_use_dedicated_indices() {
        assert_eq!(resolve_index(due(), days_before(7)), 5);
        assert_eq!(resolve_index(due(), days_before(14)), 6);
        assert_eq!(resolve_index(due(), days_before(3)), 3);
        assert_eq!(reminder_date_for_index(due(), 5), Some(days_before(7)));
        assert_eq!(reminder_date_for_index(due(), 6), Some(days_before(14)));
    }

    #[test]
    fn other_gaps_are_custom() {
        assert_eq!(resolve_index(due(), days_before(20)), CUSTOM_REMINDER_INDEX);
        assert_eq!(resolve_index(due(), days_before(5)), CUSTOM_REMINDER_INDEX);
        assert_eq!(
            resolve_index(due(), due() + Days::new(1)),
            CUSTOM_REMINDER_INDEX
        );
    }

    #[test]
    fn custom_and_unknown_indices_are_not_invertible() {
        assert_eq!(reminder_date_for_index(due(), CUSTOM_REMINDER_INDEX), None);
        assert_eq!(reminder_date_for_index(due(), 7), None);
        assert_eq!(reminder_date_for_index(due(), -2), None);
    }

    #[test]
    fn describe_falls_back_to_literal_date() {
        assert_eq!(describe_reminder(due(), days_before(7)), "1 week before");
        assert_eq!(describe_reminder(due(), days_before(10)), "November 10, 2026");
    }

    #[test]
    fn selection_from_dates_round_trips_custom_dates() {
        let custom = days_before(9);
        assert_eq!(
            ReminderSelection::from_dates(due(), custom),
            ReminderSelection::Date(custom)
        );
        assert_eq!(
            ReminderSelection::from_dates(due(), days_before(1)),
            ReminderSelection::Offset(ReminderOffset::OneDayBefore)
        );
        assert_eq!(
            ReminderSelection::Date(custom).reminder_date(due()),
            custom
        );
    }
}
