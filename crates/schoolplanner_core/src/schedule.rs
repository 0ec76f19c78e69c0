//! Daily scheduling of the notification sweep.
//!
//! # Responsibility
//! - Compute when the next sweep runs from the configured target hour.
//! - Run one sweep against a database path, tolerating an unreachable store.
//!
//! # Invariants
//! - The next run is never in the past relative to `now`.
//! - The slot handed out after a sweep is strictly later than the sweep's
//!   own time, so one slot is never swept twice.
//! - A failed run still yields a next run time; there is no retry or backoff
//!   beyond the following day.

use crate::db::open_db;
use crate::notify::{NotificationWorker, Notifier, NotifyError, SweepReport};
use crate::service::settings_service::NotificationSettings;
use chrono::{Days, NaiveDateTime, NaiveTime};
use log::{info, warn};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Next occurrence of `target_hour:00:00` at or after `now`.
///
/// Hours past 23 are clamped to 23.
pub fn next_run_at(now: NaiveDateTime, target_hour: u8) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(u32::from(target_hour.min(23)), 0, 0)
        .unwrap_or_default();
    let today_run = now.date().and_time(time);
    if today_run < now {
        today_run
            .checked_add_days(Days::new(1))
            .unwrap_or(today_run)
    } else {
        today_run
    }
}

/// Next slot after a sweep that ran at `ran_at`; strictly later than it.
pub fn next_run_after(ran_at: NaiveDateTime, target_hour: u8) -> NaiveDateTime {
    let next = next_run_at(ran_at, target_hour);
    if next > ran_at {
        next
    } else {
        next.checked_add_days(Days::new(1)).unwrap_or(next)
    }
}

/// Time a sweep for `slot` runs at when the timer wakes at `woke_at`.
///
/// An early wake-up is clamped to the slot so the sweep uses the slot's date.
pub fn sweep_time(slot: NaiveDateTime, woke_at: NaiveDateTime) -> NaiveDateTime {
    woke_at.max(slot)
}

/// Wall-clock delay from `now` until the next run.
pub fn delay_until_next_run(now: NaiveDateTime, target_hour: u8) -> Duration {
    (next_run_at(now, target_hour) - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Result of one scheduled sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledRun {
    /// `None` when the store could not be opened or the sweep failed.
    pub report: Option<SweepReport>,
    pub settings: NotificationSettings,
    pub next_run: NaiveDateTime,
}

/// Opens the store at `db_path`, runs the sweep for `now`'s date and
/// schedules the next run, strictly after `now`, from the stored target hour.
pub fn run_scheduled_sweep<N: Notifier>(
    db_path: &Path,
    notifier: N,
    now: NaiveDateTime,
) -> ScheduledRun {
    let (report, settings) = match sweep_once(db_path, notifier, now) {
        Ok((report, settings)) => (Some(report), settings),
        Err(err) => {
            warn!("event=scheduled_sweep module=schedule status=error error={err}");
            (None, NotificationSettings::default())
        }
    };

    let next_run = next_run_after(now, settings.target_hour);
    info!(
        "event=scheduled_sweep module=schedule status=ok delivered={} next_run={next_run}",
        report.as_ref().map_or(0, |report| report.delivered.len())
    );
    ScheduledRun {
        report,
        settings,
        next_run,
    }
}

fn sweep_once<N: Notifier>(
    db_path: &Path,
    notifier: N,
    now: NaiveDateTime,
) -> Result<(SweepReport, NotificationSettings), NotifyError> {
    let conn = open_db(db_path).map_err(|err| NotifyError::Repo(err.into()))?;
    let worker = NotificationWorker::try_new(&conn, notifier)?;
    let settings = worker.settings()?;
    let report = worker.run(now.date())?;
    Ok((report, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn runs_later_today_when_hour_is_ahead() {
        assert_eq!(next_run_at(at(18, 9, 30), 12), at(18, 12, 0));
    }

    #[test]
    fn runs_tomorrow_when_hour_has_passed() {
        assert_eq!(next_run_at(at(18, 12, 1), 12), at(19, 12, 0));
    }

    #[test]
    fn exact_hour_runs_now() {
        assert_eq!(next_run_at(at(18, 12, 0), 12), at(18, 12, 0));
        assert_eq!(delay_until_next_run(at(18, 12, 0), 12), Duration::ZERO);
    }

    #[test]
    fn run_at_slot_hands_off_to_tomorrow() {
        assert_eq!(next_run_after(at(18, 12, 0), 12), at(19, 12, 0));
        assert_eq!(next_run_after(at(18, 12, 7), 12), at(19, 12, 0));
    }

    #[test]
    fn run_before_slot_keeps_todays_slot() {
        assert_eq!(next_run_after(at(18, 9, 30), 12), at(18, 12, 0));
    }

    #[test]
    fn changed_hour_applies_after_run() {
        assert_eq!(next_run_after(at(18, 12, 0), 15), at(18, 15, 0));
        assert_eq!(next_run_after(at(18, 12, 0), 8), at(19, 8, 0));
    }

    #[test]
    fn early_wake_is_clamped_to_slot() {
        let slot = at(18, 12, 0);
        let early = slot - chrono::Duration::milliseconds(3);
        assert_eq!(sweep_time(slot, early), slot);
        assert_eq!(sweep_time(slot, at(18, 12, 2)), at(18, 12, 2));
    }

    #[test]
    fn daemon_hand_off_never_repeats_a_slot() {
        let mut slot = next_run_at(at(18, 11, 0), 12);
        let mut swept = Vec::new();
        for _ in 0..3 {
            // Timer fires early every time and the wall clock lags behind.
            let woke_at = slot - chrono::Duration::seconds(1);
            let ran_at = sweep_time(slot, woke_at);
            swept.push(ran_at.date());
            slot = next_run_after(ran_at, 12);
        }
        assert_eq!(
            swept,
            vec![at(18, 0, 0).date(), at(19, 0, 0).date(), at(20, 0, 0).date()]
        );
        assert_eq!(slot, at(21, 12, 0));
    }

    #[test]
    fn delay_spans_midnight() {
        assert_eq!(
            delay_until_next_run(at(18, 23, 0), 6),
            Duration::from_secs(7 * 60 * 60)
        );
    }

    #[test]
    fn month_end_rolls_into_next_month() {
        let now = at(31, 20, 0);
        assert_eq!(
            next_run_at(now, 8),
            NaiveDate::from_ymd_opt(2026, 11, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        );
    }
}
