//! Daily reminder loop.
//!
//! Sleeps until the configured hour, runs one sweep, and repeats until
//! Ctrl+C. The target hour is re-read from the store after every run, and
//! each run hands off to a slot strictly after itself.

use crate::notifier::ConsoleNotifier;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use log::{info, warn};
use schoolplanner_core::repo::preference_repo::SqlitePreferenceRepository;
use schoolplanner_core::service::settings_service::{NotificationSettings, SettingsService};
use schoolplanner_core::{next_run_at, open_db, run_scheduled_sweep, sweep_time};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn run(db_path: PathBuf, notifier: ConsoleNotifier) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(daily_loop(&db_path, notifier))
}

async fn daily_loop(db_path: &Path, notifier: ConsoleNotifier) -> Result<()> {
    let mut next_run = next_run_at(now(), stored_settings(db_path).target_hour);
    info!("event=daemon_start module=cli status=ok next_run={next_run}");
    println!("Next reminder sweep at {next_run}. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = tokio::time::sleep(until(next_run)) => {
                let run = run_scheduled_sweep(db_path, &notifier, sweep_time(next_run, now()));
                next_run = run.next_run;
                println!("Next reminder sweep at {next_run}.");
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    warn!("event=daemon_stop module=cli status=error error={err}");
                }
                info!("event=daemon_stop module=cli status=ok");
                return Ok(());
            }
        }
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn until(next_run: NaiveDateTime) -> Duration {
    (next_run - now()).to_std().unwrap_or(Duration::ZERO)
}

fn stored_settings(db_path: &Path) -> NotificationSettings {
    let loaded = open_db(db_path)
        .map_err(|err| err.to_string())
        .and_then(|conn| {
            let prefs = SqlitePreferenceRepository::try_new(&conn).map_err(|err| err.to_string())?;
            SettingsService::new(prefs)
                .load_notification_settings()
                .map_err(|err| err.to_string())
        });
    loaded.unwrap_or_else(|err| {
        warn!("event=daemon_start module=cli status=fallback error={err}");
        NotificationSettings::default()
    })
}
