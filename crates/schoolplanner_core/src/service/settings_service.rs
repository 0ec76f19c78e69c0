//! Notification settings and the notification-id counter.
//!
//! # Responsibility
//! - Load and save the user's notification hour and priority.
//! - Persist the last used notification id across sweeps and restarts.
//!
//! # Invariants
//! - `target_hour` is within `0..=23`.
//! - The stored last notification id never decreases.

use crate::repo::preference_repo::PreferenceRepository;
use crate::repo::RepoError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const NOTIFICATIONS_NAMESPACE: &str = "notifications";
const TARGET_HOUR_KEY: &str = "target_hour";
const PRIORITY_KEY: &str = "priority";
const LAST_NOTIFICATION_ID_KEY: &str = "last_notification_id";

/// Hour of day the daily sweep runs at unless configured otherwise.
pub const DEFAULT_TARGET_HOUR: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    #[default]
    Default,
    High,
}

impl NotificationPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Default => "default",
            Self::High => "high",
        }
    }
}

impl Display for NotificationPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationPriority {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "default" => Ok(Self::Default),
            "high" => Ok(Self::High),
            _ => Err(SettingsError::InvalidPriority(value.to_string())),
        }
    }
}

/// User-chosen notification behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub target_hour: u8,
    pub priority: NotificationPriority,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            target_hour: DEFAULT_TARGET_HOUR,
            priority: NotificationPriority::Default,
        }
    }
}

impl NotificationSettings {
    pub fn new(target_hour: u8, priority: NotificationPriority) -> Result<Self, SettingsError> {
        if target_hour > 23 {
            return Err(SettingsError::InvalidHour(i64::from(target_hour)));
        }
        Ok(Self {
            target_hour,
            priority,
        })
    }
}

#[derive(Debug)]
pub enum SettingsError {
    InvalidHour(i64),
    InvalidPriority(String),
    Repo(RepoError),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHour(hour) => write!(f, "notification hour must be 0-23, got {hour}"),
            Self::InvalidPriority(value) => write!(
                f,
                "unsupported notification priority `{value}`; expected low|default|high"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SettingsError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Hands out strictly increasing notification ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationIdCounter {
    last: i64,
}

impl NotificationIdCounter {
    pub fn starting_after(last: i64) -> Self {
        Self { last }
    }

    pub fn next_id(&mut self) -> i64 {
        self.last += 1;
        self.last
    }

    pub fn last(&self) -> i64 {
        self.last
    }
}

/// Settings facade over a preference repository.
pub struct SettingsService<P: PreferenceRepository> {
    prefs: P,
}

impl<P: PreferenceRepository> SettingsService<P> {
    pub fn new(prefs: P) -> Self {
        Self { prefs }
    }

    /// Loads settings; unreadable stored values fall back to defaults.
    pub fn load_notification_settings(&self) -> Result<NotificationSettings, SettingsError> {
        let defaults = NotificationSettings::default();

        let target_hour = match self.prefs.get_i64(NOTIFICATIONS_NAMESPACE, TARGET_HOUR_KEY) {
            Ok(Some(hour)) => match u8::try_from(hour).ok().filter(|hour| *hour <= 23) {
                Some(hour) => hour,
                None => {
                    warn!("event=settings_load module=settings status=fallback key={TARGET_HOUR_KEY} value={hour}");
                    defaults.target_hour
                }
            },
            Ok(None) => defaults.target_hour,
            Err(RepoError::InvalidData(message)) => {
                warn!("event=settings_load module=settings status=fallback key={TARGET_HOUR_KEY} error={message}");
                defaults.target_hour
            }
            Err(err) => return Err(err.into()),
        };

        let priority = match self.prefs.get_value(NOTIFICATIONS_NAMESPACE, PRIORITY_KEY)? {
            Some(value) => value.parse().unwrap_or_else(|_| {
                warn!("event=settings_load module=settings status=fallback key={PRIORITY_KEY} value={value}");
                defaults.priority
            }),
            None => defaults.priority,
        };

        Ok(NotificationSettings {
            target_hour,
            priority,
        })
    }

    pub fn save_notification_settings(
        &self,
        settings: &NotificationSettings,
    ) -> Result<(), SettingsError> {
        let validated = NotificationSettings::new(settings.target_hour, settings.priority)?;
        self.prefs.set_i64(
            NOTIFICATIONS_NAMESPACE,
            TARGET_HOUR_KEY,
            i64::from(validated.target_hour),
        )?;
        self.prefs.set_value(
            NOTIFICATIONS_NAMESPACE,
            PRIORITY_KEY,
            validated.priority.as_str(),
        )?;
        Ok(())
    }

    /// Counter positioned after the last persisted notification id.
    pub fn notification_counter(&self) -> Result<NotificationIdCounter, SettingsError> {
        let last = self
            .prefs
            .get_i64(NOTIFICATIONS_NAMESPACE, LAST_NOTIFICATION_ID_KEY)?
            .unwrap_or(0);
        Ok(NotificationIdCounter::starting_after(last))
    }

    /// Persists the counter unless a larger id is already stored.
    pub fn persist_counter(&self, counter: &NotificationIdCounter) -> Result<(), SettingsError> {
        let stored = self
            .prefs
            .get_i64(NOTIFICATIONS_NAMESPACE, LAST_NOTIFICATION_ID_KEY)?
            .unwrap_or(0);
        if counter.last() > stored {
            self.prefs.set_i64(
                NOTIFICATIONS_NAMESPACE,
                LAST_NOTIFICATION_ID_KEY,
                counter.last(),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!(
            " HIGH ".parse::<NotificationPriority>().unwrap(),
            NotificationPriority::High
        );
        assert!("urgent".parse::<NotificationPriority>().is_err());
    }

    #[test]
    fn hour_outside_day_is_rejected() {
        assert!(NotificationSettings::new(23, NotificationPriority::Low).is_ok());
        assert!(matches!(
            NotificationSettings::new(24, NotificationPriority::Low),
            Err(SettingsError::InvalidHour(24))
        ));
    }

    #[test]
    fn counter_is_strictly_increasing() {
        let mut counter = NotificationIdCounter::starting_after(41);
        assert_eq!(counter.next_id(), 42);
        assert_eq!(counter.next_id(), 43);
        assert_eq!(counter.last(), 43);
    }
}
