//! Reminder notifications.
//!
//! # Responsibility
//! - Define the notification payload handed to delivery backends.
//! - Provide the [`Notifier`] seam and a log-only backend.
//! - Run the daily reminder sweep ([`NotificationWorker`]).
//!
//! # Invariants
//! - Only tasks carry the mark-completed action.
//! - Notification ids come from the persisted counter and never repeat.

use crate::model::date::format_due_date;
use crate::model::item::{ItemKind, PlannerItem, TaskId};
use crate::model::route::Route;
use crate::repo::RepoError;
use crate::service::settings_service::{NotificationPriority, SettingsError};
use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod worker;

pub use worker::{NotificationWorker, SweepReport};

/// Quick action offered next to the default tap action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationAction {
    MarkCompleted { task_id: TaskId },
}

impl NotificationAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::MarkCompleted { .. } => "Mark as completed",
        }
    }
}

/// One reminder ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: i64,
    pub kind: ItemKind,
    pub item_id: i64,
    pub title: String,
    pub body: String,
    pub priority: NotificationPriority,
    pub tap_route: Route,
    pub action: Option<NotificationAction>,
}

impl Notification {
    /// Builds the reminder for `item` whose subject is named `subject_name`.
    pub fn for_item<I: PlannerItem>(
        id: i64,
        item: &I,
        subject_name: &str,
        priority: NotificationPriority,
        today: NaiveDate,
    ) -> Self {
        let due = format_due_date(item.due_date(), today, true);
        let body = match I::KIND {
            ItemKind::Task => format!(
                "Your {subject_name} task \"{}\" is due {due}.",
                item.title()
            ),
            ItemKind::Exam => format!(
                "Your {subject_name} exam \"{}\" takes place {due}.",
                item.title()
            ),
        };
        let action = I::KIND
            .is_completable()
            .then_some(NotificationAction::MarkCompleted { task_id: item.id() });

        Self {
            id,
            kind: I::KIND,
            item_id: item.id(),
            title: format!("{subject_name}: {}", item.title()),
            body,
            priority,
            tap_route: I::KIND.view_route(item.id()),
            action,
        }
    }
}

/// Delivery backend for reminder notifications.
pub trait Notifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
    /// Dismisses a previously delivered notification.
    fn cancel(&self, notification_id: i64) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).notify(notification)
    }

    fn cancel(&self, notification_id: i64) -> Result<(), NotifyError> {
        (**self).cancel(notification_id)
    }
}

/// Backend that only writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            "event=notify module=notify status=ok id={} kind={} item_id={} priority={} route={}",
            notification.id,
            notification.kind,
            notification.item_id,
            notification.priority,
            notification.tap_route
        );
        Ok(())
    }

    fn cancel(&self, notification_id: i64) -> Result<(), NotifyError> {
        info!("event=notify_cancel module=notify status=ok id={notification_id}");
        Ok(())
    }
}

#[derive(Debug)]
pub enum NotifyError {
    /// The backend could not deliver or dismiss a notification.
    Delivery(String),
    TaskNotFound(TaskId),
    Settings(SettingsError),
    Repo(RepoError),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delivery(message) => write!(f, "notification delivery failed: {message}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Settings(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NotifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Settings(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Delivery(_) | Self::TaskNotFound(_) => None,
        }
    }
}

impl From<RepoError> for NotifyError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SettingsError> for NotifyError {
    fn from(value: SettingsError) -> Self {
        match value {
            SettingsError::Repo(err) => Self::Repo(err),
            other => Self::Settings(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::{Exam, Task};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn task_notification_offers_mark_completed() {
        let task = Task {
            id: 7,
            title: "Worksheet".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            reminder: today(),
            subject_id: 1,
            description: None,
            completed: false,
        };

        let notification =
            Notification::for_item(3, &task, "Math", NotificationPriority::High, today());

        assert_eq!(notification.title, "Math: Worksheet");
        assert_eq!(notification.body, "Your Math task \"Worksheet\" is due tomorrow.");
        assert_eq!(notification.tap_route.to_string(), "view_task/7");
        assert_eq!(
            notification.action,
            Some(NotificationAction::MarkCompleted { task_id: 7 })
        );
    }

    #[test]
    fn exam_notification_has_no_action() {
        let exam = Exam {
            id: 4,
            title: "Midterm".to_string(),
            due_date: today(),
            reminder: today(),
            subject_id: 2,
            description: None,
        };

        let notification =
            Notification::for_item(1, &exam, "Physics", NotificationPriority::Default, today());

        assert_eq!(notification.title, "Physics: Midterm");
        assert!(notification.body.ends_with("takes place today."));
        assert_eq!(notification.tap_route.to_string(), "view_test/4");
        assert_eq!(notification.action, None);
    }
}
