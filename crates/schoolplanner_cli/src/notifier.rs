//! Terminal delivery backend for reminder notifications.

use log::info;
use schoolplanner_core::{Notification, NotificationAction, Notifier, NotifyError};
use std::io::Write;

/// Prints notifications to stdout, as text or one JSON object per line.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    json: bool,
}

impl ConsoleNotifier {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn write(&self, text: &str) -> Result<(), NotifyError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}").map_err(|err| NotifyError::Delivery(err.to_string()))
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.json {
            let line = serde_json::to_string(notification)
                .map_err(|err| NotifyError::Delivery(err.to_string()))?;
            return self.write(&line);
        }

        let mut text = format!(
            "[#{}] {} ({} priority)\n    {}\n    open: {}",
            notification.id,
            notification.title,
            notification.priority,
            notification.body,
            notification.tap_route
        );
        if let Some(action @ NotificationAction::MarkCompleted { task_id }) = notification.action {
            text.push_str(&format!(
                "\n    {}: schoolplanner mark-complete --notification {} --task {task_id}",
                action.label(),
                notification.id
            ));
        }
        self.write(&text)?;
        info!(
            "event=notify module=cli status=ok id={} kind={}",
            notification.id, notification.kind
        );
        Ok(())
    }

    fn cancel(&self, notification_id: i64) -> Result<(), NotifyError> {
        if self.json {
            return self.write(&format!("{{\"dismissed\":{notification_id}}}"));
        }
        self.write(&format!("dismissed notification #{notification_id}"))
    }
}
