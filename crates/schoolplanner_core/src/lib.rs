//! Core domain logic for the school planner.
//! Subjects, tasks and exams live here together with the reminder rules,
//! home-screen bucketing and the daily notification sweep.

pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod schedule;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::item::{Exam, ExamId, ItemKind, NewExam, NewTask, PlannerItem, Task, TaskId};
pub use model::reminder::{ReminderOffset, ReminderSelection};
pub use model::route::Route;
pub use model::subject::{Color, NewSubject, Subject, SubjectId};
pub use notify::{
    LogNotifier, Notification, NotificationAction, NotificationWorker, Notifier, NotifyError,
    SweepReport,
};
pub use repo::{RepoError, RepoResult};
pub use schedule::{
    delay_until_next_run, next_run_after, next_run_at, run_scheduled_sweep, sweep_time, ScheduledRun,
};
pub use service::form::{FormEntry, FormErrors, ItemForm};
pub use service::settings_service::{NotificationPriority, NotificationSettings};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
