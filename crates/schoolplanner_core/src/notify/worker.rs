//! Daily reminder sweep over the planner store.

use super::{Notification, Notifier, NotifyError};
use crate::model::item::{ItemKind, PlannerItem, TaskId};
use crate::model::subject::{Subject, SubjectId};
use crate::repo::exam_repo::{ExamRepository, SqliteExamRepository};
use crate::repo::preference_repo::SqlitePreferenceRepository;
use crate::repo::subject_repo::{SqliteSubjectRepository, SubjectRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::RepoResult;
use crate::service::home_service::purge_expired;
use crate::service::settings_service::{
    NotificationIdCounter, NotificationSettings, SettingsService,
};
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub expired_tasks: usize,
    pub expired_exams: usize,
    /// Ids of delivered notifications, in delivery order.
    pub delivered: Vec<i64>,
    pub skipped: usize,
    pub last_notification_id: i64,
}

/// Sweeps expired items and posts reminders for items whose reminder date
/// has arrived.
pub struct NotificationWorker<'conn, N: Notifier> {
    tasks: SqliteTaskRepository<'conn>,
    exams: SqliteExamRepository<'conn>,
    subjects: SqliteSubjectRepository<'conn>,
    settings: SettingsService<SqlitePreferenceRepository<'conn>>,
    notifier: N,
}

impl<'conn, N: Notifier> NotificationWorker<'conn, N> {
    /// Constructs a worker from a migrated connection.
    pub fn try_new(conn: &'conn Connection, notifier: N) -> RepoResult<Self> {
        Ok(Self {
            tasks: SqliteTaskRepository::try_new(conn)?,
            exams: SqliteExamRepository::try_new(conn)?,
            subjects: SqliteSubjectRepository::try_new(conn)?,
            settings: SettingsService::new(SqlitePreferenceRepository::try_new(conn)?),
            notifier,
        })
    }

    pub fn settings(&self) -> Result<NotificationSettings, NotifyError> {
        Ok(self.settings.load_notification_settings()?)
    }

    /// Runs one sweep for `today`.
    ///
    /// Expired items are deleted before reminders are considered. Items whose
    /// subject cannot be resolved, or whose delivery fails, are logged and
    /// skipped. The counter is persisted once the sweep ends, including when
    /// it ends early with an error after some ids were handed out.
    pub fn run(&self, today: NaiveDate) -> Result<SweepReport, NotifyError> {
        info!("event=notification_sweep module=notify status=start today={today}");
        let settings = self.settings.load_notification_settings()?;
        let mut counter = self.settings.notification_counter()?;
        let mut report = SweepReport::default();

        let swept = self.sweep(today, &settings, &mut counter, &mut report);
        let persisted = self.settings.persist_counter(&counter);
        if let Err(err) = swept {
            if let Err(persist_err) = persisted {
                warn!(
                    "event=notification_counter module=notify status=error last_id={} error={persist_err}",
                    counter.last()
                );
            }
            warn!(
                "event=notification_sweep module=notify status=error delivered={} last_id={} error={err}",
                report.delivered.len(),
                counter.last()
            );
            return Err(err);
        }
        persisted?;

        report.last_notification_id = counter.last();
        info!(
            "event=notification_sweep module=notify status=ok delivered={} skipped={} expired_tasks={} expired_exams={} last_id={}",
            report.delivered.len(),
            report.skipped,
            report.expired_tasks,
            report.expired_exams,
            report.last_notification_id
        );
        Ok(report)
    }

    fn sweep(
        &self,
        today: NaiveDate,
        settings: &NotificationSettings,
        counter: &mut NotificationIdCounter,
        report: &mut SweepReport,
    ) -> Result<(), NotifyError> {
        let mut subjects = SubjectCache::default();

        let tasks = self.tasks.list_tasks()?;
        let (expired, pending) = partition_expired(&tasks, today);
        report.expired_tasks = purge_expired(ItemKind::Task, &expired, |id| {
            self.tasks.delete_task(id)
        });
        self.deliver(&pending, today, settings, counter, &mut subjects, report);

        let exams = self.exams.list_exams()?;
        let (expired, pending) = partition_expired(&exams, today);
        report.expired_exams = purge_expired(ItemKind::Exam, &expired, |id| {
            self.exams.delete_exam(id)
        });
        self.deliver(&pending, today, settings, counter, &mut subjects, report);
        Ok(())
    }

    /// Quick action from a task notification: dismisses it and marks the task
    /// completed. Already completed tasks are left untouched.
    pub fn mark_completed(&self, notification_id: i64, task_id: TaskId) -> Result<(), NotifyError> {
        if let Err(err) = self.notifier.cancel(notification_id) {
            warn!(
                "event=notify_cancel module=notify status=error id={notification_id} error={err}"
            );
        }

        let task = self
            .tasks
            .get_task(task_id)?
            .ok_or(NotifyError::TaskNotFound(task_id))?;
        if task.completed {
            info!("event=mark_completed module=notify status=skip task_id={task_id}");
            return Ok(());
        }
        self.tasks.set_task_completed(task_id, true)?;
        info!(
            "event=mark_completed module=notify status=ok task_id={task_id} notification_id={notification_id}"
        );
        Ok(())
    }

    fn deliver<I: PlannerItem>(
        &self,
        items: &[&I],
        today: NaiveDate,
        settings: &NotificationSettings,
        counter: &mut NotificationIdCounter,
        subjects: &mut SubjectCache,
        report: &mut SweepReport,
    ) {
        for item in items.iter().filter(|item| item.reminder_due(today)) {
            let kind = I::KIND;
            let Some(subject) = subjects.resolve(&self.subjects, item.subject_id()) else {
                warn!(
                    "event=notify module=notify status=skip kind={kind} item_id={} reason=subject_missing subject_id={}",
                    item.id(),
                    item.subject_id()
                );
                report.skipped += 1;
                continue;
            };

            let notification = Notification::for_item(
                counter.next_id(),
                *item,
                &subject.name,
                settings.priority,
                today,
            );
            match self.notifier.notify(&notification) {
                Ok(()) => report.delivered.push(notification.id),
                Err(err) => {
                    warn!(
                        "event=notify module=notify status=error kind={kind} item_id={} id={} error={err}",
                        item.id(),
                        notification.id
                    );
                    report.skipped += 1;
                }
            }
        }
    }
}

fn partition_expired<I: PlannerItem>(items: &[I], today: NaiveDate) -> (Vec<i64>, Vec<&I>) {
    let mut expired = Vec::new();
    let mut pending = Vec::new();
    for item in items {
        if item.is_expired(today) {
            expired.push(item.id());
        } else {
            pending.push(item);
        }
    }
    (expired, pending)
}

/// Per-sweep memo of subject lookups; misses are remembered too.
#[derive(Default)]
struct SubjectCache {
    entries: HashMap<SubjectId, Option<Subject>>,
}

impl SubjectCache {
    fn resolve<R: SubjectRepository>(&mut self, repo: &R, id: SubjectId) -> Option<&Subject> {
        self.entries
            .entry(id)
            .or_insert_with(|| match repo.get_subject(id) {
                Ok(subject) => subject,
                Err(err) => {
                    warn!("event=subject_lookup module=notify status=error subject_id={id} error={err}");
                    None
                }
            })
            .as_ref()
    }
}
