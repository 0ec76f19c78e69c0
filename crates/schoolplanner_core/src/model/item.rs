//! Task and exam domain models.
//!
//! # Responsibility
//! - Define the persisted shapes of tasks and exams.
//! - Expose a shared read view ([`PlannerItem`]) so bucketing and the
//!   notification sweep treat both kinds uniformly.
//!
//! # Invariants
//! - `reminder <= due_date` for every stored item.
//! - Titles are non-blank after trimming.
//! - Only tasks carry a completion flag.

use crate::model::route::Route;
use crate::model::subject::SubjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaskId = i64;
pub type ExamId = i64;

/// Kind of plannable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Task,
    Exam,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Exam => "exam",
        }
    }

    /// Only tasks can be marked completed.
    pub fn is_completable(self) -> bool {
        matches!(self, Self::Task)
    }

    /// Detail route for an item of this kind.
    pub fn view_route(self, id: i64) -> Route {
        match self {
            Self::Task => Route::ViewTask(id),
            Self::Exam => Route::ViewExam(id),
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub due_date: NaiveDate,
    pub reminder: NaiveDate,
    pub subject_id: SubjectId,
    pub description: Option<String>,
    pub completed: bool,
}

/// Insert shape for a task; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub due_date: NaiveDate,
    pub reminder: NaiveDate,
    pub subject_id: SubjectId,
    pub description: Option<String>,
    pub completed: bool,
}

/// Persisted exam record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    pub id: ExamId,
    pub title: String,
    pub due_date: NaiveDate,
    pub reminder: NaiveDate,
    pub subject_id: SubjectId,
    pub description: Option<String>,
}

/// Insert shape for an exam; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExam {
    pub title: String,
    pub due_date: NaiveDate,
    pub reminder: NaiveDate,
    pub subject_id: SubjectId,
    pub description: Option<String>,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_item_fields(&self.title, self.due_date, self.reminder)
    }

    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            due_date: self.due_date,
            reminder: self.reminder,
            subject_id: self.subject_id,
            description: self.description,
            completed: self.completed,
        }
    }
}

impl NewExam {
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_item_fields(&self.title, self.due_date, self.reminder)
    }

    pub fn into_exam(self, id: ExamId) -> Exam {
        Exam {
            id,
            title: self.title,
            due_date: self.due_date,
            reminder: self.reminder,
            subject_id: self.subject_id,
            description: self.description,
        }
    }
}

impl Task {
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_item_fields(&self.title, self.due_date, self.reminder)
    }
}

impl Exam {
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_item_fields(&self.title, self.due_date, self.reminder)
    }
}

/// Read view shared by tasks and exams.
pub trait PlannerItem {
    const KIND: ItemKind;

    fn id(&self) -> i64;
    fn title(&self) -> &str;
    fn due_date(&self) -> NaiveDate;
    fn reminder(&self) -> NaiveDate;
    fn subject_id(&self) -> SubjectId;

    /// Whether the item no longer needs reminding (completed tasks).
    fn is_settled(&self) -> bool {
        false
    }

    /// Due date has passed; the item is swept on the next read.
    fn is_expired(&self, today: NaiveDate) -> bool {
        self.due_date() < today
    }

    /// Reminder has arrived and the item still wants a notification.
    fn reminder_due(&self, today: NaiveDate) -> bool {
        !self.is_settled() && self.reminder() <= today
    }
}

impl PlannerItem for Task {
    const KIND: ItemKind = ItemKind::Task;

    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    fn reminder(&self) -> NaiveDate {
        self.reminder
    }

    fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    fn is_settled(&self) -> bool {
        self.completed
    }
}

impl PlannerItem for Exam {
    const KIND: ItemKind = ItemKind::Exam;

    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    fn reminder(&self) -> NaiveDate {
        self.reminder
    }

    fn subject_id(&self) -> SubjectId {
        self.subject_id
    }
}

/// Validation failures shared by tasks and exams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptyTitle,
    ReminderAfterDue {
        due_date: NaiveDate,
        reminder: NaiveDate,
    },
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be blank"),
            Self::ReminderAfterDue { due_date, reminder } => write!(
                f,
                "reminder {reminder} must not be after due date {due_date}"
            ),
        }
    }
}

impl Error for ItemValidationError {}

fn validate_item_fields(
    title: &str,
    due_date: NaiveDate,
    reminder: NaiveDate,
) -> Result<(), ItemValidationError> {
    if title.trim().is_empty() {
        return Err(ItemValidationError::EmptyTitle);
    }
    if reminder > due_date {
        return Err(ItemValidationError::ReminderAfterDue { due_date, reminder });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn task(completed: bool) -> Task {
        Task {
            id: 1,
            title: "Worksheet".to_string(),
            due_date: date(20),
            reminder: date(18),
            subject_id: 1,
            description: None,
            completed,
        }
    }

    #[test]
    fn reminder_after_due_is_rejected() {
        let mut item = task(false);
        item.reminder = date(21);
        assert!(matches!(
            item.validate(),
            Err(ItemValidationError::ReminderAfterDue { .. })
        ));
    }

    #[test]
    fn completed_tasks_do_not_want_reminders() {
        assert!(task(false).reminder_due(date(18)));
        assert!(!task(false).reminder_due(date(17)));
        assert!(!task(true).reminder_due(date(19)));
    }

    #[test]
    fn expiry_is_strictly_before_today() {
        assert!(!task(false).is_expired(date(20)));
        assert!(task(false).is_expired(date(21)));
    }
}
