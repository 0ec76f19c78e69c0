//! Add/edit form model and validation.
//!
//! # Responsibility
//! - Hold the shared fields (due date, reminder, subject) and per-entry
//!   fields of the add form, which creates one item per entry.
//! - Report field-level errors synchronously, before any store access.
//! - Convert a valid form into insert shapes, or into an updated record for
//!   edits.
//!
//! # Invariants
//! - Entry overrides win over shared reminder/subject values.
//! - Built items always satisfy `reminder <= due_date`.

use crate::model::item::{Exam, NewExam, NewTask, Task};
use crate::model::reminder::ReminderSelection;
use crate::model::subject::SubjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Message shown for any invalid form, next to the field markers.
pub const FORM_ERROR_MESSAGE: &str = "Please fill in all required fields";

/// One item being added through the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormEntry {
    pub title: String,
    pub description: String,
    /// Overrides the shared reminder for this entry.
    pub reminder: Option<ReminderSelection>,
    /// Overrides the shared subject for this entry.
    pub subject_id: Option<SubjectId>,
}

impl FormEntry {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.reminder.is_none()
            && self.subject_id.is_none()
    }
}

/// Add/edit form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemForm {
    pub due_date: Option<NaiveDate>,
    pub reminder: Option<ReminderSelection>,
    pub subject_id: Option<SubjectId>,
    pub entries: Vec<FormEntry>,
}

impl Default for ItemForm {
    /// A fresh form always shows one entry.
    fn default() -> Self {
        Self {
            due_date: None,
            reminder: None,
            subject_id: None,
            entries: vec![FormEntry::default()],
        }
    }
}

/// Form field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    DueDate,
    Reminder,
    Subject,
    /// Entry title at the given index is blank.
    Title(usize),
    /// Entry reminder override at the given index falls after the due date.
    EntryReminder(usize),
    /// No entries, or more than one entry on an edit form.
    EntryCount,
}

/// Field-level validation result of a form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FormErrors {
    pub fields: Vec<FormField>,
}

impl FormErrors {
    pub fn contains(&self, field: FormField) -> bool {
        self.fields.contains(&field)
    }
}

impl Display for FormErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(FORM_ERROR_MESSAGE)?;
        if !self.fields.is_empty() {
            let fields = self
                .fields
                .iter()
                .map(|field| match field {
                    FormField::DueDate => "due date".to_string(),
                    FormField::Reminder => "reminder".to_string(),
                    FormField::Subject => "subject".to_string(),
                    FormField::Title(index) => format!("title of entry {}", index + 1),
                    FormField::EntryReminder(index) => {
                        format!("reminder of entry {}", index + 1)
                    }
                    FormField::EntryCount => "entries".to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, " ({fields})")?;
        }
        Ok(())
    }
}

impl Error for FormErrors {}

/// Entry with shared values and overrides resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedEntry {
    title: String,
    description: Option<String>,
    due_date: NaiveDate,
    reminder: NaiveDate,
    subject_id: SubjectId,
}

impl ItemForm {
    /// Edit form prefilled from a stored task.
    pub fn from_task(task: &Task) -> Self {
        Self::prefilled(
            &task.title,
            task.description.as_deref(),
            task.due_date,
            task.reminder,
            task.subject_id,
        )
    }

    /// Edit form prefilled from a stored exam.
    pub fn from_exam(exam: &Exam) -> Self {
        Self::prefilled(
            &exam.title,
            exam.description.as_deref(),
            exam.due_date,
            exam.reminder,
            exam.subject_id,
        )
    }

    fn prefilled(
        title: &str,
        description: Option<&str>,
        due_date: NaiveDate,
        reminder: NaiveDate,
        subject_id: SubjectId,
    ) -> Self {
        Self {
            due_date: Some(due_date),
            reminder: Some(ReminderSelection::from_dates(due_date, reminder)),
            subject_id: Some(subject_id),
            entries: vec![FormEntry {
                title: title.to_string(),
                description: description.unwrap_or_default().to_string(),
                reminder: None,
                subject_id: None,
            }],
        }
    }

    /// Nothing has been entered yet; leaving the form needs no confirmation.
    pub fn is_empty(&self) -> bool {
        self.due_date.is_none()
            && self.reminder.is_none()
            && self.subject_id.is_none()
            && self.entries.iter().all(FormEntry::is_empty)
    }

    /// Checks every field and reports all failures at once.
    pub fn validate(&self) -> Result<(), FormErrors> {
        self.resolve().map(|_| ())
    }

    /// Builds one task per entry.
    pub fn build_tasks(&self) -> Result<Vec<NewTask>, FormErrors> {
        Ok(self
            .resolve()?
            .into_iter()
            .map(|entry| NewTask {
                title: entry.title,
                due_date: entry.due_date,
                reminder: entry.reminder,
                subject_id: entry.subject_id,
                description: entry.description,
                completed: false,
            })
            .collect())
    }

    /// Builds one exam per entry.
    pub fn build_exams(&self) -> Result<Vec<NewExam>, FormErrors> {
        Ok(self
            .resolve()?
            .into_iter()
            .map(|entry| NewExam {
                title: entry.title,
                due_date: entry.due_date,
                reminder: entry.reminder,
                subject_id: entry.subject_id,
                description: entry.description,
            })
            .collect())
    }

    /// Applies a single-entry edit form to a stored task, keeping `completed`.
    pub fn apply_to_task(&self, task: &Task) -> Result<Task, FormErrors> {
        let entry = self.resolve_single()?;
        Ok(Task {
            id: task.id,
            title: entry.title,
            due_date: entry.due_date,
            reminder: entry.reminder,
            subject_id: entry.subject_id,
            description: entry.description,
            completed: task.completed,
        })
    }

    /// Applies a single-entry edit form to a stored exam.
    pub fn apply_to_exam(&self, exam: &Exam) -> Result<Exam, FormErrors> {
        let entry = self.resolve_single()?;
        Ok(Exam {
            id: exam.id,
            title: entry.title,
            due_date: entry.due_date,
            reminder: entry.reminder,
            subject_id: entry.subject_id,
            description: entry.description,
        })
    }

    fn resolve_single(&self) -> Result<ResolvedEntry, FormErrors> {
        let mut entries = self.resolve()?;
        if entries.len() != 1 {
            return Err(FormErrors {
                fields: vec![FormField::EntryCount],
            });
        }
        entries.pop().ok_or(FormErrors {
            fields: vec![FormField::EntryCount],
        })
    }

    fn resolve(&self) -> Result<Vec<ResolvedEntry>, FormErrors> {
        let mut fields = Vec::new();
        if self.due_date.is_none() {
            fields.push(FormField::DueDate);
        }
        if self.reminder.is_none() {
            fields.push(FormField::Reminder);
        }
        if self.subject_id.is_none() {
            fields.push(FormField::Subject);
        }
        if self.entries.is_empty() {
            fields.push(FormField::EntryCount);
        }
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.title.trim().is_empty() {
                fields.push(FormField::Title(index));
            }
        }

        let (Some(due_date), Some(shared_reminder), Some(shared_subject)) =
            (self.due_date, self.reminder, self.subject_id)
        else {
            return Err(FormErrors { fields });
        };

        let shared_reminder_date = shared_reminder.reminder_date(due_date);
        if shared_reminder_date > due_date {
            fields.push(FormField::Reminder);
        }

        let mut resolved = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter().enumerate() {
            let reminder = match entry.reminder {
                Some(selection) => {
                    let date = selection.reminder_date(due_date);
                    if date > due_date {
                        fields.push(FormField::EntryReminder(index));
                    }
                    date
                }
                None => shared_reminder_date,
            };
            let description = entry.description.trim();
            resolved.push(ResolvedEntry {
                title: entry.title.trim().to_string(),
                description: (!description.is_empty()).then(|| description.to_string()),
                due_date,
                reminder,
                subject_id: entry.subject_id.unwrap_or(shared_subject),
            });
        }

        if !fields.is_empty() {
            return Err(FormErrors { fields });
        }
        Ok(resolved)
    }
}
