//! Command handlers over an open planner store.

use crate::cli::{
    AddItemArgs, Command, EditItemArgs, ExamCommand, SettingsCommand, SubjectCommand, TaskCommand,
};
use crate::notifier::ConsoleNotifier;
use crate::output::{Output, SubjectIndex};
use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use schoolplanner_core::repo::exam_repo::SqliteExamRepository;
use schoolplanner_core::repo::preference_repo::SqlitePreferenceRepository;
use schoolplanner_core::repo::subject_repo::SqliteSubjectRepository;
use schoolplanner_core::repo::task_repo::SqliteTaskRepository;
use schoolplanner_core::service::exam_service::ExamService;
use schoolplanner_core::service::home_service::HomeService;
use schoolplanner_core::service::settings_service::{NotificationSettings, SettingsService};
use schoolplanner_core::service::subject_service::{SubjectService, SubjectServiceError};
use schoolplanner_core::service::task_service::TaskService;
use schoolplanner_core::{Color, FormEntry, ItemForm, NewSubject, NotificationWorker, Subject};
use serde_json::json;

type Subjects<'c> = SubjectService<SqliteSubjectRepository<'c>>;
type Tasks<'c> = TaskService<SqliteTaskRepository<'c>, SqliteSubjectRepository<'c>>;
type Exams<'c> = ExamService<SqliteExamRepository<'c>, SqliteSubjectRepository<'c>>;

/// Runs every command except `daemon`, which owns its own loop.
pub fn dispatch(command: Command, conn: &Connection, out: &Output) -> Result<()> {
    match command {
        Command::Subject(command) => subject(command, conn, out),
        Command::Task(command) => task(command, conn, out),
        Command::Exam(command) => exam(command, conn, out),
        Command::Home => home(conn, out),
        Command::Reminders { due } => out.reminder_palette(due),
        Command::Settings(command) => settings(command, conn, out),
        Command::Sweep => sweep(conn, out),
        Command::MarkComplete { notification, task } => {
            let worker = NotificationWorker::try_new(conn, ConsoleNotifier::new(out.is_json()))?;
            worker
                .mark_completed(notification, task)
                .with_context(|| format!("failed to complete task {task}"))?;
            out.done(
                &format!("Task #{task} marked as completed."),
                &json!({ "task_id": task, "completed": true }),
            )
        }
        Command::Daemon => bail!("daemon is handled by the runtime loop"),
    }
}

fn subjects(conn: &Connection) -> Result<Subjects<'_>> {
    Ok(SubjectService::new(SqliteSubjectRepository::try_new(conn)?))
}

fn tasks(conn: &Connection) -> Result<Tasks<'_>> {
    Ok(TaskService::new(
        SqliteTaskRepository::try_new(conn)?,
        SqliteSubjectRepository::try_new(conn)?,
    ))
}

fn exams(conn: &Connection) -> Result<Exams<'_>> {
    Ok(ExamService::new(
        SqliteExamRepository::try_new(conn)?,
        SqliteSubjectRepository::try_new(conn)?,
    ))
}

fn subject_index(conn: &Connection) -> Result<SubjectIndex> {
    Ok(SubjectIndex::new(subjects(conn)?.list_subjects()?))
}

fn subject(command: SubjectCommand, conn: &Connection, out: &Output) -> Result<()> {
    let service = subjects(conn)?;
    match command {
        SubjectCommand::Add {
            name,
            abbreviation,
            color,
        } => {
            let color = color.unwrap_or_else(|| Color::for_name(&name));
            let subject = service.create_subject(NewSubject::new(name, abbreviation, color))?;
            out.done(&format!("Added subject #{}.", subject.id), &subject)
        }
        SubjectCommand::List => out.subjects(&service.list_subjects()?),
        SubjectCommand::Edit {
            id,
            name,
            abbreviation,
            color,
        } => {
            let current = service.get_subject(id)?;
            let updated = Subject {
                id,
                name: name.map_or(current.name, |name| name.trim().to_string()),
                abbreviation: abbreviation
                    .map_or(current.abbreviation, |value| value.trim().to_string()),
                color: color.unwrap_or(current.color),
            };
            service.update_subject(&updated)?;
            out.done(&format!("Updated subject #{id}."), &updated)
        }
        SubjectCommand::Delete { id, with_items } => {
            if with_items {
                let removed = service.delete_with_items(id)?;
                return out.done(
                    &format!(
                        "Deleted subject #{id} with {} task(s) and {} exam(s).",
                        removed.tasks, removed.exams
                    ),
                    &removed,
                );
            }
            match service.delete_subject(id) {
                Ok(()) => out.done(&format!("Deleted subject #{id}."), &json!({ "deleted": id })),
                Err(SubjectServiceError::SubjectInUse { usage, .. }) => bail!(
                    "subject #{id} is used by {} task(s) and {} exam(s); use `subject migrate {id} --to <subject>` or `subject delete {id} --with-items`",
                    usage.tasks,
                    usage.exams
                ),
                Err(err) => Err(err.into()),
            }
        }
        SubjectCommand::Migrate { id, to } => {
            let moved = service.reassign_and_delete(id, to)?;
            out.done(
                &format!(
                    "Moved {} task(s) and {} exam(s) to subject #{to}; deleted subject #{id}.",
                    moved.tasks, moved.exams
                ),
                &moved,
            )
        }
    }
}

fn add_form(args: AddItemArgs) -> ItemForm {
    let mut descriptions = args.descriptions.into_iter();
    ItemForm {
        due_date: Some(args.due),
        reminder: Some(args.reminder),
        subject_id: Some(args.subject),
        entries: args
            .titles
            .into_iter()
            .map(|title| FormEntry {
                description: descriptions.next().unwrap_or_default(),
                ..FormEntry::titled(title)
            })
            .collect(),
    }
}

fn apply_edits(form: &mut ItemForm, fields: EditItemArgs) {
    if let Some(due) = fields.due {
        form.due_date = Some(due);
    }
    if let Some(reminder) = fields.reminder {
        form.reminder = Some(reminder);
    }
    if let Some(subject) = fields.subject {
        form.subject_id = Some(subject);
    }
    if let Some(entry) = form.entries.first_mut() {
        if let Some(title) = fields.title {
            entry.title = title;
        }
        if let Some(description) = fields.description {
            entry.description = description;
        }
    }
}

fn task(command: TaskCommand, conn: &Connection, out: &Output) -> Result<()> {
    let service = tasks(conn)?;
    match command {
        TaskCommand::Add(args) => {
            let ids = service.add_from_form(&add_form(args))?;
            out.done(&format!("Added {} task(s): {ids:?}.", ids.len()), &ids)
        }
        TaskCommand::List { open } => {
            let mut list = service.list_tasks()?;
            if open {
                list.retain(|task| !task.completed);
            }
            out.tasks(&list, &subject_index(conn)?)
        }
        TaskCommand::Show { id } => out.task_detail(&service.get_task(id)?, &subject_index(conn)?),
        TaskCommand::Edit { id, fields } => {
            let mut form = service.edit_form(id)?;
            apply_edits(&mut form, fields);
            let task = service.update_from_form(id, &form)?;
            out.done(&format!("Updated task #{id}."), &task)
        }
        TaskCommand::Complete { id } => {
            service.set_completed(id, true)?;
            out.done(&format!("Task #{id} completed."), &json!({ "task_id": id, "completed": true }))
        }
        TaskCommand::Reopen { id } => {
            service.set_completed(id, false)?;
            out.done(&format!("Task #{id} reopened."), &json!({ "task_id": id, "completed": false }))
        }
        TaskCommand::Delete { id } => {
            service.delete_task(id)?;
            out.done(&format!("Deleted task #{id}."), &json!({ "deleted": id }))
        }
    }
}

fn exam(command: ExamCommand, conn: &Connection, out: &Output) -> Result<()> {
    let service = exams(conn)?;
    match command {
        ExamCommand::Add(args) => {
            let ids = service.add_from_form(&add_form(args))?;
            out.done(&format!("Added {} exam(s): {ids:?}.", ids.len()), &ids)
        }
        ExamCommand::List => out.exams(&service.list_exams()?, &subject_index(conn)?),
        ExamCommand::Show { id } => out.exam_detail(&service.get_exam(id)?, &subject_index(conn)?),
        ExamCommand::Edit { id, fields } => {
            let mut form = service.edit_form(id)?;
            apply_edits(&mut form, fields);
            let exam = service.update_from_form(id, &form)?;
            out.done(&format!("Updated exam #{id}."), &exam)
        }
        ExamCommand::Delete { id } => {
            service.delete_exam(id)?;
            out.done(&format!("Deleted exam #{id}."), &json!({ "deleted": id }))
        }
    }
}

fn home(conn: &Connection, out: &Output) -> Result<()> {
    let service = HomeService::new(
        SqliteTaskRepository::try_new(conn)?,
        SqliteExamRepository::try_new(conn)?,
    );
    let board = service.load_board(out.today())?;
    out.home(&board, &subject_index(conn)?)
}

fn settings(command: SettingsCommand, conn: &Connection, out: &Output) -> Result<()> {
    let service = SettingsService::new(SqlitePreferenceRepository::try_new(conn)?);
    let current = service.load_notification_settings()?;
    match command {
        SettingsCommand::Show => out.done(
            &format!(
                "Daily reminders at {:02}:00, {} priority.",
                current.target_hour, current.priority
            ),
            &current,
        ),
        SettingsCommand::Set { hour, priority } => {
            let updated = NotificationSettings::new(
                hour.unwrap_or(current.target_hour),
                priority.unwrap_or(current.priority),
            )?;
            service.save_notification_settings(&updated)?;
            out.done(
                &format!(
                    "Daily reminders at {:02}:00, {} priority.",
                    updated.target_hour, updated.priority
                ),
                &updated,
            )
        }
    }
}

fn sweep(conn: &Connection, out: &Output) -> Result<()> {
    let worker = NotificationWorker::try_new(conn, ConsoleNotifier::new(out.is_json()))?;
    let report = worker.run(out.today()).context("reminder sweep failed")?;
    if out.is_json() {
        // Notifications already went out as JSON lines.
        return Ok(());
    }
    println!(
        "Sent {} reminder(s), skipped {}, removed {} expired task(s) and {} expired exam(s).",
        report.delivered.len(),
        report.skipped,
        report.expired_tasks,
        report.expired_exams
    );
    Ok(())
}
