//! Subject repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `subjects`.
//! - Own the multi-table subject deletion flows (reassign or cascade) so
//!   they run in one transaction.
//!
//! # Invariants
//! - `delete_subject` never removes a subject that tasks or exams still
//!   reference; the foreign key rejects it.
//! - `reassign_and_delete` and `delete_with_items` are all-or-nothing.

use crate::model::subject::{Color, NewSubject, Subject, SubjectId};
use crate::repo::{ensure_connection_ready, expect_changed, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

const SUBJECT_SELECT_SQL: &str = "SELECT id, name, abbreviation, color FROM subjects";

/// Reference counts for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SubjectUsage {
    pub tasks: u32,
    pub exams: u32,
}

impl SubjectUsage {
    pub fn is_unused(&self) -> bool {
        self.tasks == 0 && self.exams == 0
    }
}

/// Repository interface for subject operations.
pub trait SubjectRepository {
    fn create_subject(&self, subject: &NewSubject) -> RepoResult<SubjectId>;
    fn update_subject(&self, subject: &Subject) -> RepoResult<()>;
    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>>;
    /// Lists all subjects ordered by name.
    fn list_subjects(&self) -> RepoResult<Vec<Subject>>;
    fn delete_subject(&self, id: SubjectId) -> RepoResult<()>;
    /// Counts tasks and exams that reference the subject.
    fn subject_usage(&self, id: SubjectId) -> RepoResult<SubjectUsage>;
    /// Moves every task and exam from `from` to `to`, then deletes `from`.
    fn reassign_and_delete(&self, from: SubjectId, to: SubjectId) -> RepoResult<SubjectUsage>;
    /// Deletes the subject together with all its tasks and exams.
    fn delete_with_items(&self, id: SubjectId) -> RepoResult<SubjectUsage>;
}

/// SQLite-backed subject repository.
pub struct SqliteSubjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubjectRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SubjectRepository for SqliteSubjectRepository<'_> {
    fn create_subject(&self, subject: &NewSubject) -> RepoResult<SubjectId> {
        subject.validate()?;

        self.conn.execute(
            "INSERT INTO subjects (name, abbreviation, color) VALUES (?1, ?2, ?3);",
            params![
                subject.name.as_str(),
                subject.abbreviation.as_str(),
                i64::from(subject.color.argb()),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_subject(&self, subject: &Subject) -> RepoResult<()> {
        subject.validate()?;

        let changed = self.conn.execute(
            "UPDATE subjects
             SET name = ?1, abbreviation = ?2, color = ?3
             WHERE id = ?4;",
            params![
                subject.name.as_str(),
                subject.abbreviation.as_str(),
                i64::from(subject.color.argb()),
                subject.id,
            ],
        )?;
        expect_changed(changed, "subject", subject.id)
    }

    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subject_row(row)?));
        }
        Ok(None)
    }

    fn list_subjects(&self) -> RepoResult<Vec<Subject>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUBJECT_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            subjects.push(parse_subject_row(row)?);
        }
        Ok(subjects)
    }

    fn delete_subject(&self, id: SubjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM subjects WHERE id = ?1;", [id])?;
        expect_changed(changed, "subject", id)
    }

    fn subject_usage(&self, id: SubjectId) -> RepoResult<SubjectUsage> {
        let usage = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM tasks WHERE subject_id = ?1),
                (SELECT COUNT(*) FROM exams WHERE subject_id = ?1);",
            [id],
            |row| {
                Ok(SubjectUsage {
                    tasks: row.get(0)?,
                    exams: row.get(1)?,
                })
            },
        )?;
        Ok(usage)
    }

    fn reassign_and_delete(&self, from: SubjectId, to: SubjectId) -> RepoResult<SubjectUsage> {
        let tx = self.conn.unchecked_transaction()?;
        let tasks = tx.execute(
            "UPDATE tasks SET subject_id = ?2 WHERE subject_id = ?1;",
            params![from, to],
        )?;
        let exams = tx.execute(
            "UPDATE exams SET subject_id = ?2 WHERE subject_id = ?1;",
            params![from, to],
        )?;
        let changed = tx.execute("DELETE FROM subjects WHERE id = ?1;", [from])?;
        expect_changed(changed, "subject", from)?;
        tx.commit()?;

        Ok(SubjectUsage {
            tasks: count_to_u32(tasks)?,
            exams: count_to_u32(exams)?,
        })
    }

    fn delete_with_items(&self, id: SubjectId) -> RepoResult<SubjectUsage> {
        let tx = self.conn.unchecked_transaction()?;
        let tasks = tx.execute("DELETE FROM tasks WHERE subject_id = ?1;", [id])?;
        let exams = tx.execute("DELETE FROM exams WHERE subject_id = ?1;", [id])?;
        let changed = tx.execute("DELETE FROM subjects WHERE id = ?1;", [id])?;
        expect_changed(changed, "subject", id)?;
        tx.commit()?;

        Ok(SubjectUsage {
            tasks: count_to_u32(tasks)?,
            exams: count_to_u32(exams)?,
        })
    }
}

fn parse_subject_row(row: &Row<'_>) -> RepoResult<Subject> {
    let color_value: i64 = row.get("color")?;
    let color = u32::try_from(color_value).map_err(|_| {
        RepoError::InvalidData(format!("invalid color `{color_value}` in subjects.color"))
    })?;

    let subject = Subject {
        id: row.get("id")?,
        name: row.get("name")?,
        abbreviation: row.get("abbreviation")?,
        color: Color(color),
    };
    subject.validate()?;
    Ok(subject)
}

fn count_to_u32(count: usize) -> RepoResult<u32> {
    u32::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("row count `{count}` exceeds u32")))
}
