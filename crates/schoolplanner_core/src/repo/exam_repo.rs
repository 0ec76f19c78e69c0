//! Exam repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Exams have no completion state; everything else matches `tasks`.
//! - Lists are ordered by due date, then id.

use crate::model::item::{Exam, ExamId, NewExam};
use crate::model::subject::SubjectId;
use crate::repo::{date_to_db, ensure_connection_ready, expect_changed, read_date, RepoResult};
use rusqlite::{params, Connection, Row};

const EXAM_SELECT_SQL: &str = "SELECT
    id,
    title,
    due_date,
    reminder,
    subject_id,
    description
FROM exams";

/// Repository interface for exam operations.
pub trait ExamRepository {
    fn create_exam(&self, exam: &NewExam) -> RepoResult<ExamId>;
    /// Inserts all exams or none of them.
    fn create_exams(&self, exams: &[NewExam]) -> RepoResult<Vec<ExamId>>;
    fn update_exam(&self, exam: &Exam) -> RepoResult<()>;
    fn get_exam(&self, id: ExamId) -> RepoResult<Option<Exam>>;
    fn list_exams(&self) -> RepoResult<Vec<Exam>>;
    fn list_exams_by_subject(&self, subject_id: SubjectId) -> RepoResult<Vec<Exam>>;
    fn delete_exam(&self, id: ExamId) -> RepoResult<()>;
}

/// SQLite-backed exam repository.
pub struct SqliteExamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteExamRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ExamRepository for SqliteExamRepository<'_> {
    fn create_exam(&self, exam: &NewExam) -> RepoResult<ExamId> {
        exam.validate()?;
        insert_exam(self.conn, exam)
    }

    fn create_exams(&self, exams: &[NewExam]) -> RepoResult<Vec<ExamId>> {
        for exam in exams {
            exam.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let ids = exams
            .iter()
            .map(|exam| insert_exam(&tx, exam))
            .collect::<RepoResult<Vec<_>>>()?;
        tx.commit()?;
        Ok(ids)
    }

    fn update_exam(&self, exam: &Exam) -> RepoResult<()> {
        exam.validate()?;

        let changed = self.conn.execute(
            "UPDATE exams
             SET
                title = ?1,
                due_date = ?2,
                reminder = ?3,
                subject_id = ?4,
                description = ?5
             WHERE id = ?6;",
            params![
                exam.title.as_str(),
                date_to_db(exam.due_date),
                date_to_db(exam.reminder),
                exam.subject_id,
                exam.description.as_deref(),
                exam.id,
            ],
        )?;
        expect_changed(changed, "exam", exam.id)
    }

    fn get_exam(&self, id: ExamId) -> RepoResult<Option<Exam>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EXAM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_exam_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_exams(&self) -> RepoResult<Vec<Exam>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EXAM_SELECT_SQL} ORDER BY due_date ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut exams = Vec::new();
        while let Some(row) = rows.next()? {
            exams.push(parse_exam_row(row)?);
        }
        Ok(exams)
    }

    fn list_exams_by_subject(&self, subject_id: SubjectId) -> RepoResult<Vec<Exam>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EXAM_SELECT_SQL} WHERE subject_id = ?1 ORDER BY due_date ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([subject_id])?;
        let mut exams = Vec::new();
        while let Some(row) = rows.next()? {
            exams.push(parse_exam_row(row)?);
        }
        Ok(exams)
    }

    fn delete_exam(&self, id: ExamId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM exams WHERE id = ?1;", [id])?;
        expect_changed(changed, "exam", id)
    }
}

fn insert_exam(conn: &Connection, exam: &NewExam) -> RepoResult<ExamId> {
    conn.execute(
        "INSERT INTO exams (title, due_date, reminder, subject_id, description)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            exam.title.as_str(),
            date_to_db(exam.due_date),
            date_to_db(exam.reminder),
            exam.subject_id,
            exam.description.as_deref(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn parse_exam_row(row: &Row<'_>) -> RepoResult<Exam> {
    let exam = Exam {
        id: row.get("id")?,
        title: row.get("title")?,
        due_date: read_date(row, "exams", "due_date")?,
        reminder: read_date(row, "exams", "reminder")?,
        subject_id: row.get("subject_id")?,
        description: row.get("description")?,
    };
    exam.validate()?;
    Ok(exam)
}
