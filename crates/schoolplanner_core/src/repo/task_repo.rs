//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `tasks`, including batch inserts from add forms.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Lists are ordered by due date, then open-before-completed, then id.

use crate::model::item::{NewTask, Task, TaskId};
use crate::model::subject::SubjectId;
use crate::repo::{
    bool_to_int, date_to_db, ensure_connection_ready, expect_changed, read_bool, read_date,
    RepoResult,
};
use rusqlite::{params, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    due_date,
    reminder,
    subject_id,
    description,
    completed
FROM tasks";

const TASK_ORDER_SQL: &str = "ORDER BY due_date ASC, completed ASC, id ASC";

const TASK_INSERT_SQL: &str = "INSERT INTO tasks (
    title,
    due_date,
    reminder,
    subject_id,
    description,
    completed
) VALUES (?1, ?2, ?3, ?4, ?5, ?6);";

/// Repository interface for task operations.
pub trait TaskRepository {
    fn create_task(&self, task: &NewTask) -> RepoResult<TaskId>;
    /// Inserts all tasks or none of them.
    fn create_tasks(&self, tasks: &[NewTask]) -> RepoResult<Vec<TaskId>>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn list_tasks_by_subject(&self, subject_id: SubjectId) -> RepoResult<Vec<Task>>;
    fn set_task_completed(&self, id: TaskId, completed: bool) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_tasks(&self, sql: &str, subject_id: Option<SubjectId>) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = match subject_id {
            Some(subject_id) => stmt.query([subject_id])?,
            None => stmt.query([])?,
        };
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &NewTask) -> RepoResult<TaskId> {
        task.validate()?;
        insert_task(self.conn, task)
    }

    fn create_tasks(&self, tasks: &[NewTask]) -> RepoResult<Vec<TaskId>> {
        for task in tasks {
            task.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(tasks.len());
        for task in tasks {
            ids.push(insert_task(&tx, task)?);
        }
        tx.commit()?;
        Ok(ids)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                due_date = ?2,
                reminder = ?3,
                subject_id = ?4,
                description = ?5,
                completed = ?6
             WHERE id = ?7;",
            params![
                task.title.as_str(),
                date_to_db(task.due_date),
                date_to_db(task.reminder),
                task.subject_id,
                task.description.as_deref(),
                bool_to_int(task.completed),
                task.id,
            ],
        )?;
        expect_changed(changed, "task", task.id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.query_tasks(&format!("{TASK_SELECT_SQL} {TASK_ORDER_SQL};"), None)
    }

    fn list_tasks_by_subject(&self, subject_id: SubjectId) -> RepoResult<Vec<Task>> {
        self.query_tasks(
            &format!("{TASK_SELECT_SQL} WHERE subject_id = ?1 {TASK_ORDER_SQL};"),
            Some(subject_id),
        )
    }

    fn set_task_completed(&self, id: TaskId, completed: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET completed = ?1 WHERE id = ?2;",
            params![bool_to_int(completed), id],
        )?;
        expect_changed(changed, "task", id)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        expect_changed(changed, "task", id)
    }
}

fn insert_task(conn: &Connection, task: &NewTask) -> RepoResult<TaskId> {
    conn.execute(
        TASK_INSERT_SQL,
        params![
            task.title.as_str(),
            date_to_db(task.due_date),
            date_to_db(task.reminder),
            task.subject_id,
            task.description.as_deref(),
            bool_to_int(task.completed),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let task = Task {
        id: row.get("id")?,
        title: row.get("title")?,
        due_date: read_date(row, "tasks", "due_date")?,
        reminder: read_date(row, "tasks", "reminder")?,
        subject_id: row.get("subject_id")?,
        description: row.get("description")?,
        completed: read_bool(row, "tasks", "completed")?,
    };
    task.validate()?;
    Ok(task)
}
