use rusqlite::Connection;
use schoolplanner_core::db::migrations::latest_version;
use schoolplanner_core::db::{open_db, open_db_in_memory, DbError};
use schoolplanner_core::repo::task_repo::SqliteTaskRepository;
use schoolplanner_core::RepoError;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "subjects");
    assert_table_exists(&conn, "tasks");
    assert_table_exists(&conn, "exams");
    assert_table_exists(&conn, "preferences");
}

#[test]
fn reopening_file_database_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner.sqlite3");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO subjects (name, abbreviation, color) VALUES ('Math', 'M', 4294901760);",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM subjects;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repositories_refuse_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTaskRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection was accepted"),
    }
}

#[test]
fn foreign_keys_block_orphan_tasks() {
    let conn = open_db_in_memory().unwrap();

    let result = conn.execute(
        "INSERT INTO tasks (title, due_date, reminder, subject_id) VALUES ('x', 20000, 20000, 42);",
        [],
    );

    assert!(result.is_err());
}

#[test]
fn reminder_after_due_date_violates_check() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO subjects (name, abbreviation, color) VALUES ('Bio', 'B', 1);",
        [],
    )
    .unwrap();

    let result = conn.execute(
        "INSERT INTO exams (title, due_date, reminder, subject_id) VALUES ('Cells', 20000, 20001, 1);",
        [],
    );

    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
