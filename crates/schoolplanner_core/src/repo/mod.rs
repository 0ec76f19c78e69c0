//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for subjects, tasks,
//!   exams and preferences.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate records before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Repositories only accept connections with the latest schema applied.

use crate::db::migrations::latest_version;
use crate::db::{schema_version, DbError};
use crate::model::date::{from_epoch_day, to_epoch_day};
use crate::model::item::ItemValidationError;
use crate::model::subject::SubjectValidationError;
use chrono::NaiveDate;
use rusqlite::{Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod exam_repo;
pub mod preference_repo;
pub mod subject_repo;
pub mod task_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for planner persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    ItemValidation(ItemValidationError),
    SubjectValidation(SubjectValidationError),
    Db(DbError),
    NotFound {
        entity: &'static str,
        id: i64,
    },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemValidation(err) => write!(f, "{err}"),
            Self::SubjectValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ItemValidation(err) => Some(err),
            Self::SubjectValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) | Self::UninitializedConnection { .. } => {
                None
            }
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::ItemValidation(value)
    }
}

impl From<SubjectValidationError> for RepoError {
    fn from(value: SubjectValidationError) -> Self {
        Self::SubjectValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejects connections that were not opened through `open_db`.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn date_to_db(date: NaiveDate) -> i64 {
    to_epoch_day(date)
}

pub(crate) fn read_date(row: &Row<'_>, table: &str, column: &str) -> RepoResult<NaiveDate> {
    let epoch_day: i64 = row.get(column)?;
    from_epoch_day(epoch_day).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid epoch day `{epoch_day}` in {table}.{column}"
        ))
    })
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn read_bool(row: &Row<'_>, table: &str, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {table}.{column}"
        ))),
    }
}

/// Maps "zero rows changed" to a typed not-found error.
pub(crate) fn expect_changed(changed: usize, entity: &'static str, id: i64) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound { entity, id });
    }
    Ok(())
}
