//! Namespaced key-value preferences stored in SQLite.
//!
//! # Responsibility
//! - Persist small settings and counters that must survive restarts
//!   (notification hour, priority, last notification id).
//!
//! # Invariants
//! - `(namespace, key)` is unique; `set` replaces the previous value.
//! - Values are stored as text; typed helpers parse on read.

use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for preference values.
pub trait PreferenceRepository {
    fn get_value(&self, namespace: &str, key: &str) -> RepoResult<Option<String>>;
    fn set_value(&self, namespace: &str, key: &str, value: &str) -> RepoResult<()>;
    /// Returns whether a value was removed.
    fn remove_value(&self, namespace: &str, key: &str) -> RepoResult<bool>;

    fn get_i64(&self, namespace: &str, key: &str) -> RepoResult<Option<i64>> {
        match self.get_value(namespace, key)? {
            Some(text) => text.trim().parse::<i64>().map(Some).map_err(|_| {
                RepoError::InvalidData(format!(
                    "preference {namespace}.{key} is not an integer: `{text}`"
                ))
            }),
            None => Ok(None),
        }
    }

    fn set_i64(&self, namespace: &str, key: &str, value: i64) -> RepoResult<()> {
        self.set_value(namespace, key, &value.to_string())
    }
}

/// SQLite-backed preference repository.
pub struct SqlitePreferenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PreferenceRepository for SqlitePreferenceRepository<'_> {
    fn get_value(&self, namespace: &str, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE namespace = ?1 AND key = ?2;",
                params![namespace, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_value(&self, namespace: &str, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO preferences (namespace, key, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![namespace, key, value],
        )?;
        Ok(())
    }

    fn remove_value(&self, namespace: &str, key: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM preferences WHERE namespace = ?1 AND key = ?2;",
            params![namespace, key],
        )?;
        Ok(changed > 0)
    }
}
