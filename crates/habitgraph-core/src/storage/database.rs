//! SQLite-backed key-value store.
//!
//! The habit graph only needs two string keys, but keeping them in a
//! single-table SQLite file gives atomic writes for free.

use std::path::Path;

use rusqlite::{params, Connection, ErrorCode};

use super::{data_dir, KvStore};
use crate::error::StorageError;

/// SQLite database holding the `kv` table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/habitgraph.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join("habitgraph.db"))
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|e| StorageError::write("kv", e))
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv WHERE key = ?1")
            .map_err(|e| StorageError::read(key, e))?;
        match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(classify(key, e, Access::Read)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| classify(key, e, Access::Write))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(|e| classify(key, e, Access::Write))?;
        Ok(())
    }

    fn write_batch(&mut self, entries: &[(&str, Option<&str>)]) -> Result<(), StorageError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| classify("kv", e, Access::Write))?;
        for &(key, value) in entries {
            match value {
                Some(value) => tx.execute(
                    "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                    params![key, value],
                ),
                None => tx.execute("DELETE FROM kv WHERE key = ?1", params![key]),
            }
            .map_err(|e| classify(key, e, Access::Write))?;
        }
        // Dropping an uncommitted transaction rolls it back.
        tx.commit().map_err(|e| classify("kv", e, Access::Write))
    }
}

enum Access {
    Read,
    Write,
}

fn classify(key: &str, err: rusqlite::Error, access: Access) -> StorageError {
    match (&err, access) {
        (rusqlite::Error::SqliteFailure(e, _), _) if e.code == ErrorCode::DatabaseLocked => {
            StorageError::Locked
        }
        (_, Access::Read) => StorageError::read(key, &err),
        (_, Access::Write) => StorageError::write(key, &err),
    }
}
