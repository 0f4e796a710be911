//! SQLite implementation of [`Store`].
//!
//! SQLite has no connection-level auto-commit switch, so the mode is tracked
//! here: with auto-commit off the store keeps an explicit `BEGIN` open and
//! reopens it after every `COMMIT` or `ROLLBACK`.

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use super::schema::{upsert_sql, Record, TableName};
use super::{Store, StoreError};

/// A single SQLite connection plus its staged batch.
pub struct SqliteStore {
    conn: Connection,
    auto_commit: bool,
    staged: Vec<(TableName, Record)>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    ///
    /// Applies WAL journaling and the given busy timeout.
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let connection_error = |source| StoreError::Connection {
            target: path.display().to_string(),
            source,
        };

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(connection_error)?;
        conn.busy_timeout(busy_timeout).map_err(connection_error)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(connection_error)?;

        tracing::debug!(path = %path.display(), "Opened SQLite database");
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Connection {
            target: ":memory:".into(),
            source,
        })?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            auto_commit: true,
            staged: Vec::new(),
        }
    }

    /// The underlying connection, for read-only inspection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of records waiting for [`Store::execute_batch`].
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    fn raw(&self, sql: &str) -> Result<(), StoreError> {
        self.conn
            .execute_batch(sql)
            .map_err(|source| StoreError::statement(sql, source))
    }

    /// With auto-commit off, make sure a transaction is open.
    ///
    /// SQLite may roll back on its own after some errors, which closes the
    /// transaction underneath us.
    fn ensure_transaction(&self) -> Result<(), StoreError> {
        if !self.auto_commit && self.conn.is_autocommit() {
            self.raw("BEGIN")?;
        }
        Ok(())
    }
}

impl Store for SqliteStore {
    fn execute(&mut self, sql: &str) -> Result<(), StoreError> {
        self.ensure_transaction()?;
        self.conn
            .execute(sql, [])
            .map(|_| ())
            .map_err(|source| StoreError::statement(sql, source))
    }

    fn query_i64(&mut self, sql: &str) -> Result<Option<i64>, StoreError> {
        self.ensure_transaction()?;
        self.conn
            .query_row(sql, [], |row| row.get(0))
            .optional()
            .map_err(|source| StoreError::statement(sql, source))
    }

    fn upsert(&mut self, table: &TableName, record: &Record) -> Result<(), StoreError> {
        self.ensure_transaction()?;
        let sql = upsert_sql(table);
        let mut stmt = self
            .conn
            .prepare_cached(&sql)
            .map_err(|source| StoreError::statement(&sql, source))?;
        stmt.execute(params![record.key, record.value])
            .map_err(|source| StoreError::statement(&sql, source))?;
        Ok(())
    }

    fn stage(&mut self, table: &TableName, record: Record) -> Result<(), StoreError> {
        self.staged.push((table.clone(), record));
        Ok(())
    }

    fn execute_batch(&mut self) -> Result<usize, StoreError> {
        let staged = std::mem::take(&mut self.staged);
        for (table, record) in &staged {
            self.upsert(table, record)?;
        }
        Ok(staged.len())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if self.auto_commit {
            // SQLite rejects this with "no transaction is active".
            return self.raw("COMMIT");
        }
        if !self.conn.is_autocommit() {
            self.raw("COMMIT")?;
        }
        self.raw("BEGIN")
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.staged.clear();
        if self.auto_commit {
            return self.raw("ROLLBACK");
        }
        if !self.conn.is_autocommit() {
            self.raw("ROLLBACK")?;
        }
        self.raw("BEGIN")
    }

    fn auto_commit(&self) -> Result<bool, StoreError> {
        Ok(self.auto_commit)
    }

    fn set_auto_commit(&mut self, enabled: bool) -> Result<(), StoreError> {
        if enabled == self.auto_commit {
            return Ok(());
        }
        if enabled {
            if !self.conn.is_autocommit() {
                self.raw("COMMIT")?;
            }
        } else {
            self.raw("BEGIN")?;
        }
        self.auto_commit = enabled;
        Ok(())
    }
}
