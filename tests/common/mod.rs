//! Test utilities for Batchwrite integration tests.
//!
//! Provides:
//! - Temporary database fixtures
//! - An instrumented store that records calls and injects failures

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use batchwrite::{Record, SqliteStore, Store, StoreError, TableName};
use rusqlite::OptionalExtension;
use tempfile::TempDir;

/// Test fixture that manages a temporary database directory.
///
/// The directory is automatically cleaned up when the fixture is dropped.
pub struct TestFixture {
    /// Temporary directory for test database
    pub temp_dir: TempDir,
    /// Path to the database file
    pub db_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        Self { temp_dir, db_path }
    }

    pub fn db_path_str(&self) -> &str {
        self.db_path.to_str().expect("invalid path")
    }

    pub fn open(&self) -> SqliteStore {
        SqliteStore::open(&self.db_path, Duration::from_secs(1)).expect("failed to open store")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn table(name: &str) -> TableName {
    TableName::new(name).expect("valid table name")
}

/// All `(pk, data)` rows of `table`, ordered by key.
pub fn rows(store: &SqliteStore, table: &TableName) -> Vec<(i64, String)> {
    let conn = store.connection();
    let mut stmt = conn
        .prepare(&format!("SELECT pk, data FROM {table} ORDER BY pk"))
        .expect("prepare failed");
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .expect("query failed")
        .collect::<Result<Vec<_>, _>>()
        .expect("row decode failed")
}

pub fn table_exists(store: &SqliteStore, table: &TableName) -> bool {
    store
        .connection()
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table.as_str()],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .expect("sqlite_master query failed")
        .is_some()
}

/// One call made through an [`InstrumentedStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Execute(String),
    Query(String),
    Upsert(i64),
    Stage(i64),
    ExecuteBatch(usize),
    Commit,
    Rollback,
    SetAutoCommit(bool),
}

/// Wraps a store, recording every call and failing on request.
pub struct InstrumentedStore<S> {
    pub inner: S,
    pub ops: Vec<Op>,
    /// Fail the n-th (1-based) call to `commit`
    pub fail_commit: Option<usize>,
    /// Fail when staging this key
    pub fail_stage_key: Option<i64>,
    /// Fail every `set_auto_commit(false)`
    pub fail_disable_auto_commit: bool,
    /// Pretend the count query returned no rows
    pub empty_queries: bool,
    commits: usize,
}

impl<S: Store> InstrumentedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            ops: Vec::new(),
            fail_commit: None,
            fail_stage_key: None,
            fail_disable_auto_commit: false,
            empty_queries: false,
            commits: 0,
        }
    }

    pub fn count(&self, wanted: &Op) -> usize {
        self.ops.iter().filter(|op| *op == wanted).count()
    }

    /// Sizes reported by each `execute_batch`, empty ones included.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::ExecuteBatch(n) => Some(*n),
                _ => None,
            })
            .collect()
    }
}

fn injected(what: &str) -> StoreError {
    StoreError::Statement {
        sql: what.to_string(),
        source: rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
            Some(format!("injected failure: {what}")),
        ),
    }
}

impl<S: Store> Store for InstrumentedStore<S> {
    fn execute(&mut self, sql: &str) -> Result<(), StoreError> {
        self.ops.push(Op::Execute(sql.to_string()));
        self.inner.execute(sql)
    }

    fn query_i64(&mut self, sql: &str) -> Result<Option<i64>, StoreError> {
        self.ops.push(Op::Query(sql.to_string()));
        if self.empty_queries {
            return Ok(None);
        }
        self.inner.query_i64(sql)
    }

    fn upsert(&mut self, table: &TableName, record: &Record) -> Result<(), StoreError> {
        self.ops.push(Op::Upsert(record.key));
        self.inner.upsert(table, record)
    }

    fn stage(&mut self, table: &TableName, record: Record) -> Result<(), StoreError> {
        self.ops.push(Op::Stage(record.key));
        if self.fail_stage_key == Some(record.key) {
            return Err(injected("stage"));
        }
        self.inner.stage(table, record)
    }

    fn execute_batch(&mut self) -> Result<usize, StoreError> {
        let written = self.inner.execute_batch()?;
        self.ops.push(Op::ExecuteBatch(written));
        Ok(written)
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.ops.push(Op::Commit);
        self.commits += 1;
        if self.fail_commit == Some(self.commits) {
            return Err(injected("COMMIT"));
        }
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.ops.push(Op::Rollback);
        self.inner.rollback()
    }

    fn auto_commit(&self) -> Result<bool, StoreError> {
        self.inner.auto_commit()
    }

    fn set_auto_commit(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.ops.push(Op::SetAutoCommit(enabled));
        if !enabled && self.fail_disable_auto_commit {
            return Err(injected("set_auto_commit"));
        }
        self.inner.set_auto_commit(enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.temp_dir.path().exists());
        assert!(fixture.db_path_str().contains("test.db"));
    }
}
