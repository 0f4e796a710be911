//! Storage layer for Batchwrite.
//!
//! Provides:
//! - The [`Store`] connectivity trait the writer is generic over
//! - A SQLite implementation of it
//! - Table schema helpers (reset, create, count)
//! - Batch accumulation and the scoped auto-commit guard
//! - The batched writer itself

pub mod batch;
pub mod guard;
pub mod schema;
pub mod sqlite;
pub mod writer;

use thiserror::Error;

use schema::{Record, TableName};

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store is unreachable or the connection is unusable.
    #[error("Failed to connect to {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A DDL/DML statement, batch execution, commit or rollback failed.
    #[error("Statement failed ({sql}): {source}")]
    Statement {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A query that must yield one row yielded none.
    #[error("Query returned no rows: {sql}")]
    Query { sql: String },
}

impl StoreError {
    pub(crate) fn statement(sql: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Statement {
            sql: sql.into(),
            source,
        }
    }
}

/// Blocking connectivity operations the writer needs from a tabular store.
///
/// A store behaves like a single driver session: one caller at a time, and
/// every call blocks until the store answers. Staged records are held until
/// [`Store::execute_batch`]; they become durable on [`Store::commit`].
pub trait Store {
    /// Execute a DDL or DML statement that returns no rows.
    fn execute(&mut self, sql: &str) -> Result<(), StoreError>;

    /// Run a query whose first column of the first row is an integer.
    ///
    /// Returns `Ok(None)` when the query yields no rows.
    fn query_i64(&mut self, sql: &str) -> Result<Option<i64>, StoreError>;

    /// Upsert a single record immediately.
    fn upsert(&mut self, table: &TableName, record: &Record) -> Result<(), StoreError>;

    /// Stage an upsert for the next [`Store::execute_batch`].
    fn stage(&mut self, table: &TableName, record: Record) -> Result<(), StoreError>;

    /// Submit every staged upsert, returning how many were written.
    ///
    /// With nothing staged this is a no-op returning `Ok(0)`.
    fn execute_batch(&mut self) -> Result<usize, StoreError>;

    /// Make all work since the last commit durable.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Discard all uncommitted work, including anything staged.
    fn rollback(&mut self) -> Result<(), StoreError>;

    /// Whether each statement commits implicitly.
    fn auto_commit(&self) -> Result<bool, StoreError>;

    /// Switch auto-commit mode. Enabling it commits any open transaction.
    fn set_auto_commit(&mut self, enabled: bool) -> Result<(), StoreError>;
}
