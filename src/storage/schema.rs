//! Table schema and the helpers that manage it.
//!
//! Every table has the same fixed shape:
//!
//! ```sql
//! CREATE TABLE <name> (pk INTEGER NOT NULL PRIMARY KEY, data VARCHAR)
//! ```
//!
//! Table names are spliced into SQL text, so they are validated up front by
//! [`TableName`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::{Store, StoreError};
use crate::progress::{Progress, ProgressSink};

/// Longest accepted table name.
pub const MAX_TABLE_NAME_LEN: usize = 128;

/// Error returned when a string is not a usable table name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableNameError {
    #[error("table name is empty")]
    Empty,

    #[error("table name is longer than {MAX_TABLE_NAME_LEN} characters")]
    TooLong,

    #[error("table name {0:?} must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidCharacters(String),
}

/// A validated SQL identifier naming a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: impl Into<String>) -> Result<Self, TableNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TableNameError::Empty);
        }
        if name.len() > MAX_TABLE_NAME_LEN {
            return Err(TableNameError::TooLong);
        }

        let mut chars = name.chars();
        let head_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let tail_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !(head_ok && tail_ok) {
            return Err(TableNameError::InvalidCharacters(name));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TableName {
    type Err = TableNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the fixed schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: i64,
    pub value: String,
}

impl Record {
    /// The record written for `key`: its value is the key in decimal.
    pub fn for_key(key: u32) -> Self {
        Self {
            key: i64::from(key),
            value: key.to_string(),
        }
    }
}

pub fn create_table_sql(table: &TableName, if_not_exists: bool) -> String {
    format!(
        "CREATE TABLE {}{table} (pk INTEGER NOT NULL PRIMARY KEY, data VARCHAR)",
        if if_not_exists { "IF NOT EXISTS " } else { "" }
    )
}

pub fn drop_table_sql(table: &TableName) -> String {
    format!("DROP TABLE IF EXISTS {table}")
}

pub fn count_sql(table: &TableName) -> String {
    format!("SELECT COUNT(1) FROM {table}")
}

/// Insert-or-replace by primary key.
pub fn upsert_sql(table: &TableName) -> String {
    format!(
        "INSERT INTO {table} (pk, data) VALUES (?1, ?2) \
         ON CONFLICT(pk) DO UPDATE SET data = excluded.data"
    )
}

pub fn drop_if_exists<S, P>(store: &mut S, table: &TableName, sink: &mut P) -> Result<(), StoreError>
where
    S: Store + ?Sized,
    P: ProgressSink + ?Sized,
{
    sink.report(Progress::Dropping {
        table: table.to_string(),
    });
    store.execute(&drop_table_sql(table))
}

pub fn create_table<S, P>(
    store: &mut S,
    table: &TableName,
    if_not_exists: bool,
    sink: &mut P,
) -> Result<(), StoreError>
where
    S: Store + ?Sized,
    P: ProgressSink + ?Sized,
{
    sink.report(Progress::Creating {
        table: table.to_string(),
    });
    store.execute(&create_table_sql(table, if_not_exists))
}

/// Drop the table if present, then create it empty.
///
/// Safe to call whether or not the table exists. The two statements are not
/// atomic with respect to each other.
pub fn reset_table<S, P>(store: &mut S, table: &TableName, sink: &mut P) -> Result<(), StoreError>
where
    S: Store + ?Sized,
    P: ProgressSink + ?Sized,
{
    drop_if_exists(store, table, sink)?;
    create_table(store, table, true, sink)
}

/// Count the rows in `table`.
///
/// A count query always yields one row; [`StoreError::Query`] signals a
/// broken store rather than an empty table.
pub fn count_rows<S>(store: &mut S, table: &TableName) -> Result<i64, StoreError>
where
    S: Store + ?Sized,
{
    let sql = count_sql(table);
    store.query_i64(&sql)?.ok_or(StoreError::Query { sql })
}
