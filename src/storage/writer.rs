//! The batched writer and the simple demo run.
//!
//! [`write_records`] upserts keys `0..records` in batches, committing after
//! each batch. Atomicity is per batch only: when a batch fails, earlier
//! batches stay committed and the failing one is rolled back.

use std::fmt;
use std::time::Instant;

use serde::Serialize;

use super::batch::{BatchAccumulator, BatchConfig};
use super::guard::AutoCommitGuard;
use super::schema::{count_rows, create_table, drop_if_exists, Record, TableName};
use super::{Store, StoreError};
use crate::progress::{Progress, ProgressSink};

/// Rows written by [`run_demo`].
pub const DEMO_RECORDS: u32 = 100;

/// Parameters for [`write_records`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Keys `0..records` are written
    pub records: u32,
    pub batch: BatchConfig,
}

impl WriteOptions {
    pub fn new(records: u32, batch: BatchConfig) -> Self {
        Self { records, batch }
    }
}

/// Outcome of a successful [`write_records`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub table: String,
    pub records: u32,
    /// Size of each non-empty batch, in flush order
    pub batches: Vec<usize>,
    pub elapsed_ms: u64,
    /// Rows in the table after the last commit
    pub row_count: i64,
}

impl fmt::Display for WriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Wrote {} records in {}ms ({} batches)",
            self.records,
            self.elapsed_ms,
            self.batches.len()
        )?;
        write!(f, "Read {} records from {}", self.row_count, self.table)
    }
}

/// Outcome of a successful [`run_demo`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoReport {
    pub table: String,
    pub records: u32,
    pub row_count: i64,
}

impl fmt::Display for DemoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Found {} records from {}", self.row_count, self.table)
    }
}

/// Upsert `(i, i.to_string())` for every `i` in `0..options.records`.
///
/// Creates the table if absent, switches auto-commit off, and flushes and
/// commits each batch as it fills plus once more at the end. The caller's
/// auto-commit mode is restored on every exit path.
pub fn write_records<S, P>(
    store: &mut S,
    table: &TableName,
    options: &WriteOptions,
    sink: &mut P,
) -> Result<WriteReport, StoreError>
where
    S: Store + ?Sized,
    P: ProgressSink + ?Sized,
{
    create_table(store, table, true, sink)?;

    let mut guard = AutoCommitGuard::disable(store)?;
    sink.report(Progress::Writing {
        table: table.to_string(),
    });

    let start = Instant::now();
    let batches = match write_batches(&mut *guard, table, options, sink) {
        Ok(batches) => batches,
        Err(err) => {
            abandon(&mut *guard, &err);
            return Err(err);
        }
    };
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    sink.report(Progress::Wrote {
        records: options.records,
        elapsed_ms,
    });

    guard.restore()?;

    let row_count = count_rows(store, table)?;
    sink.report(Progress::Read {
        table: table.to_string(),
        rows: row_count,
    });

    Ok(WriteReport {
        table: table.to_string(),
        records: options.records,
        batches,
        elapsed_ms,
        row_count,
    })
}

fn write_batches<S, P>(
    store: &mut S,
    table: &TableName,
    options: &WriteOptions,
    sink: &mut P,
) -> Result<Vec<usize>, StoreError>
where
    S: Store + ?Sized,
    P: ProgressSink + ?Sized,
{
    let mut batch = BatchAccumulator::new(options.batch);
    let mut sizes = Vec::new();

    for key in 0..options.records {
        if batch.push(Record::for_key(key)) {
            let written = flush(store, table, batch.drain(), sizes.len() + 1, sink)?;
            sizes.push(written);
        }
    }

    // The remainder, possibly empty. An empty flush still commits.
    let written = flush(store, table, batch.drain(), sizes.len() + 1, sink)?;
    if written > 0 {
        sizes.push(written);
    }

    Ok(sizes)
}

/// Stage `records`, submit them as one batch, and commit.
fn flush<S, P>(
    store: &mut S,
    table: &TableName,
    records: Vec<Record>,
    batch_number: usize,
    sink: &mut P,
) -> Result<usize, StoreError>
where
    S: Store + ?Sized,
    P: ProgressSink + ?Sized,
{
    for record in records {
        store.stage(table, record)?;
    }
    let written = store.execute_batch()?;
    store.commit()?;

    if written > 0 {
        sink.report(Progress::Flushed {
            table: table.to_string(),
            batch: batch_number,
            records: written,
        });
    }
    Ok(written)
}

/// Roll back the in-flight batch after `err`. Rollback failures are logged,
/// `err` is what the caller sees.
fn abandon<S: Store + ?Sized>(store: &mut S, err: &StoreError) {
    tracing::error!(error = %err, "Write aborted, rolling back uncommitted batch");
    if let Err(rollback_err) = store.rollback() {
        tracing::warn!(error = %rollback_err, "Rollback failed");
    }
}

/// Reset `table` and write [`DEMO_RECORDS`] rows one statement at a time in a
/// single transaction, then count them.
pub fn run_demo<S, P>(store: &mut S, table: &TableName, sink: &mut P) -> Result<DemoReport, StoreError>
where
    S: Store + ?Sized,
    P: ProgressSink + ?Sized,
{
    drop_if_exists(store, table, sink)?;
    create_table(store, table, false, sink)?;

    let mut guard = AutoCommitGuard::disable(store)?;
    sink.report(Progress::Writing {
        table: table.to_string(),
    });

    let written = (0..DEMO_RECORDS)
        .try_for_each(|key| guard.upsert(table, &Record::for_key(key)))
        .and_then(|()| guard.commit());
    if let Err(err) = written {
        abandon(&mut *guard, &err);
        return Err(err);
    }
    guard.restore()?;

    let row_count = count_rows(store, table)?;
    sink.report(Progress::Read {
        table: table.to_string(),
        rows: row_count,
    });

    Ok(DemoReport {
        table: table.to_string(),
        records: DEMO_RECORDS,
        row_count,
    })
}
