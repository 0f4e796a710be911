//! Progress reporting for table setup and batched writes.
//!
//! Operations never print directly. They hand [`Progress`] events to a
//! caller-supplied [`ProgressSink`], so the binary can route them to tracing
//! while tests collect them into a `Vec`.

use std::fmt;

/// A single progress event emitted by the storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// About to drop the table (if it exists).
    Dropping { table: String },
    /// About to create the table.
    Creating { table: String },
    /// Starting the write loop.
    Writing { table: String },
    /// A batch was flushed and committed.
    Flushed {
        table: String,
        batch: usize,
        records: usize,
    },
    /// The write loop finished.
    Wrote { records: u32, elapsed_ms: u64 },
    /// Rows counted after writing.
    Read { table: String, rows: i64 },
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dropping { table } => write!(f, "Dropping {table}"),
            Self::Creating { table } => write!(f, "Creating {table}"),
            Self::Writing { table } => write!(f, "Writing to {table}"),
            Self::Flushed {
                table,
                batch,
                records,
            } => write!(f, "Flushed batch {batch} ({records} records) to {table}"),
            Self::Wrote {
                records,
                elapsed_ms,
            } => write!(f, "Wrote {records} records in {elapsed_ms}ms"),
            Self::Read { table, rows } => write!(f, "Read {rows} records from {table}"),
        }
    }
}

/// Destination for progress events.
pub trait ProgressSink {
    fn report(&mut self, event: Progress);
}

/// Forwards every event to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn report(&mut self, event: Progress) {
        match &event {
            Progress::Flushed {
                table,
                batch,
                records,
            } => {
                tracing::info!(table = %table, batch, records, "Flushed batched records");
            }
            Progress::Wrote {
                records,
                elapsed_ms,
            } => {
                tracing::info!(records, elapsed_ms, "{event}");
            }
            _ => tracing::info!("{event}"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&mut self, _event: Progress) {}
}

impl ProgressSink for Vec<Progress> {
    fn report(&mut self, event: Progress) {
        self.push(event);
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn report(&mut self, event: Progress) {
        (**self).report(event);
    }
}
