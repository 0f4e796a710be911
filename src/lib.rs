//! Batchwrite: a small SQLite client for exercising basic SQL operations.
//!
//! The client resets a two-column table, writes `N` keyed records as upserts
//! in fixed-size batches (committing after each batch), and counts the rows
//! that landed.
//!
//! # Modules
//!
//! - [`config`]: CLI and environment configuration
//! - [`observability`]: Tracing setup
//! - [`progress`]: Injectable sink for progress and timing events
//! - [`storage`]: Store abstraction, SQLite backend, batched writer

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions,    // storage::sqlite::SqliteStore is fine
    clippy::must_use_candidate,         // Not all functions need #[must_use]
    clippy::missing_errors_doc,         // Error docs can be verbose
    clippy::missing_panics_doc          // Panic docs can be verbose
)]

pub mod config;
pub mod observability;
pub mod progress;
pub mod storage;

pub use progress::{NullSink, Progress, ProgressSink, TracingSink};
pub use storage::schema::{Record, TableName};
pub use storage::sqlite::SqliteStore;
pub use storage::writer::{run_demo, write_records, DemoReport, WriteOptions, WriteReport};
pub use storage::{Store, StoreError};
