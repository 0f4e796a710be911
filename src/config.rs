//! Configuration parsing for Batchwrite.
//!
//! Supports:
//! - CLI arguments and subcommands via clap
//! - Environment variable overrides
//! - Sensible defaults for quick start

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage::batch::{BatchConfig, FlushPolicy};
use crate::storage::schema::TableName;
use crate::storage::writer::WriteOptions;

/// Batchwrite: reset a table, write batched upserts, count the rows.
#[derive(Parser, Debug, Clone)]
#[command(name = "batchwrite")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Config {
    /// SQLite database file (created if missing)
    #[arg(short, long, env = "BATCHWRITE_DATABASE", default_value = "./data/batchwrite.db")]
    pub database: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// How long to wait on a locked database before failing
    #[arg(long, env = "BATCHWRITE_BUSY_TIMEOUT_MS", default_value_t = 5000)]
    pub busy_timeout_ms: u64,

    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Recreate the table and write 100 rows in one transaction
    Run {
        /// Table name
        #[arg(short, long, default_value = "demo")]
        table: TableName,
    },
    /// Upsert keyed records in batches, committing after each batch
    Write(WriteArgs),
    /// Drop the table if it exists and create it empty
    Reset {
        /// Table name
        #[arg(short, long, default_value = "demo")]
        table: TableName,
    },
    /// Count the rows in a table
    Count {
        /// Table name
        #[arg(short, long, default_value = "demo")]
        table: TableName,
    },
}

#[derive(Args, Debug, Clone)]
pub struct WriteArgs {
    /// Table name
    #[arg(short, long, default_value = "demo")]
    pub table: TableName,

    /// Number of records to write (keys 0..N)
    #[arg(short = 'n', long, default_value_t = 10_000)]
    pub records: u32,

    /// Records per flush/commit
    #[arg(short, long, env = "BATCHWRITE_BATCH_SIZE", default_value = "500")]
    pub batch_size: NonZeroUsize,

    /// When a batch is flushed
    #[arg(long, value_enum, default_value_t = FlushPolicy::Fixed)]
    pub flush_policy: FlushPolicy,

    /// Drop and recreate the table before writing
    #[arg(long)]
    pub reset: bool,
}

impl WriteArgs {
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions::new(
            self.records,
            BatchConfig::new(self.batch_size, self.flush_policy),
        )
    }
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Create a configuration for testing.
    #[cfg(test)]
    pub fn test_config(database: PathBuf, command: Command) -> Self {
        Self {
            database,
            log_level: "debug".into(),
            busy_timeout_ms: 100,
            output: OutputFormat::Json,
            command,
        }
    }
}
