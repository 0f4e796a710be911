//! Batchwrite: exercise table reset, batched upserts and row counts on SQLite.
//!
//! # Usage
//!
//! ```bash
//! batchwrite --database ./data/demo.db write --table t1 --records 1200
//! batchwrite --output json count --table t1
//! ```
//!
//! Environment variables can also be used:
//! - `BATCHWRITE_DATABASE`: SQLite database file
//! - `BATCHWRITE_BATCH_SIZE`: Records per flush/commit
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use anyhow::{Context, Result};
use batchwrite::config::{Command, Config, OutputFormat};
use batchwrite::observability::tracing::init_tracing;
use batchwrite::storage::schema::{count_rows, reset_table};
use batchwrite::{run_demo, write_records, SqliteStore, TracingSink};
use serde::Serialize;
use std::fmt::Display;
use std::fs;

#[derive(Serialize)]
struct CountOutput {
    table: String,
    rows: i64,
}

fn emit<T: Serialize + Display>(format: OutputFormat, value: &T) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{value}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    // Ensure the database directory exists
    if let Some(parent) = config.database.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut store = SqliteStore::open(&config.database, config.busy_timeout())
        .context("failed to open database")?;
    let mut sink = TracingSink;

    match config.command {
        Command::Run { table } => {
            let report = run_demo(&mut store, &table, &mut sink)
                .with_context(|| format!("demo run on {table} failed"))?;
            emit(config.output, &report)?;
        }
        Command::Write(args) => {
            if args.reset {
                reset_table(&mut store, &args.table, &mut sink)
                    .with_context(|| format!("failed to reset {}", args.table))?;
            }
            let report = write_records(&mut store, &args.table, &args.write_options(), &mut sink)
                .with_context(|| format!("writing to {} failed", args.table))?;
            emit(config.output, &report)?;
        }
        Command::Reset { table } => {
            reset_table(&mut store, &table, &mut sink)
                .with_context(|| format!("failed to reset {table}"))?;
            let rows = count_rows(&mut store, &table)?;
            emit(
                config.output,
                &CountOutput {
                    table: table.to_string(),
                    rows,
                },
            )?;
        }
        Command::Count { table } => {
            let rows = count_rows(&mut store, &table)
                .with_context(|| format!("failed to count rows in {table}"))?;
            emit(
                config.output,
                &CountOutput {
                    table: table.to_string(),
                    rows,
                },
            )?;
        }
    }

    tracing::debug!("Batchwrite finished");
    Ok(())
}

impl Display for CountOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} rows in {}", self.rows, self.table)
    }
}
