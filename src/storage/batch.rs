//! Batch accumulation for the write loop.
//!
//! Decides when staged records are flushed, independent of any store:
//! - Collect records until the batch is full
//! - Hand the whole batch to the caller to flush and commit

use std::num::NonZeroUsize;

use clap::ValueEnum;

/// Default number of records per flush/commit.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// When a batch counts as full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FlushPolicy {
    /// Flush once `batch_size` records are pending.
    #[default]
    Fixed,
    /// Flush right after the record whose index is a multiple of
    /// `batch_size`. The first batch holds a single record and later ones
    /// are offset by one.
    Legacy,
}

/// Configuration for batch flushing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Maximum number of records in a batch
    pub batch_size: NonZeroUsize,
    /// Flush trigger
    pub policy: FlushPolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            policy: FlushPolicy::Fixed,
        }
    }
}

impl BatchConfig {
    pub fn new(batch_size: NonZeroUsize, policy: FlushPolicy) -> Self {
        Self { batch_size, policy }
    }
}

/// Batch accumulator for write operations.
///
/// Collects items until [`BatchAccumulator::push`] reports the batch is due.
#[derive(Debug)]
pub struct BatchAccumulator<T> {
    config: BatchConfig,
    items: Vec<T>,
    pushed: u64,
}

impl<T> BatchAccumulator<T> {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            items: Vec::with_capacity(config.batch_size.get()),
            pushed: 0,
        }
    }

    /// Add an item to the batch.
    ///
    /// Returns true if the batch is now ready to flush.
    pub fn push(&mut self, item: T) -> bool {
        let index = self.pushed;
        self.pushed += 1;
        self.items.push(item);

        match self.config.policy {
            FlushPolicy::Fixed => self.items.len() >= self.config.batch_size.get(),
            FlushPolicy::Legacy => index % self.config.batch_size.get() as u64 == 0,
        }
    }

    /// Drain the batch, returning all accumulated items.
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::replace(
            &mut self.items,
            Vec::with_capacity(self.config.batch_size.get()),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total items pushed since creation.
    pub fn pushed(&self) -> u64 {
        self.pushed
    }
}
