//! Observability infrastructure.
//!
//! Provides structured tracing to stderr, leaving stdout for command output.

pub mod tracing;
