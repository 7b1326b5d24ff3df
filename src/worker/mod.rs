//! Parallel key search.
//!
//! This module provides:
//! - Multi-threaded CPU workers sharing an attempt counter and a
//!   single-winner found signal
//! - The pool that spawns, cancels and joins them
//! - Periodic throughput and ETA reporting

mod cpu;
mod pool;
mod progress;
mod state;

pub use cpu::CpuWorker;
pub use pool::{SearchOutcome, SearchParams, SearchReport, VanityResult, WorkerPool};
pub use progress::{
    format_duration, format_number, ProgressReporter, ProgressSnapshot, DEFAULT_REPORT_INTERVAL,
};
pub use state::{CancelHandle, SearchState, Signal};
