//! `mb-harness` - Parallel row-partitioned matmul harness for matbench.
//!
//! This crate provides:
//! - `WorkerTask`, the per-worker unit of work over a disjoint band of C
//! - A `Launcher` trait with thread and forked-process implementations
//! - The timed repeat loop and its `BenchReport`
//! - `BenchConfig` with explicit per-strategy defaults
//! - `Benchmark`, which owns the buffers and drives a run
//! - Worker-count sweeps across strategies with CSV output

pub mod bench;
pub mod config;
pub mod error;
pub mod launcher;
#[cfg(unix)]
pub mod processes;
pub mod sweep;
pub mod task;
pub mod threads;
pub mod timing;

// Re-export primary types at the crate root for convenience.
pub use bench::Benchmark;
pub use config::{BenchConfig, DEFAULT_REPEATS, DEFAULT_WORKERS, MAX_WORKERS};
pub use error::{BenchError, Result};
pub use launcher::{Launcher, Strategy};
#[cfg(unix)]
pub use processes::ProcessLauncher;
pub use sweep::{run_sweep, write_csv, SweepPoint, DEFAULT_SWEEP};
pub use task::{build_tasks, WorkerTask};
pub use threads::ThreadLauncher;
pub use timing::{run_repeats, BenchReport, RepeatSample};
