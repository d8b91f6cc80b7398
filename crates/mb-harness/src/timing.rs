use std::time::{Duration, Instant};

use mb_matrix::{partition_rows, SquareMatrix};
use tracing::{debug, info};

use crate::config::check_workers;
use crate::error::{BenchError, Result};
use crate::launcher::Launcher;
use crate::task::build_tasks;

/// Elapsed time of one repeat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatSample {
    /// 1-based repeat number.
    pub repeat: usize,
    pub elapsed: Duration,
}

/// Timings collected over all repeats of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    pub n: usize,
    pub workers: usize,
    pub repeats: usize,
    pub samples: Vec<RepeatSample>,
    /// Running sum of every sample's elapsed time.
    pub total: Duration,
}

impl BenchReport {
    /// Arithmetic mean of the repeat times, in seconds.
    pub fn mean_secs(&self) -> f64 {
        self.total.as_secs_f64() / self.repeats as f64
    }

    /// Fastest repeat.
    pub fn min(&self) -> Option<Duration> {
        self.samples.iter().map(|s| s.elapsed).min()
    }

    /// Slowest repeat.
    pub fn max(&self) -> Option<Duration> {
        self.samples.iter().map(|s| s.elapsed).max()
    }
}

/// Run `repeats` timed parallel multiplies of `a` and `b` into `c`.
///
/// Each repeat zeroes C, partitions the rows and builds the tasks, then
/// times only the launch-and-join of `workers` workers. `on_repeat` sees
/// each sample as soon as it is recorded. The first launcher error aborts
/// the run; no partial report is returned.
///
/// # Errors
/// Returns `InvalidConfig` for zero repeats, a worker count outside
/// `1..=MAX_WORKERS`, or a dimension mismatch between the matrices, and
/// propagates launcher errors.
pub fn run_repeats<F>(
    launcher: &dyn Launcher,
    workers: usize,
    repeats: usize,
    a: &SquareMatrix,
    b: &SquareMatrix,
    c: &mut SquareMatrix,
    mut on_repeat: F,
) -> Result<BenchReport>
where
    F: FnMut(&RepeatSample),
{
    check_workers(workers)?;
    if repeats == 0 {
        return Err(BenchError::InvalidConfig(
            "repeat count must be at least 1".to_string(),
        ));
    }
    let n = a.dim();
    if b.dim() != n || c.dim() != n {
        return Err(BenchError::InvalidConfig(format!(
            "matrix dimensions differ: A={} B={} C={}",
            n,
            b.dim(),
            c.dim()
        )));
    }

    let mut samples = Vec::with_capacity(repeats);
    let mut total = Duration::ZERO;

    for repeat in 1..=repeats {
        c.zero();

        let ranges = partition_rows(n, workers);
        debug!(repeat, ?ranges, "rows partitioned");
        let tasks = build_tasks(n, &ranges, a.as_slice(), b.as_slice(), c.as_mut_slice());

        let start = Instant::now();
        launcher.launch_and_join(tasks)?;
        let elapsed = start.elapsed();

        let sample = RepeatSample { repeat, elapsed };
        info!(
            repeat,
            elapsed_secs = elapsed.as_secs_f64(),
            launcher = launcher.name(),
            "repeat finished"
        );
        on_repeat(&sample);
        samples.push(sample);
        total += elapsed;
    }

    Ok(BenchReport {
        n,
        workers,
        repeats,
        samples,
        total,
    })
}
