use std::io::{self, Write};

use tracing::info;

use crate::bench::Benchmark;
use crate::config::BenchConfig;
use crate::error::Result;
use crate::launcher::Strategy;

/// Worker counts compared when none are given.
pub const DEFAULT_SWEEP: [usize; 5] = [1, 2, 4, 8, 16];

/// Mean time of one (strategy, worker count) combination.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub strategy: Strategy,
    pub workers: usize,
    pub n: usize,
    pub repeats: usize,
    pub mean_secs: f64,
}

/// Benchmark every strategy at every worker count.
///
/// Size, repeats and seed come from `base`; its strategy and worker count
/// are overridden per point. Points are produced strategy-major, in the
/// order given, and handed to `on_point` as they complete.
///
/// # Errors
/// Stops at the first failing benchmark and returns its error.
pub fn run_sweep<F>(
    base: &BenchConfig,
    strategies: &[Strategy],
    worker_counts: &[usize],
    mut on_point: F,
) -> Result<Vec<SweepPoint>>
where
    F: FnMut(&SweepPoint),
{
    let mut points = Vec::with_capacity(strategies.len() * worker_counts.len());
    for &strategy in strategies {
        for &workers in worker_counts {
            let mut config = base.clone().with_workers(workers);
            config.strategy = strategy;

            let report = Benchmark::new(config.clone())?.run(|_| {})?;
            let point = SweepPoint {
                strategy,
                workers: config.workers,
                n: config.n,
                repeats: config.repeats,
                mean_secs: report.mean_secs(),
            };
            info!(%strategy, workers = point.workers, mean_secs = point.mean_secs, "sweep point");
            on_point(&point);
            points.push(point);
        }
    }
    Ok(points)
}

/// Write sweep points as CSV with a header row.
pub fn write_csv<W: Write>(points: &[SweepPoint], mut out: W) -> io::Result<()> {
    writeln!(out, "strategy,workers,n,repeats,mean_secs")?;
    for p in points {
        writeln!(
            out,
            "{},{},{},{},{:.6}",
            p.strategy, p.workers, p.n, p.repeats, p.mean_secs
        )?;
    }
    Ok(())
}
