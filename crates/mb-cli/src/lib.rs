//! `mb-cli` - Command-line front ends for matbench.
//!
//! Three binaries share this library:
//! - `matmul-threads`: one benchmark run with worker threads
//! - `matmul-processes`: one benchmark run with forked worker processes
//! - `matmul-compare`: both strategies over a list of worker counts

mod args;
pub mod logging;
mod report;

pub use args::{
    parse_compare, parse_config, retain_known_flags, CompareArgs, ProcessArgs, StrategyArgs,
    ThreadArgs,
};
pub use report::{repeat_line, summary_line, sweep_line};

use std::ffi::OsString;
use std::io::{self, Write};

use eyre::{Result, WrapErr};
use mb_harness::{run_sweep, write_csv, BenchConfig, BenchReport, Benchmark, Strategy, SweepPoint};

/// Entry point of a single-strategy binary.
///
/// Help requests and malformed arguments are handled by clap, which prints
/// and exits; any failure after parsing is returned.
pub fn run_benchmark<A: StrategyArgs>(args: impl IntoIterator<Item = OsString>) -> Result<()> {
    let config = match parse_config::<A, _, _>(args) {
        Ok(config) => config,
        Err(err) => err.exit(),
    };
    let stdout = io::stdout();
    execute(config, &mut stdout.lock())?;
    Ok(())
}

/// Run one configured benchmark, writing the report lines to `out`.
pub fn execute<W: Write>(config: BenchConfig, out: &mut W) -> Result<BenchReport> {
    let mut bench = Benchmark::new(config.clone())
        .wrap_err_with(|| format!("failed to prepare {} benchmark", config.strategy))?;

    let mut write_error = None;
    let report = bench
        .run(|sample| {
            if let Err(err) = writeln!(out, "{}", repeat_line(sample)) {
                if write_error.is_none() {
                    write_error = Some(err);
                }
            }
        })
        .wrap_err("benchmark run failed")?;
    if let Some(err) = write_error {
        return Err(err).wrap_err("failed to write report");
    }

    writeln!(out, "{}", summary_line(&config, &report)).wrap_err("failed to write report")?;
    Ok(report)
}

/// Entry point of `matmul-compare`.
pub fn run_compare(args: impl IntoIterator<Item = OsString>) -> Result<()> {
    let args = match parse_compare(args) {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    let stdout = io::stdout();
    compare(&args, &mut stdout.lock())?;
    Ok(())
}

/// Sweep every available strategy over the requested worker counts.
pub fn compare<W: Write>(args: &CompareArgs, out: &mut W) -> Result<Vec<SweepPoint>> {
    let base = args.base_config();

    let mut write_error = None;
    let points = run_sweep(&base, Strategy::available(), &args.workers, |point| {
        if args.csv {
            return;
        }
        if let Err(err) = writeln!(out, "{}", sweep_line(point)) {
            if write_error.is_none() {
                write_error = Some(err);
            }
        }
    })
    .wrap_err("worker-count sweep failed")?;
    if let Some(err) = write_error {
        return Err(err).wrap_err("failed to write report");
    }

    if args.csv {
        write_csv(&points, &mut *out).wrap_err("failed to write CSV")?;
    }
    Ok(points)
}
