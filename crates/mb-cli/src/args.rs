use std::ffi::OsString;

use clap::Parser;
use mb_harness::{BenchConfig, Strategy, DEFAULT_REPEATS, DEFAULT_SWEEP, DEFAULT_WORKERS};
use mb_matrix::DEFAULT_SEED;

/// Flags that take a value, shared by both single-strategy front ends.
const VALUE_FLAGS: [&str; 3] = ["-n", "-r", "--seed"];
/// Flags that take a value in `matmul-compare`.
const COMPARE_VALUE_FLAGS: [&str; 5] = ["-n", "-r", "-w", "--workers", "--seed"];
/// Flags without a value in `matmul-compare`.
const COMPARE_SWITCHES: [&str; 1] = ["--csv"];

/// Parse an integer that must be at least 1.
fn parse_positive(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|e| format!("`{s}` is not a non-negative integer: {e}"))?;
    if value == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(value)
}

fn clamp_workers(raw: i64) -> usize {
    usize::try_from(raw.max(1)).unwrap_or(usize::MAX)
}

/// Command-line arguments of one single-strategy front end.
pub trait StrategyArgs: Parser {
    const STRATEGY: Strategy;

    fn into_config(self) -> BenchConfig;
}

/// Time parallel n×n matrix multiplication with worker threads.
#[derive(Parser, Debug)]
#[command(name = "matmul-threads", disable_version_flag = true)]
pub struct ThreadArgs {
    /// Matrix dimension
    #[arg(short = 'n', value_name = "SIZE", default_value_t = Strategy::Threads.default_size(), value_parser = parse_positive)]
    pub size: usize,
    /// Number of threads; values below 1 run one thread
    #[arg(short = 't', value_name = "THREADS", default_value_t = DEFAULT_WORKERS as i64, allow_negative_numbers = true)]
    pub threads: i64,
    /// Number of timed repeats
    #[arg(short = 'r', value_name = "REPEATS", default_value_t = DEFAULT_REPEATS, value_parser = parse_positive)]
    pub repeats: usize,
    /// Seed for the input matrices
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

impl StrategyArgs for ThreadArgs {
    const STRATEGY: Strategy = Strategy::Threads;

    fn into_config(self) -> BenchConfig {
        BenchConfig::new(Self::STRATEGY)
            .with_size(self.size)
            .with_workers(clamp_workers(self.threads))
            .with_repeats(self.repeats)
            .with_seed(self.seed)
    }
}

/// Time parallel n×n matrix multiplication with forked worker processes.
#[derive(Parser, Debug)]
#[command(name = "matmul-processes", disable_version_flag = true)]
pub struct ProcessArgs {
    /// Matrix dimension
    #[arg(short = 'n', value_name = "SIZE", default_value_t = Strategy::Processes.default_size(), value_parser = parse_positive)]
    pub size: usize,
    /// Number of processes; values below 1 run one process
    #[arg(short = 'p', value_name = "PROCESSES", default_value_t = DEFAULT_WORKERS as i64, allow_negative_numbers = true)]
    pub processes: i64,
    /// Number of timed repeats
    #[arg(short = 'r', value_name = "REPEATS", default_value_t = DEFAULT_REPEATS, value_parser = parse_positive)]
    pub repeats: usize,
    /// Seed for the input matrices
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

impl StrategyArgs for ProcessArgs {
    const STRATEGY: Strategy = Strategy::Processes;

    fn into_config(self) -> BenchConfig {
        BenchConfig::new(Self::STRATEGY)
            .with_size(self.size)
            .with_workers(clamp_workers(self.processes))
            .with_repeats(self.repeats)
            .with_seed(self.seed)
    }
}

/// Compare processes and threads across a range of worker counts.
#[derive(Parser, Debug)]
#[command(name = "matmul-compare", disable_version_flag = true)]
pub struct CompareArgs {
    /// Matrix dimension
    #[arg(short = 'n', value_name = "SIZE", default_value_t = Strategy::Processes.default_size(), value_parser = parse_positive)]
    pub size: usize,
    /// Number of timed repeats per point
    #[arg(short = 'r', value_name = "REPEATS", default_value_t = DEFAULT_REPEATS, value_parser = parse_positive)]
    pub repeats: usize,
    /// Comma-separated worker counts
    #[arg(short = 'w', long = "workers", value_delimiter = ',', default_values_t = DEFAULT_SWEEP.to_vec())]
    pub workers: Vec<usize>,
    /// Seed for the input matrices
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
    /// Print CSV instead of one summary line per point
    #[arg(long)]
    pub csv: bool,
}

impl CompareArgs {
    /// Base configuration of the sweep; strategy and workers vary per point.
    pub fn base_config(&self) -> BenchConfig {
        BenchConfig::new(Strategy::Threads)
            .with_size(self.size)
            .with_repeats(self.repeats)
            .with_seed(self.seed)
    }
}

/// Drop every argument a front end does not recognise.
///
/// Unknown flags are ignored rather than rejected. A known value flag keeps
/// the argument after it whatever it looks like, so `-t -3` survives for
/// clamping; a value flag with nothing after it is dropped. Long value flags
/// may also be written `--flag=value`. The first argument (program name) and
/// help requests are always kept.
pub fn retain_known_flags<I, T>(
    args: I,
    value_flags: &[&str],
    switches: &[&str],
) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut iter = args.into_iter().map(Into::into);
    let mut kept: Vec<OsString> = iter.next().into_iter().collect();

    while let Some(arg) = iter.next() {
        let Some(text) = arg.to_str() else {
            continue;
        };
        let inline_value = text
            .split_once('=')
            .is_some_and(|(flag, _)| flag.starts_with("--") && value_flags.contains(&flag));
        if text == "-h" || text == "--help" || switches.contains(&text) || inline_value {
            kept.push(arg);
        } else if value_flags.contains(&text) {
            if let Some(value) = iter.next() {
                kept.push(arg);
                kept.push(value);
            }
        }
    }
    kept
}

/// Parse a single-strategy command line into a configuration.
///
/// # Errors
/// Returns the clap error for malformed values or a help request; callers
/// usually hand it to `clap::Error::exit`.
pub fn parse_config<A, I, T>(args: I) -> Result<BenchConfig, clap::Error>
where
    A: StrategyArgs,
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let worker = format!("-{}", A::STRATEGY.worker_flag());
    let mut value_flags = VALUE_FLAGS.to_vec();
    value_flags.push(&worker);
    let argv = retain_known_flags(args, &value_flags, &[]);
    Ok(A::try_parse_from(argv)?.into_config())
}

/// Parse a `matmul-compare` command line, ignoring unknown flags.
///
/// # Errors
/// As [`parse_config`].
pub fn parse_compare<I, T>(args: I) -> Result<CompareArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv = retain_known_flags(args, &COMPARE_VALUE_FLAGS, &COMPARE_SWITCHES);
    CompareArgs::try_parse_from(argv)
}
