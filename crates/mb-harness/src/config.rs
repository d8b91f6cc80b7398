use mb_matrix::DEFAULT_SEED;

use crate::error::{BenchError, Result};
use crate::launcher::Strategy;

/// Worker count used when none is given.
pub const DEFAULT_WORKERS: usize = 4;
/// Repeat count used when none is given.
pub const DEFAULT_REPEATS: usize = 3;
/// Upper bound on workers per repeat. Every worker is a thread or a child
/// process, so anything above this fails long before it helps.
pub const MAX_WORKERS: usize = 4096;

/// Configuration for one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// How workers are executed.
    pub strategy: Strategy,
    /// Matrix dimension n.
    pub n: usize,
    /// Number of concurrent workers per repeat.
    pub workers: usize,
    /// Number of timed repeats averaged into the mean.
    pub repeats: usize,
    /// Seed for the input matrices.
    pub seed: u64,
}

impl BenchConfig {
    /// Configuration with the defaults of `strategy`.
    pub fn new(strategy: Strategy) -> Self {
        BenchConfig {
            strategy,
            n: strategy.default_size(),
            workers: DEFAULT_WORKERS,
            repeats: DEFAULT_REPEATS,
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_size(mut self, n: usize) -> Self {
        self.n = n;
        self
    }

    /// Set the worker count, clamped to at least 1.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the values a run cannot proceed without.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `n`, `workers` or `repeats` is zero, or if
    /// `workers` exceeds [`MAX_WORKERS`].
    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(BenchError::InvalidConfig(
                "matrix size must be at least 1".to_string(),
            ));
        }
        check_workers(self.workers)?;
        if self.repeats == 0 {
            return Err(BenchError::InvalidConfig(
                "repeat count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reject worker counts outside `1..=MAX_WORKERS`.
pub(crate) fn check_workers(workers: usize) -> Result<()> {
    if workers == 0 {
        return Err(BenchError::InvalidConfig(
            "worker count must be at least 1".to_string(),
        ));
    }
    if workers > MAX_WORKERS {
        return Err(BenchError::InvalidConfig(format!(
            "worker count {workers} exceeds the limit of {MAX_WORKERS}"
        )));
    }
    Ok(())
}
