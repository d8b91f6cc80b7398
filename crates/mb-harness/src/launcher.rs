use std::fmt::{self, Debug};

use mb_matrix::Placement;

use crate::error::Result;
use crate::task::WorkerTask;
use crate::threads::ThreadLauncher;

/// Trait for pluggable worker launchers (threads, forked processes).
///
/// A launcher starts one concurrent unit per task and blocks until every
/// unit has terminated. It returns nothing but success or failure; all
/// output goes through the tasks' bands of C.
pub trait Launcher: Send + Sync + Debug {
    /// Returns the name of this launcher (e.g., "threads", "processes").
    fn name(&self) -> &str;

    /// Where A, B and C must live for workers of this launcher to see them.
    fn placement(&self) -> Placement;

    /// Start one worker per task, then wait for all of them.
    ///
    /// This is the join barrier: it must not return while any worker is
    /// still running, including on the error path.
    fn launch_and_join(&self, tasks: Vec<WorkerTask<'_>>) -> Result<()>;
}

/// Execution strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Workers are threads sharing one address space.
    Threads,
    /// Workers are forked child processes writing into shared mappings.
    Processes,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Processes, Strategy::Threads];

    /// Strategies that can run on the current target.
    pub fn available() -> &'static [Strategy] {
        if cfg!(unix) {
            &Self::ALL
        } else {
            &[Strategy::Threads]
        }
    }

    /// Construct the launcher for this strategy.
    ///
    /// # Errors
    /// Returns `Unsupported` for `Processes` on targets without `fork`.
    pub fn launcher(self) -> Result<Box<dyn Launcher>> {
        match self {
            Strategy::Threads => Ok(Box::new(ThreadLauncher::new())),
            #[cfg(unix)]
            Strategy::Processes => Ok(Box::new(crate::processes::ProcessLauncher::new())),
            #[cfg(not(unix))]
            Strategy::Processes => Err(crate::error::BenchError::Unsupported(
                self.to_string(),
            )),
        }
    }

    /// Default matrix dimension for this strategy.
    pub fn default_size(self) -> usize {
        match self {
            Strategy::Threads => 800,
            Strategy::Processes => 400,
        }
    }

    /// Short command-line flag that sets the worker count.
    pub fn worker_flag(self) -> char {
        match self {
            Strategy::Threads => 't',
            Strategy::Processes => 'p',
        }
    }

    /// Plural noun for the workers, as printed in summaries.
    pub fn worker_noun(self) -> &'static str {
        match self {
            Strategy::Threads => "threads",
            Strategy::Processes => "processes",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.worker_noun())
    }
}
