use std::io;
use std::panic::{self, AssertUnwindSafe};

use mb_matrix::Placement;
use tracing::{debug, warn};

use crate::error::{BenchError, Result};
use crate::launcher::Launcher;
use crate::task::WorkerTask;

/// Exit status a child reports when its kernel panicked.
const PANIC_EXIT_STATUS: i32 = 101;

/// Runs each task in a forked child process.
///
/// Children inherit the parent's mappings, so the matrices must be
/// allocated with [`Placement::Shared`] before launching: a child's writes
/// to heap memory land in its private copy and are lost when it exits.
///
/// Forking a multithreaded parent (a test harness, say) copies only the
/// calling thread. A child therefore never takes a lock the parent may have
/// held: it silences the panic hook and leaves through `_exit`.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        ProcessLauncher
    }
}

impl Launcher for ProcessLauncher {
    fn name(&self) -> &str {
        "processes"
    }

    fn placement(&self) -> Placement {
        Placement::Shared
    }

    fn launch_and_join(&self, tasks: Vec<WorkerTask<'_>>) -> Result<()> {
        launch_with(tasks, fork_worker)
    }
}

/// Start every task with `spawn`, then reap every started child.
fn launch_with<'a, F>(tasks: Vec<WorkerTask<'a>>, mut spawn: F) -> Result<()>
where
    F: FnMut(WorkerTask<'a>) -> io::Result<libc::pid_t>,
{
    let mut children: Vec<(usize, libc::pid_t)> = Vec::with_capacity(tasks.len());
    let mut launch_error = None;

    for task in tasks {
        let worker = task.worker();
        let rows = task.rows();
        match spawn(task) {
            Ok(pid) => {
                debug!(worker, pid, %rows, "process started");
                children.push((worker, pid));
            }
            Err(source) => {
                launch_error = Some(BenchError::Spawn { worker, source });
                break;
            }
        }
    }

    if launch_error.is_some() && !children.is_empty() {
        warn!(started = children.len(), "fork failed, reaping started workers");
    }

    // Reap every child, even after a failure, so none is left running
    // or as a zombie.
    let mut worker_error = None;
    for (worker, pid) in children {
        match wait_for(worker, pid) {
            Ok(()) => debug!(worker, pid, "process reaped"),
            Err(err) if worker_error.is_none() => worker_error = Some(err),
            Err(_) => {}
        }
    }

    match launch_error.or(worker_error) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Fork a child that runs `task`. Returns the child's pid in the parent.
fn fork_worker(task: WorkerTask<'_>) -> io::Result<libc::pid_t> {
    match unsafe { libc::fork() } {
        -1 => Err(io::Error::last_os_error()),
        0 => run_child(task),
        pid => Ok(pid),
    }
}

/// Body of a forked child: run the kernel, then leave without touching
/// anything else the parent set up.
fn run_child(task: WorkerTask<'_>) -> ! {
    // The default hook locks stderr, which another parent thread may have
    // held at fork time. The exit status carries the failure instead.
    panic::set_hook(Box::new(|_| {}));
    let status = match panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
        Ok(()) => 0,
        Err(_) => PANIC_EXIT_STATUS,
    };
    // SAFETY: `_exit` ends the child immediately. Destructors, atexit hooks
    // and stdio flushes belong to the parent and must not run twice.
    unsafe { libc::_exit(status) }
}

/// Block until `pid` terminates and translate its wait status.
fn wait_for(worker: usize, pid: libc::pid_t) -> Result<()> {
    let mut status: libc::c_int = 0;
    loop {
        let rc = unsafe { libc::waitpid(pid, &mut status, 0) };
        if rc == pid {
            break;
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(BenchError::Wait { worker, source: err });
        }
    }

    if libc::WIFEXITED(status) {
        match libc::WEXITSTATUS(status) {
            0 => Ok(()),
            code => Err(BenchError::WorkerFailed {
                worker,
                status: code,
            }),
        }
    } else if libc::WIFSIGNALED(status) {
        Err(BenchError::WorkerSignaled {
            worker,
            signal: libc::WTERMSIG(status),
        })
    } else {
        Err(BenchError::WorkerFailed { worker, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::build_tasks;
    use mb_matrix::{fill_seeded, multiply, partition_rows, RowRange, SquareMatrix};

    fn seeded(n: usize) -> (SquareMatrix, SquareMatrix) {
        let mut a = SquareMatrix::zeros(n, Placement::Shared).unwrap();
        let mut b = SquareMatrix::zeros(n, Placement::Shared).unwrap();
        fill_seeded(&mut a, &mut b, 9).unwrap();
        (a, b)
    }

    fn run_processes(
        workers: usize,
        a: &SquareMatrix,
        b: &SquareMatrix,
        c: &mut SquareMatrix,
    ) -> Result<()> {
        let n = a.dim();
        let tasks = build_tasks(
            n,
            &partition_rows(n, workers),
            a.as_slice(),
            b.as_slice(),
            c.as_mut_slice(),
        );
        ProcessLauncher::new().launch_and_join(tasks)
    }

    #[test]
    fn test_matches_single_worker() {
        let n = 17;
        let (a, b) = seeded(n);
        let mut expected = vec![0.0; n * n];
        multiply(n, a.as_slice(), b.as_slice(), &mut expected);

        for workers in [1, 2, 4, 5] {
            let mut c = SquareMatrix::zeros(n, Placement::Shared).unwrap();
            run_processes(workers, &a, &b, &mut c).unwrap();
            assert_eq!(c.as_slice(), expected.as_slice(), "workers={workers}");
        }
    }

    #[test]
    fn test_more_workers_than_rows() {
        let (a, b) = seeded(1);
        let mut c = SquareMatrix::zeros(1, Placement::Shared).unwrap();
        run_processes(4, &a, &b, &mut c).unwrap();
        assert_eq!(c.get(0, 0), a.get(0, 0) * b.get(0, 0));
    }

    #[test]
    fn test_heap_output_is_not_shared() {
        let (a, b) = seeded(3);
        let mut c = SquareMatrix::zeros(3, Placement::Heap).unwrap();
        run_processes(2, &a, &b, &mut c).unwrap();
        // Children wrote into their private copies only.
        assert!(c.as_slice().iter().all(|&v| v == 0.0));
    }

    fn kill_self() -> ! {
        unsafe {
            libc::raise(libc::SIGKILL);
            libc::_exit(0)
        }
    }

    fn exit_three() -> ! {
        unsafe { libc::_exit(3) }
    }

    /// Fork a child that runs `body` and never returns to the caller.
    fn fork_with(body: fn() -> !) -> libc::pid_t {
        match unsafe { libc::fork() } {
            -1 => panic!("fork failed: {}", io::Error::last_os_error()),
            0 => body(),
            pid => pid,
        }
    }

    #[test]
    fn test_killed_child_reported_as_signal() {
        let pid = fork_with(kill_self);
        let err = wait_for(6, pid).unwrap_err();
        assert!(matches!(
            err,
            BenchError::WorkerSignaled {
                worker: 6,
                signal: libc::SIGKILL
            }
        ));
    }

    #[test]
    fn test_nonzero_exit_reported() {
        let pid = fork_with(exit_three);
        let err = wait_for(0, pid).unwrap_err();
        assert!(matches!(err, BenchError::WorkerFailed { worker: 0, status: 3 }));
    }

    #[test]
    fn test_fork_failure_reaps_started_children() {
        let n = 8;
        let (a, b) = seeded(n);
        let mut expected = vec![0.0; n * n];
        multiply(n, a.as_slice(), b.as_slice(), &mut expected);

        let mut c = SquareMatrix::zeros(n, Placement::Shared).unwrap();
        let tasks = build_tasks(
            n,
            &partition_rows(n, 4),
            a.as_slice(),
            b.as_slice(),
            c.as_mut_slice(),
        );
        let err = launch_with(tasks, |task| {
            if task.worker() < 2 {
                fork_worker(task)
            } else {
                Err(io::Error::from_raw_os_error(libc::EAGAIN))
            }
        })
        .unwrap_err();

        assert!(matches!(err, BenchError::Spawn { worker: 2, .. }), "{err}");
        // Both started children were reaped, so their rows are complete.
        assert_eq!(c.as_slice()[..4 * n], expected[..4 * n]);
        assert!(c.as_slice()[4 * n..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_panicking_child_reported() {
        let a = vec![1.0; 4];
        let b = vec![1.0; 4];
        // Band too short for two rows, so the kernel asserts in the child.
        let mut band = vec![0.0; 1];
        let task = WorkerTask::from_parts(3, 2, RowRange::new(0, 2), &a, &b, &mut band);
        let err = ProcessLauncher::new().launch_and_join(vec![task]).unwrap_err();
        assert!(matches!(
            err,
            BenchError::WorkerFailed {
                worker: 3,
                status: PANIC_EXIT_STATUS
            }
        ));
    }
}
