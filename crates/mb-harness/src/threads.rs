use std::thread;

use mb_matrix::Placement;
use tracing::{debug, warn};

use crate::error::{BenchError, Result};
use crate::launcher::Launcher;
use crate::task::WorkerTask;

/// Runs each task on its own scoped thread in this address space.
///
/// A, B and C are borrowed directly; nothing is copied. Threads are created
/// and joined every call, there is no pool.
#[derive(Debug, Clone, Default)]
pub struct ThreadLauncher;

impl ThreadLauncher {
    pub fn new() -> Self {
        ThreadLauncher
    }
}

impl Launcher for ThreadLauncher {
    fn name(&self) -> &str {
        "threads"
    }

    fn placement(&self) -> Placement {
        Placement::Heap
    }

    fn launch_and_join(&self, tasks: Vec<WorkerTask<'_>>) -> Result<()> {
        launch_with(tasks, |worker| {
            thread::Builder::new().name(format!("matmul-worker-{worker}"))
        })
    }
}

/// Spawn every task on a thread from `builder`, then join them all.
fn launch_with<F>(tasks: Vec<WorkerTask<'_>>, builder: F) -> Result<()>
where
    F: Fn(usize) -> thread::Builder,
{
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(tasks.len());
        let mut launch_error = None;

        for task in tasks {
            let worker = task.worker();
            let rows = task.rows();
            match builder(worker).spawn_scoped(scope, move || task.run()) {
                Ok(handle) => {
                    debug!(worker, %rows, "thread started");
                    handles.push((worker, handle));
                }
                Err(source) => {
                    launch_error = Some(BenchError::Spawn { worker, source });
                    break;
                }
            }
        }

        if launch_error.is_some() && !handles.is_empty() {
            warn!(started = handles.len(), "spawn failed, joining started workers");
        }

        // Join every started thread before reporting anything, so no
        // worker outlives this call.
        let mut worker_error = None;
        for (worker, handle) in handles {
            match handle.join() {
                Ok(()) => debug!(worker, "thread joined"),
                Err(_) if worker_error.is_none() => {
                    worker_error = Some(BenchError::WorkerPanicked { worker });
                }
                Err(_) => {}
            }
        }

        match launch_error.or(worker_error) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::build_tasks;
    use mb_matrix::{fill_seeded, multiply, partition_rows, RowRange, SquareMatrix};

    fn seeded(n: usize) -> (SquareMatrix, SquareMatrix) {
        let mut a = SquareMatrix::zeros(n, Placement::Heap).unwrap();
        let mut b = SquareMatrix::zeros(n, Placement::Heap).unwrap();
        fill_seeded(&mut a, &mut b, 42).unwrap();
        (a, b)
    }

    fn run_threads(n: usize, workers: usize, a: &SquareMatrix, b: &SquareMatrix) -> Vec<f64> {
        let mut c = vec![0.0; n * n];
        let tasks = build_tasks(
            n,
            &partition_rows(n, workers),
            a.as_slice(),
            b.as_slice(),
            &mut c,
        );
        ThreadLauncher::new().launch_and_join(tasks).unwrap();
        c
    }

    #[test]
    fn test_matches_single_worker() {
        let n = 23;
        let (a, b) = seeded(n);
        let mut expected = vec![0.0; n * n];
        multiply(n, a.as_slice(), b.as_slice(), &mut expected);

        for workers in [1, 2, 3, 4, 7, 16] {
            assert_eq!(run_threads(n, workers, &a, &b), expected, "workers={workers}");
        }
    }

    #[test]
    fn test_n4_w2_scenario() {
        let n = 4;
        let (a, b) = seeded(n);
        let c = run_threads(n, 2, &a, &b);
        for i in 0..n {
            for j in 0..n {
                let mut sum = 0.0;
                for k in 0..n {
                    sum += a.get(i, k) * b.get(k, j);
                }
                assert_eq!(c[i * n + j], sum, "C[{i}][{j}]");
            }
        }
    }

    #[test]
    fn test_more_workers_than_rows() {
        let a = SquareMatrix::from_vec(1, vec![3.0]).unwrap();
        let b = SquareMatrix::from_vec(1, vec![2.5]).unwrap();
        assert_eq!(run_threads(1, 4, &a, &b), vec![7.5]);
    }

    #[test]
    fn test_panicking_worker_reported_after_join() {
        let a = vec![1.0; 4];
        let b = vec![1.0; 4];
        let mut good = vec![0.0; 2];
        let mut bad = vec![0.0; 1];
        let tasks = vec![
            WorkerTask::from_parts(0, 2, RowRange::new(0, 1), &a, &b, &mut good),
            WorkerTask::from_parts(1, 2, RowRange::new(1, 2), &a, &b, &mut bad),
        ];
        let err = ThreadLauncher::new().launch_and_join(tasks).unwrap_err();
        assert!(matches!(err, BenchError::WorkerPanicked { worker: 1 }));
        assert_eq!(good, vec![2.0, 2.0]);
    }

    #[test]
    fn test_spawn_failure_joins_started_workers() {
        let n = 8;
        let (a, b) = seeded(n);
        let mut expected = vec![0.0; n * n];
        multiply(n, a.as_slice(), b.as_slice(), &mut expected);

        let mut c = vec![0.0; n * n];
        let tasks = build_tasks(
            n,
            &partition_rows(n, 4),
            a.as_slice(),
            b.as_slice(),
            &mut c,
        );
        // No address space can hold this stack, so the third spawn fails.
        let err = launch_with(tasks, |worker| {
            let builder = thread::Builder::new();
            if worker == 2 {
                builder.stack_size(usize::MAX / 4)
            } else {
                builder
            }
        })
        .unwrap_err();

        assert!(matches!(err, BenchError::Spawn { worker: 2, .. }), "{err}");
        // Workers 0 and 1 ran to completion before the error came back.
        assert_eq!(c[..4 * n], expected[..4 * n]);
        assert!(c[4 * n..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_empty_task_list() {
        assert!(ThreadLauncher::new().launch_and_join(Vec::new()).is_ok());
    }
}
