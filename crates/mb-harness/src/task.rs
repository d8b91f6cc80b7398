use mb_matrix::{multiply_rows, RowRange};

/// Everything one worker needs for one repeat.
///
/// `c_rows` is the worker's own band of the output matrix; bands handed out
/// by [`build_tasks`] never overlap, which is what lets workers write C
/// concurrently without locking.
#[derive(Debug)]
pub struct WorkerTask<'a> {
    worker: usize,
    n: usize,
    rows: RowRange,
    a: &'a [f64],
    b: &'a [f64],
    c_rows: &'a mut [f64],
}

impl<'a> WorkerTask<'a> {
    /// Assemble a task without the contiguity checks of [`build_tasks`].
    #[cfg(test)]
    pub(crate) fn from_parts(
        worker: usize,
        n: usize,
        rows: RowRange,
        a: &'a [f64],
        b: &'a [f64],
        c_rows: &'a mut [f64],
    ) -> Self {
        WorkerTask {
            worker,
            n,
            rows,
            a,
            b,
            c_rows,
        }
    }

    /// Index of the worker this task belongs to.
    pub fn worker(&self) -> usize {
        self.worker
    }

    pub fn rows(&self) -> RowRange {
        self.rows
    }

    /// Run the multiply kernel over this task's rows. Consumes the task.
    pub fn run(self) {
        multiply_rows(self.n, self.rows, self.a, self.b, self.c_rows);
    }
}

/// Build one task per range, splitting `c` into the matching row bands.
///
/// # Panics
/// Panics if the ranges are not contiguous from row 0, or if a slice is not
/// n×n.
pub fn build_tasks<'a>(
    n: usize,
    ranges: &[RowRange],
    a: &'a [f64],
    b: &'a [f64],
    c: &'a mut [f64],
) -> Vec<WorkerTask<'a>> {
    assert_eq!(c.len(), n * n, "C: expected {}x{}={} elements", n, n, n * n);

    let mut rest = c;
    let mut next_row = 0;
    let mut tasks = Vec::with_capacity(ranges.len());
    for (worker, &rows) in ranges.iter().enumerate() {
        assert_eq!(rows.start, next_row, "range {rows} is not contiguous");
        let (band, tail) = std::mem::take(&mut rest).split_at_mut(rows.len() * n);
        rest = tail;
        next_row = rows.end;
        tasks.push(WorkerTask {
            worker,
            n,
            rows,
            a,
            b,
            c_rows: band,
        });
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use mb_matrix::{multiply, partition_rows};

    #[test]
    fn test_bands_follow_ranges() {
        let n = 5;
        let a = vec![0.0; n * n];
        let b = vec![0.0; n * n];
        let mut c = vec![0.0; n * n];
        let ranges = partition_rows(n, 3);
        let tasks = build_tasks(n, &ranges, &a, &b, &mut c);
        assert_eq!(tasks.len(), 3);
        let band_lens: Vec<usize> = tasks.iter().map(|t| t.c_rows.len()).collect();
        assert_eq!(band_lens, vec![10, 10, 5]);
        assert_eq!(tasks[2].worker(), 2);
        assert_eq!(tasks[2].rows(), RowRange::new(4, 5));
    }

    #[test]
    fn test_empty_ranges_get_empty_bands() {
        let n = 1;
        let a = vec![2.0];
        let b = vec![3.0];
        let mut c = vec![0.0];
        let ranges = partition_rows(n, 4);
        let tasks = build_tasks(n, &ranges, &a, &b, &mut c);
        assert!(tasks[1..].iter().all(|t| t.c_rows.is_empty()));
        for task in tasks {
            task.run();
        }
        assert_eq!(c, vec![6.0]);
    }

    #[test]
    fn test_sequential_run_matches_reference() {
        let n = 6;
        let a: Vec<f64> = (0..n * n).map(|i| i as f64 * 0.5).collect();
        let b: Vec<f64> = (0..n * n).map(|i| (n * n - i) as f64).collect();
        let mut expected = vec![0.0; n * n];
        multiply(n, &a, &b, &mut expected);

        let mut c = vec![0.0; n * n];
        for task in build_tasks(n, &partition_rows(n, 4), &a, &b, &mut c) {
            task.run();
        }
        assert_eq!(c, expected);
    }

    #[test]
    #[should_panic(expected = "not contiguous")]
    fn test_gap_rejected() {
        let a = vec![0.0; 4];
        let b = vec![0.0; 4];
        let mut c = vec![0.0; 4];
        build_tasks(2, &[RowRange::new(1, 2)], &a, &b, &mut c);
    }
}
