use std::fmt;
use std::ops::Range;

/// A contiguous span of matrix rows `[start, end)` owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    /// # Panics
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "row range end {end} precedes start {start}");
        RowRange { start, end }
    }

    /// Number of rows in the range.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for the zero-row ranges given to surplus workers.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Iterator over the row indices in the range.
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Split rows `[0, n)` into `workers` contiguous, non-overlapping ranges.
///
/// Each worker gets `n / workers` rows; the first `n % workers` workers get
/// one extra. Ranges are laid out in worker order with no gaps, so sizes
/// never increase with the worker index and differ by at most one. When
/// `workers > n` the trailing ranges are empty.
///
/// # Panics
/// Panics if `workers == 0`. Callers clamp the worker count first.
pub fn partition_rows(n: usize, workers: usize) -> Vec<RowRange> {
    assert!(workers > 0, "worker count must be at least 1");

    let base = n / workers;
    let rem = n % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for k in 0..workers {
        let rows = base + usize::from(k < rem);
        ranges.push(RowRange::new(start, start + rows));
        start += rows;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_partition(n: usize, w: usize) {
        let ranges = partition_rows(n, w);
        assert_eq!(ranges.len(), w, "n={n} w={w}");
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges[w - 1].end, n);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap or overlap for n={n} w={w}");
            assert!(pair[0].len() >= pair[1].len());
        }
        let max = ranges.iter().map(RowRange::len).max().unwrap();
        let min = ranges.iter().map(RowRange::len).min().unwrap();
        assert!(max - min <= 1);
        let total: usize = ranges.iter().map(RowRange::len).sum();
        assert_eq!(total, n);
        let extra = ranges.iter().filter(|r| r.len() == n / w + 1).count();
        assert_eq!(extra, n % w);
    }

    #[test]
    fn test_partition_properties() {
        for n in 1..=40 {
            for w in 1..=48 {
                check_partition(n, w);
            }
        }
        check_partition(800, 7);
        check_partition(1000, 16);
    }

    #[test]
    fn test_even_split() {
        assert_eq!(
            partition_rows(4, 2),
            vec![RowRange::new(0, 2), RowRange::new(2, 4)]
        );
    }

    #[test]
    fn test_remainder_goes_first() {
        let ranges = partition_rows(10, 4);
        let sizes: Vec<usize> = ranges.iter().map(RowRange::len).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_more_workers_than_rows() {
        let ranges = partition_rows(1, 4);
        assert_eq!(ranges[0], RowRange::new(0, 1));
        for r in &ranges[1..] {
            assert!(r.is_empty());
            assert_eq!(r.start, 1);
        }
    }

    #[test]
    fn test_single_worker() {
        assert_eq!(partition_rows(9, 1), vec![RowRange::new(0, 9)]);
    }

    #[test]
    #[should_panic(expected = "worker count")]
    fn test_zero_workers_panics() {
        partition_rows(4, 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(RowRange::new(2, 5).to_string(), "[2, 5)");
        assert_eq!(RowRange::new(2, 5).rows().collect::<Vec<_>>(), vec![2, 3, 4]);
    }
}
