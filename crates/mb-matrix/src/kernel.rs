use crate::partition::RowRange;

/// Compute output rows `rows` of C = A @ B for n×n row-major matrices.
///
/// `c_rows` is the band of C that belongs to `rows`: it holds
/// `rows.len() * n` elements and global row `i` lives at local row
/// `i - rows.start`. Every element of the band is assigned, never
/// accumulated into, so stale contents do not leak into the result.
///
/// The loop order is i, j, k with a scalar accumulator. The summation order
/// for a given element does not depend on how rows are split, so any
/// partitioning yields results bit-identical to a single worker.
///
/// # Panics
/// Panics if a slice length does not match `n` and `rows`.
pub fn multiply_rows(n: usize, rows: RowRange, a: &[f64], b: &[f64], c_rows: &mut [f64]) {
    assert_eq!(a.len(), n * n, "A: expected {}x{}={} elements", n, n, n * n);
    assert_eq!(b.len(), n * n, "B: expected {}x{}={} elements", n, n, n * n);
    assert!(rows.end <= n, "rows {rows} exceed matrix dimension {n}");
    assert_eq!(
        c_rows.len(),
        rows.len() * n,
        "C band: expected {} rows of {} elements",
        rows.len(),
        n
    );

    for (i, c_row) in rows.rows().zip(c_rows.chunks_exact_mut(n)) {
        let a_row = &a[i * n..(i + 1) * n];
        for (j, c_ij) in c_row.iter_mut().enumerate() {
            let mut sum = 0.0f64;
            for k in 0..n {
                sum += a_row[k] * b[k * n + j];
            }
            *c_ij = sum;
        }
    }
}

/// Sequential C = A @ B over all rows.
pub fn multiply(n: usize, a: &[f64], b: &[f64], c: &mut [f64]) {
    multiply_rows(n, RowRange::new(0, n), a, b, c);
}
