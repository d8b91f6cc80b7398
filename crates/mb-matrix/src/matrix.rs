use crate::error::{MatrixError, Result};
use crate::storage::{MatrixStorage, Placement};

/// An n×n matrix of f64 values stored contiguously in row-major order.
///
/// Element (i, j) lives at offset `i * n + j`. The buffer is allocated once
/// and reused; `zero` resets it in place between repeats.
#[derive(Debug)]
pub struct SquareMatrix {
    storage: MatrixStorage,
    n: usize,
}

impl SquareMatrix {
    /// Allocate a zero-filled n×n matrix with the given placement.
    ///
    /// # Errors
    /// Returns `InvalidDimension` for `n == 0`, `TooLarge` if `n * n`
    /// overflows, or the storage error if allocation fails.
    pub fn zeros(n: usize, placement: Placement) -> Result<Self> {
        let len = Self::element_count(n)?;
        Ok(SquareMatrix {
            storage: MatrixStorage::zeros(placement, len)?,
            n,
        })
    }

    /// Create a heap matrix from explicit row-major data.
    ///
    /// # Errors
    /// Returns `LengthMismatch` if `data.len() != n * n`.
    pub fn from_vec(n: usize, data: Vec<f64>) -> Result<Self> {
        let len = Self::element_count(n)?;
        if data.len() != len {
            return Err(MatrixError::LengthMismatch {
                expected: len,
                got: data.len(),
            });
        }
        Ok(SquareMatrix {
            storage: MatrixStorage::Heap(data),
            n,
        })
    }

    fn element_count(n: usize) -> Result<usize> {
        if n == 0 {
            return Err(MatrixError::InvalidDimension(n));
        }
        n.checked_mul(n).ok_or(MatrixError::TooLarge { n })
    }

    /// Matrix dimension n.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Total number of elements (n²).
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Always false: a matrix has at least one element.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn placement(&self) -> Placement {
        self.storage.placement()
    }

    pub fn as_slice(&self) -> &[f64] {
        self.storage.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        self.storage.as_mut_slice()
    }

    /// Element at row `i`, column `j`.
    ///
    /// # Panics
    /// Panics if `i` or `j` is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of range for n={}", self.n);
        self.as_slice()[i * self.n + j]
    }

    /// Row `i` as a slice of n elements.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.as_slice()[i * self.n..(i + 1) * self.n]
    }

    /// Reset every element to 0.0.
    pub fn zero(&mut self) {
        self.storage.fill(0.0);
    }
}
