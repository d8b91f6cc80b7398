use crate::error::{MatrixError, Result};
use crate::shared::SharedRegion;

/// Where a matrix buffer is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Private heap memory; visible to threads of this process only.
    Heap,
    /// A shared mapping that forked children write through.
    Shared,
}

/// Backing storage for a matrix buffer.
#[derive(Debug)]
pub enum MatrixStorage {
    /// Heap-allocated f64 storage.
    Heap(Vec<f64>),
    /// f64 storage inside a shared memory mapping.
    Shared(SharedRegion),
}

impl MatrixStorage {
    /// Create zero-filled storage of `len` elements with the given placement.
    ///
    /// # Errors
    /// Returns `Allocation` if the heap reservation fails, or the shared
    /// region's error if the mapping cannot be created.
    pub fn zeros(placement: Placement, len: usize) -> Result<Self> {
        match placement {
            Placement::Heap => {
                let mut v = Vec::new();
                v.try_reserve_exact(len)
                    .map_err(|source| MatrixError::Allocation {
                        elements: len,
                        source,
                    })?;
                v.resize(len, 0.0);
                Ok(MatrixStorage::Heap(v))
            }
            Placement::Shared => Ok(MatrixStorage::Shared(SharedRegion::new(len)?)),
        }
    }

    /// Number of elements in this storage.
    pub fn len(&self) -> usize {
        match self {
            MatrixStorage::Heap(v) => v.len(),
            MatrixStorage::Shared(r) => r.len(),
        }
    }

    /// Returns true if the storage contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[f64] {
        match self {
            MatrixStorage::Heap(v) => v.as_slice(),
            MatrixStorage::Shared(r) => r.as_slice(),
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        match self {
            MatrixStorage::Heap(v) => v.as_mut_slice(),
            MatrixStorage::Shared(r) => r.as_mut_slice(),
        }
    }

    /// Overwrite every element with `value`.
    pub fn fill(&mut self, value: f64) {
        self.as_mut_slice().fill(value);
    }

    /// Returns the placement of this storage.
    pub fn placement(&self) -> Placement {
        match self {
            MatrixStorage::Heap(_) => Placement::Heap,
            MatrixStorage::Shared(_) => Placement::Shared,
        }
    }
}
