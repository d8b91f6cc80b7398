use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("matrix dimension must be at least 1, got {0}")]
    InvalidDimension(usize),
    #[error("matrix of dimension {n} does not fit in the address space")]
    TooLarge { n: usize },
    #[error("data length mismatch: expected {expected} elements, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("failed to allocate {elements} elements: {source}")]
    Allocation {
        elements: usize,
        #[source]
        source: std::collections::TryReserveError,
    },
    #[error("failed to map shared region: {0}")]
    SharedMap(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MatrixError>;
