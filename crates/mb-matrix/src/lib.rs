//! `mb-matrix` - Dense square matrix buffers and the pure algorithms of matbench.
//!
//! This crate provides:
//! - A `SquareMatrix` stored row-major in either heap or shared memory
//! - A `SharedRegion` that stays visible to the parent across `fork`
//! - The row partitioner that splits `[0, n)` among workers
//! - The i-j-k multiply kernel each worker runs over its rows
//! - Seeded initialisation of the input matrices

pub mod error;
pub mod init;
pub mod kernel;
pub mod matrix;
pub mod partition;
pub mod shared;
pub mod storage;

// Re-export primary types at the crate root for convenience.
pub use error::{MatrixError, Result};
pub use init::{fill_seeded, DEFAULT_SEED};
pub use kernel::{multiply, multiply_rows};
pub use matrix::SquareMatrix;
pub use partition::{partition_rows, RowRange};
pub use shared::SharedRegion;
pub use storage::{MatrixStorage, Placement};
