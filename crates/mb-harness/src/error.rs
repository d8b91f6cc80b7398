use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("matrix error: {0}")]
    Matrix(#[from] mb_matrix::MatrixError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to start worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to wait for worker {worker}: {source}")]
    Wait {
        worker: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
    #[error("worker {worker} exited with status {status}")]
    WorkerFailed { worker: usize, status: i32 },
    #[error("worker {worker} was terminated by signal {signal}")]
    WorkerSignaled { worker: usize, signal: i32 },
    #[error("{0} strategy is not supported on this platform")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, BenchError>;
