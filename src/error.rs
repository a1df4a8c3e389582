use thiserror::Error;

// Unified error type for stencil1d

#[derive(Error, Debug)]
pub enum StencilError {
    #[error("task count must be at least 1")]
    NoTasks,
    #[error("domain must contain at least one interior point")]
    EmptyDomain,
    #[error("n = {n} is not a multiple of tasks = {tasks}")]
    UnevenPartition { n: usize, tasks: usize },
    #[error("{tasks} tasks cannot each own a point of a domain of size {n}")]
    TooManyTasks { n: usize, tasks: usize },
    #[error("{buffer} buffer has length {actual}, expected {expected}")]
    BufferLength {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("barrier has no registered parties")]
    NoParties,
    #[error("synchronization wait was cancelled")]
    Cancelled,
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("unknown remainder policy: {0}")]
    UnknownPolicy(String),
}

impl StencilError {
    /// True for errors raised by configuration checks, before any worker runs.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            StencilError::NoTasks
                | StencilError::EmptyDomain
                | StencilError::UnevenPartition { .. }
                | StencilError::TooManyTasks { .. }
                | StencilError::BufferLength { .. }
                | StencilError::UnknownStrategy(_)
                | StencilError::UnknownPolicy(_)
        )
    }
}
