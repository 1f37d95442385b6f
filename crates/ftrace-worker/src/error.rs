//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Startup and wiring errors. Once a run is underway the processor stops
/// propagating and folds every failure into the run outcome instead.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Worker configuration error: {0}")]
    Config(String),

    #[error("Feed client error: {0}")]
    Feed(#[from] ftrace_firms::FeedError),

    #[error("Event store error: {0}")]
    Store(#[from] ftrace_store::StoreError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] ftrace_pipeline::PipelineError),
}

impl WorkerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
