use tabgen_db::StorageError;
use thiserror::Error;

/// Failures that stop a whole batch. Per-tool failures are reported as
/// [`OutcomeStatus::Failed`](crate::OutcomeStatus::Failed) instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("catalog storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("tool {0:?} is not in the catalog")]
    UnknownTool(String),
}
