use mailsift_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Submission contains no addresses")]
    EmptySubmission,

    #[error("Input source error: {0}")]
    Source(#[from] std::io::Error),

    #[error("Progress store error: {0}")]
    Store(#[from] StoreError),

    #[error("Job task aborted: {0}")]
    Aborted(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
