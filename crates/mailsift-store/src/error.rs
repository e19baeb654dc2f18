use mailsift_core::JobId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Job not found or expired: {job_id}")]
    NotFound { job_id: JobId },

    #[error("Job already finished: {job_id}")]
    Finished { job_id: JobId },

    #[error("Store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the job is unknown or past its TTL.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
