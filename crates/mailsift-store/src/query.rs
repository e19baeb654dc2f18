//! Read-only query surface over a progress store.

use crate::backend::{ListChunk, ProgressSnapshot, ProgressStore};
use crate::error::{Result, StoreError};
use mailsift_core::{JobId, JobStatus, ListKind};
use std::io::Write;
use std::sync::Arc;

/// Read operations a presentation layer needs: snapshot, pages and dumps.
#[derive(Clone)]
pub struct JobQuery {
    store: Arc<dyn ProgressStore>,
}

impl JobQuery {
    /// Query `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Counters, done flag and recent records.
    pub async fn snapshot(&self, job: &JobId) -> Result<ProgressSnapshot> {
        self.store.snapshot(job).await
    }

    /// Lifecycle state of a job.
    pub async fn status(&self, job: &JobId) -> Result<JobStatus> {
        Ok(self.store.snapshot(job).await?.status)
    }

    /// One page of a list.
    pub async fn chunk(
        &self,
        job: &JobId,
        kind: ListKind,
        offset: usize,
        limit: usize,
    ) -> Result<ListChunk> {
        self.store.chunk(job, kind, offset, limit).await
    }

    /// Every retained item of a list.
    pub async fn dump(&self, job: &JobId, kind: ListKind) -> Result<Vec<String>> {
        self.store.dump(job, kind).await
    }

    /// Write a list to `out`, one item per line. Returns the number of lines.
    pub async fn export<W: Write + Send>(
        &self,
        job: &JobId,
        kind: ListKind,
        out: &mut W,
    ) -> Result<usize> {
        let items = self.store.dump(job, kind).await?;
        for item in &items {
            writeln!(out, "{item}").map_err(|e| StoreError::Backend(format!("export failed: {e}")))?;
        }
        out.flush()
            .map_err(|e| StoreError::Backend(format!("export failed: {e}")))?;
        Ok(items.len())
    }
}

impl std::fmt::Debug for JobQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQuery").finish_non_exhaustive()
    }
}
