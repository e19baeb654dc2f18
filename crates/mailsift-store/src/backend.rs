//! Storage trait for job progress.

use crate::batch::Batch;
use crate::error::Result;
use async_trait::async_trait;
use mailsift_core::{ClassificationRecord, JobCounters, JobId, JobStatus, ListKind, Timestamp, Verdict};
use serde::{Deserialize, Serialize};

/// Cheap view of a job: counters, done flag and the newest detailed records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Job identifier
    pub job_id: JobId,
    /// Counters at the time of the read
    pub counters: JobCounters,
    /// Whether the job ran to completion
    pub done: bool,
    /// Lifecycle derived from counters and `done`
    pub status: JobStatus,
    /// When the job was initialised
    pub created_at: Timestamp,
    /// Newest validator outcomes first
    pub recent: Vec<ClassificationRecord>,
}

/// One page of a result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListChunk {
    /// Items in list order
    pub items: Vec<String>,
    /// Offset to request next
    pub next_offset: usize,
    /// Whether the page reaches the current end of the list
    pub eof: bool,
}

/// Shared per-job progress state.
///
/// All state of a job expires together after the configured TTL; an expired
/// job is indistinguishable from one that never existed. Every mutation is
/// atomic with respect to the job's counters and lists. Once a job is
/// finished, mutations fail with [`crate::StoreError::Finished`].
///
/// Result lists are a bounded sample: each keeps at most the configured
/// number of newest entries while counters keep counting.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Create (or reset) a job with zeroed counters.
    async fn init(&self, job: &JobId, total: u64) -> Result<()>;

    /// Atomically test-and-insert the normalized key of `raw`.
    ///
    /// Returns `true` if it was already present, in which case the duplicate
    /// has been recorded; `false` for a first sighting.
    ///
    /// A first sighting is not counted here: its key stays in the seen-set
    /// without a matching `processed` increment until the caller records the
    /// item's outcome (directly or through [`ProgressStore::apply_batch`]).
    /// Callers that batch outcomes therefore briefly hold more seen keys than
    /// processed items; `processed = valid + invalid + duplicates` holds
    /// throughout.
    async fn mark_seen(&self, job: &JobId, raw: &str) -> Result<bool>;

    /// Record a role-based item.
    async fn record_role(&self, job: &JobId, raw: &str) -> Result<()> {
        let mut batch = Batch::new();
        batch.push_role(raw);
        self.apply_batch(job, batch).await
    }

    /// Record a validator outcome.
    async fn record_outcome(&self, job: &JobId, raw: &str, verdict: Verdict) -> Result<()> {
        let mut batch = Batch::new();
        batch.push_checked(raw, verdict);
        self.apply_batch(job, batch).await
    }

    /// Apply buffered outcomes in one step.
    async fn apply_batch(&self, job: &JobId, batch: Batch) -> Result<()>;

    /// Mark the job done. Calling it again changes nothing.
    async fn finish(&self, job: &JobId) -> Result<()>;

    /// Counters, done flag and recent records.
    async fn snapshot(&self, job: &JobId) -> Result<ProgressSnapshot>;

    /// Page through one list. `limit` is clamped to the store's maximum.
    async fn chunk(&self, job: &JobId, kind: ListKind, offset: usize, limit: usize)
        -> Result<ListChunk>;

    /// Every retained item of one list.
    async fn dump(&self, job: &JobId, kind: ListKind) -> Result<Vec<String>>;

    /// Drop a job. Returns whether it existed.
    async fn delete(&self, job: &JobId) -> Result<bool>;

    /// Drop every expired job. Returns how many were removed.
    async fn purge_expired(&self) -> Result<usize>;
}
