//! In-process progress store.

use crate::backend::{ListChunk, ProgressSnapshot, ProgressStore};
use crate::batch::Batch;
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use mailsift_core::{
    normalize_key, ClassificationRecord, JobCounters, JobId, JobStatus, ListKind, StoreConfig,
    Timestamp,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Bounded list that drops its oldest entries past `cap`.
#[derive(Debug, Default)]
struct SampleList {
    items: VecDeque<String>,
}

impl SampleList {
    fn extend(&mut self, items: impl IntoIterator<Item = String>, cap: usize) {
        for item in items {
            if self.items.len() == cap {
                self.items.pop_front();
            }
            self.items.push_back(item);
        }
    }
}

#[derive(Debug)]
struct JobState {
    counters: JobCounters,
    done: bool,
    created_at: Timestamp,
    expires_at: Instant,
    seen: HashSet<String>,
    valid: SampleList,
    invalid: SampleList,
    role: SampleList,
    duplicates: SampleList,
    recent: VecDeque<ClassificationRecord>,
}

impl JobState {
    fn new(total: u64, ttl: Duration) -> Self {
        Self {
            counters: JobCounters {
                total,
                ..JobCounters::default()
            },
            done: false,
            created_at: Timestamp::now(),
            expires_at: Instant::now() + ttl,
            seen: HashSet::new(),
            valid: SampleList::default(),
            invalid: SampleList::default(),
            role: SampleList::default(),
            duplicates: SampleList::default(),
            recent: VecDeque::new(),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }

    fn list(&self, kind: ListKind) -> &VecDeque<String> {
        match kind {
            ListKind::Valid => &self.valid.items,
            ListKind::Invalid => &self.invalid.items,
            ListKind::Role => &self.role.items,
            ListKind::Duplicates => &self.duplicates.items,
        }
    }
}

type JobSlot = Arc<Mutex<JobState>>;

/// [`ProgressStore`] kept in process memory.
///
/// The job map is only write-locked to add or remove jobs; each job has its
/// own mutex, so work on one job never blocks another.
#[derive(Debug)]
pub struct MemoryStore {
    jobs: RwLock<HashMap<JobId, JobSlot>>,
    ttl: Duration,
    sample_limit: usize,
    recent_limit: usize,
    max_chunk_limit: usize,
}

impl MemoryStore {
    /// Create a store with the given limits.
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            ttl: config.ttl(),
            sample_limit: config.sample_limit.max(1),
            recent_limit: config.recent_limit,
            max_chunk_limit: config.max_chunk_limit.max(1),
        }
    }

    /// Number of jobs held, expired ones included until purged.
    pub fn job_count(&self) -> Result<usize> {
        Ok(self.jobs.read().map_err(poisoned)?.len())
    }

    fn slot(&self, job: &JobId) -> Result<JobSlot> {
        self.jobs
            .read()
            .map_err(poisoned)?
            .get(job)
            .cloned()
            .ok_or_else(|| not_found(job))
    }

    /// Run `f` on a live job under its lock.
    fn with_job<T>(&self, job: &JobId, f: impl FnOnce(&mut JobState) -> Result<T>) -> Result<T> {
        let slot = self.slot(job)?;
        let mut state = slot.lock().map_err(poisoned)?;
        if state.is_expired(Instant::now()) {
            return Err(not_found(job));
        }
        f(&mut state)
    }

    /// Like [`Self::with_job`], but refuses finished jobs.
    fn with_running_job<T>(
        &self,
        job: &JobId,
        f: impl FnOnce(&mut JobState) -> Result<T>,
    ) -> Result<T> {
        self.with_job(job, |state| {
            if state.done {
                return Err(StoreError::Finished { job_id: job.clone() });
            }
            f(state)
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

fn not_found(job: &JobId) -> StoreError {
    StoreError::NotFound {
        job_id: job.clone(),
    }
}

fn poisoned<E>(_: E) -> StoreError {
    StoreError::Backend("progress store lock poisoned".to_string())
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn init(&self, job: &JobId, total: u64) -> Result<()> {
        let state = JobState::new(total, self.ttl);
        let replaced = self
            .jobs
            .write()
            .map_err(poisoned)?
            .insert(job.clone(), Arc::new(Mutex::new(state)))
            .is_some();

        info!(job_id = %job, total, replaced, "job initialised");
        Ok(())
    }

    async fn mark_seen(&self, job: &JobId, raw: &str) -> Result<bool> {
        let cap = self.sample_limit;
        self.with_running_job(job, |state| {
            if state.seen.insert(normalize_key(raw)) {
                return Ok(false);
            }
            state.counters.processed += 1;
            state.counters.duplicates += 1;
            state.duplicates.extend([raw.to_string()], cap);
            Ok(true)
        })
    }

    async fn apply_batch(&self, job: &JobId, batch: Batch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let cap = self.sample_limit;
        let recent_limit = self.recent_limit;
        let applied = batch.len();

        self.with_running_job(job, move |state| {
            state.counters.absorb(&batch.delta);

            state.valid.extend(batch.valid, cap);
            state.invalid.extend(batch.invalid, cap);
            state.role.extend(batch.role, cap);
            state.duplicates.extend(batch.duplicates, cap);

            for record in batch.recent {
                state.recent.push_front(record);
            }
            state.recent.truncate(recent_limit);
            Ok(())
        })?;

        debug!(job_id = %job, count = applied, "batch applied");
        Ok(())
    }

    async fn finish(&self, job: &JobId) -> Result<()> {
        let first = self.with_job(job, |state| Ok(!std::mem::replace(&mut state.done, true)))?;
        if first {
            info!(job_id = %job, "job finished");
        }
        Ok(())
    }

    async fn snapshot(&self, job: &JobId) -> Result<ProgressSnapshot> {
        self.with_job(job, |state| {
            Ok(ProgressSnapshot {
                job_id: job.clone(),
                counters: state.counters,
                done: state.done,
                status: JobStatus::from_progress(state.counters.processed, state.done),
                created_at: state.created_at,
                recent: state.recent.iter().cloned().collect(),
            })
        })
    }

    async fn chunk(
        &self,
        job: &JobId,
        kind: ListKind,
        offset: usize,
        limit: usize,
    ) -> Result<ListChunk> {
        let limit = limit.clamp(1, self.max_chunk_limit);
        self.with_job(job, |state| {
            let list = state.list(kind);
            let items: Vec<String> = list.iter().skip(offset).take(limit).cloned().collect();
            let next_offset = offset + items.len();
            Ok(ListChunk {
                eof: next_offset >= list.len(),
                items,
                next_offset,
            })
        })
    }

    async fn dump(&self, job: &JobId, kind: ListKind) -> Result<Vec<String>> {
        self.with_job(job, |state| Ok(state.list(kind).iter().cloned().collect()))
    }

    async fn delete(&self, job: &JobId) -> Result<bool> {
        let removed = self.jobs.write().map_err(poisoned)?.remove(job).is_some();
        if removed {
            debug!(job_id = %job, "job deleted");
        }
        Ok(removed)
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = Instant::now();
        let mut jobs = self.jobs.write().map_err(poisoned)?;
        let before = jobs.len();
        // A poisoned job lock is dropped along with the expired ones.
        jobs.retain(|_, slot| slot.lock().is_ok_and(|state| !state.is_expired(now)));
        let purged = before - jobs.len();

        if purged > 0 {
            info!(count = purged, "expired jobs purged");
        }
        Ok(purged)
    }
}
