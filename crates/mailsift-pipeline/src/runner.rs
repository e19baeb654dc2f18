//! Background job execution.
//!
//! A submitted job runs on its own Tokio task once a concurrency permit is
//! free. Items are processed strictly in order:
//!
//! 1. dedup through [`ProgressStore::mark_seen`] (duplicates are recorded
//!    by the store right away)
//! 2. role filtering
//! 3. validation
//!
//! Role and validator outcomes are buffered in a [`Batch`] and applied every
//! `flush_every` items, at the end of every `batch_window` items, and once
//! more when the job stops for any reason other than TTL expiry.

use crate::classify::{Classification, Classifier};
use crate::error::{PipelineError, Result};
use crate::source::JobSource;
use futures::stream::{BoxStream, StreamExt};
use mailsift_core::{AppConfig, JobCounters, JobId};
use mailsift_extract::Extractor;
use mailsift_store::{Batch, JobQuery, ProgressStore};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Summary returned when a job task ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Job identifier
    pub job_id: JobId,
    /// Progress written by this run; `total` is the submitted count
    pub counters: JobCounters,
    /// Whether the source was exhausted and the job marked done
    pub completed: bool,
}

/// Handle to a submitted job.
#[derive(Debug)]
pub struct JobHandle {
    job_id: JobId,
    task: JoinHandle<Result<JobReport>>,
}

impl JobHandle {
    /// Identifier to query progress with.
    #[must_use]
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Wait for the job task to end.
    pub async fn wait(self) -> Result<JobReport> {
        self.task
            .await
            .map_err(|e| PipelineError::Aborted(e.to_string()))?
    }
}

/// Why a job stopped before its source was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interruption {
    Cancelled,
    Expired,
}

/// Runs jobs against a shared progress store.
///
/// Cheap to clone; clones share the store, the concurrency limit and the
/// shutdown token.
#[derive(Clone)]
pub struct JobRunner {
    store: Arc<dyn ProgressStore>,
    classifier: Classifier,
    extractor: Extractor,
    flush_every: usize,
    batch_window: usize,
    job_ttl: Duration,
    permits: Arc<Semaphore>,
    shutdown: CancellationToken,
}

impl JobRunner {
    /// Create a runner from configuration.
    #[must_use]
    pub fn new(config: &AppConfig, store: Arc<dyn ProgressStore>, classifier: Classifier) -> Self {
        Self {
            store,
            classifier,
            extractor: Extractor::from_config(&config.extract),
            flush_every: config.pipeline.flush_every.max(1),
            batch_window: config.pipeline.batch_window.max(1),
            job_ttl: config.store.ttl(),
            permits: Arc::new(Semaphore::new(config.pipeline.max_concurrent_jobs.max(1))),
            shutdown: CancellationToken::new(),
        }
    }

    /// Create a runner whose classifier is also built from configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig, store: Arc<dyn ProgressStore>) -> Self {
        Self::new(config, store, Classifier::from_config(config))
    }

    /// Read-only queries over this runner's store.
    #[must_use]
    pub fn query(&self) -> JobQuery {
        JobQuery::new(self.store.clone())
    }

    /// Open `source`, create the job and start it in the background.
    ///
    /// Input errors are returned before any job state is created.
    pub async fn submit(&self, source: JobSource) -> Result<JobHandle> {
        let opened = source.open(&self.extractor).await?;

        let job_id = JobId::generate();
        self.store.init(&job_id, opened.total).await?;
        info!(job_id = %job_id, total = opened.total, "job submitted");

        let runner = self.clone();
        let token = self.shutdown.child_token();
        let task_job_id = job_id.clone();
        let total = opened.total;
        let items = opened.items;

        let task = tokio::spawn(async move {
            let result = runner.execute(&task_job_id, total, items, token).await;
            if let Err(e) = &result {
                error!(job_id = %task_job_id, error = %e, "job failed");
            }
            result
        });

        Ok(JobHandle { job_id, task })
    }

    /// Stop every running job. Pending work is flushed; jobs stay not done.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Periodically drop expired jobs until shutdown.
    #[must_use]
    pub fn spawn_reaper(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.store.clone();
        let token = self.shutdown.child_token();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => match store.purge_expired().await {
                        Ok(0) => {}
                        Ok(count) => debug!(count, "reaper purged expired jobs"),
                        Err(e) => warn!(error = %e, "reaper failed to purge jobs"),
                    },
                }
            }
        })
    }

    async fn execute(
        &self,
        job: &JobId,
        total: u64,
        mut items: BoxStream<'static, io::Result<String>>,
        token: CancellationToken,
    ) -> Result<JobReport> {
        let deadline = tokio::time::sleep_until(Instant::now() + self.job_ttl);
        tokio::pin!(deadline);

        let mut tally = JobCounters {
            total,
            ..JobCounters::default()
        };

        let _permit = tokio::select! {
            permit = self.permits.clone().acquire_owned() => {
                permit.map_err(|e| PipelineError::Aborted(e.to_string()))?
            }
            () = token.cancelled() => return Ok(interrupted(job, tally, Interruption::Cancelled)),
            () = &mut deadline => return Ok(interrupted(job, tally, Interruption::Expired)),
        };
        debug!(job_id = %job, "job started");

        let mut batch = Batch::new();
        let mut in_window = 0usize;

        let stop = loop {
            let next = tokio::select! {
                biased;
                () = token.cancelled() => break Some(Interruption::Cancelled),
                () = &mut deadline => break Some(Interruption::Expired),
                next = items.next() => next,
            };

            let raw = match next {
                Some(Ok(raw)) => raw,
                Some(Err(e)) => {
                    self.flush(job, &mut batch, &mut tally).await?;
                    return Err(PipelineError::Source(e));
                }
                None => break None,
            };

            if self.store.mark_seen(job, &raw).await? {
                tally.processed += 1;
                tally.duplicates += 1;
            } else {
                match self.classifier.classify(&raw).await {
                    Classification::Role(_) => batch.push_role(raw),
                    Classification::Checked(verdict) => batch.push_checked(raw, verdict),
                }
            }

            in_window += 1;
            if in_window == self.batch_window {
                in_window = 0;
                self.flush(job, &mut batch, &mut tally).await?;
            } else if batch.len() >= self.flush_every {
                self.flush(job, &mut batch, &mut tally).await?;
            }
        };

        match stop {
            None => {
                self.flush(job, &mut batch, &mut tally).await?;
                self.store.finish(job).await?;
                info!(
                    job_id = %job,
                    processed = tally.processed,
                    valid = tally.valid,
                    invalid = tally.invalid,
                    duplicates = tally.duplicates,
                    "job completed"
                );
                Ok(JobReport {
                    job_id: job.clone(),
                    counters: tally,
                    completed: true,
                })
            }
            Some(Interruption::Cancelled) => {
                self.flush(job, &mut batch, &mut tally).await?;
                Ok(interrupted(job, tally, Interruption::Cancelled))
            }
            // The job state expires with the deadline; nothing left to write to.
            Some(Interruption::Expired) => Ok(interrupted(job, tally, Interruption::Expired)),
        }
    }

    async fn flush(&self, job: &JobId, batch: &mut Batch, tally: &mut JobCounters) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let pending = batch.take();
        let delta = pending.delta();
        self.store.apply_batch(job, pending).await?;
        tally.absorb(&delta);
        Ok(())
    }
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("classifier", &self.classifier)
            .field("flush_every", &self.flush_every)
            .field("batch_window", &self.batch_window)
            .field("job_ttl", &self.job_ttl)
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}

fn interrupted(job: &JobId, tally: JobCounters, why: Interruption) -> JobReport {
    warn!(
        job_id = %job,
        reason = ?why,
        processed = tally.processed,
        "job stopped before its source was exhausted"
    );
    JobReport {
        job_id: job.clone(),
        counters: tally,
        completed: false,
    }
}
