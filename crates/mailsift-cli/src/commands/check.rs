use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use mailsift_core::{AppConfig, ListKind};
use mailsift_pipeline::{JobRunner, JobSource};
use mailsift_store::{MemoryStore, ProgressSnapshot};
use tracing::info;

/// Arguments of the `check` command.
pub struct CheckArgs {
    pub emails: Vec<String>,
    pub file: Option<PathBuf>,
    pub text: Option<PathBuf>,
    pub dump: Option<ListKind>,
    pub poll_ms: u64,
    pub json: bool,
}

/// Execute the `check` command: run one job to completion, logging progress.
pub async fn execute(config: &AppConfig, args: CheckArgs) -> Result<()> {
    let source = source_from(&args).await?;

    let store = Arc::new(MemoryStore::new(&config.store));
    let runner = JobRunner::from_config(config, store);
    let reaper = runner.spawn_reaper(config.store.reap_interval());
    let query = runner.query();

    let handle = runner.submit(source).await?;
    let job = handle.job_id().clone();

    let mut ticker = tokio::time::interval(Duration::from_millis(args.poll_ms.max(10)));
    let wait = handle.wait();
    tokio::pin!(wait);

    let report = loop {
        tokio::select! {
            report = &mut wait => break report?,
            _ = tokio::signal::ctrl_c() => {
                info!(job_id = %job, "interrupted, stopping job");
                runner.shutdown();
            }
            _ = ticker.tick() => {
                let snap = query.snapshot(&job).await?;
                let c = snap.counters;
                info!(
                    job_id = %job,
                    status = ?snap.status,
                    processed = c.processed,
                    total = c.total,
                    valid = c.valid,
                    invalid = c.invalid,
                    "progress"
                );
            }
        }
    };

    let snapshot = query.snapshot(&job).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&snapshot);
    }

    if let Some(kind) = args.dump {
        let mut out = io::stdout();
        query.export(&job, kind, &mut out).await?;
        out.flush()?;
    }

    runner.shutdown();
    reaper.await.context("Reaper task failed")?;

    if !report.completed {
        bail!("Job {job} stopped before all input was processed");
    }
    Ok(())
}

async fn source_from(args: &CheckArgs) -> Result<JobSource> {
    if let Some(path) = &args.file {
        if path.as_os_str() == "-" {
            return Ok(JobSource::Reader(Box::new(tokio::io::stdin())));
        }
        return Ok(JobSource::File(path.clone()));
    }

    if let Some(path) = &args.text {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(JobSource::Text(content));
    }

    if args.emails.is_empty() {
        bail!("Nothing to check: pass addresses, --file or --text");
    }
    Ok(JobSource::Items(args.emails.clone()))
}

fn print_summary(snapshot: &ProgressSnapshot) {
    let c = snapshot.counters;
    let total = if c.total == 0 && !snapshot.done {
        "unknown".to_string()
    } else {
        c.total.to_string()
    };

    println!("{:12} {}", "job:", snapshot.job_id);
    println!("{:12} {:?}", "status:", snapshot.status);
    println!("{:12} {} (total {})", "processed:", c.processed, total);
    println!("{:12} {}", "valid:", c.valid);
    println!("{:12} {} (role {})", "invalid:", c.invalid, c.role_rejected);
    println!("{:12} {}", "duplicates:", c.duplicates);
}
