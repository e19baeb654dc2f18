//! Mailsift Pipeline - bulk classification jobs
//!
//! Submits a [`JobSource`] as a background job that deduplicates, filters
//! role mailboxes and validates every item, writing progress to a
//! [`mailsift_store::ProgressStore`] in batches.
//!
//! # Example
//!
//! ```rust,no_run
//! use mailsift_core::AppConfig;
//! use mailsift_pipeline::{JobRunner, JobSource};
//! use mailsift_store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let runner = JobRunner::from_config(&config, Arc::new(MemoryStore::new(&config.store)));
//!
//! let handle = runner
//!     .submit(JobSource::Items(vec!["jane@gmail.com".into()]))
//!     .await?;
//! let snapshot = runner.query().snapshot(handle.job_id()).await?;
//! println!("{} processed", snapshot.counters.processed);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod classify;
pub mod error;
pub mod runner;
pub mod source;

// Re-export commonly used types
pub use classify::{Classification, Classifier};
pub use error::{PipelineError, Result};
pub use runner::{JobHandle, JobReport, JobRunner};
pub use source::{JobSource, OpenedSource};
