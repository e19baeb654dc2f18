//! Mailsift Core - Foundation crate for the mailsift email job pipeline.
//!
//! This crate provides the shared types, error handling and configuration
//! that the extractor, role filter, validator, progress store and pipeline
//! crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Job identifiers, list kinds, verdicts and counters
//!
//! # Example
//!
//! ```rust
//! use mailsift_core::{AppConfig, JobId, ListKind};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//!
//! let job_id = JobId::generate();
//! let kind: ListKind = "duplicates".parse()?;
//! println!("job {job_id} list {kind}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, ExtractConfig, PipelineConfig, RolesConfig, StoreConfig, ValidationConfig,
};
pub use error::{ConfigError, ConfigResult, MailsiftError, Result};
pub use types::{
    normalize_key, ClassificationRecord, JobCounters, JobId, JobStatus, ListKind, MxStatus,
    Outcome, Timestamp, Verdict,
};
