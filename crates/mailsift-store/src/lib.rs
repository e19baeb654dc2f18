//! Mailsift Store - per-job progress state
//!
//! Holds, for every job:
//! - Counters (`total`, `processed`, `valid`, `invalid`, `role_rejected`, `duplicates`)
//! - Four result lists (valid, invalid, role, duplicates), each a bounded sample
//! - The dedup membership set
//! - A small window of the newest detailed records
//! - The done flag
//!
//! All of it expires together after the job TTL. [`ProgressStore`] is the
//! backend seam; [`MemoryStore`] is the in-process backend and [`JobQuery`]
//! the read-only surface.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod backend;
pub mod batch;
pub mod error;
pub mod memory;
pub mod query;

// Re-export commonly used types
pub use backend::{ListChunk, ProgressSnapshot, ProgressStore};
pub use batch::Batch;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use query::JobQuery;
