//! Mailsift Roles - Role-address detection.
//!
//! A role-based address names a function or team mailbox (`support@`,
//! `noreply@`) rather than a person. This crate loads the role dictionary and
//! regex list once into an immutable [`RoleRules`] and classifies addresses
//! with [`RoleFilter`].
//!
//! # Architecture
//!
//! - **Rules** ([`rules`]): TOML loading, built-in defaults, degraded empty set
//! - **Filter** ([`filter`]): ordered first-match classification and bulk filtering
//! - **Errors** ([`error`]): rule loading errors
//!
//! # Example
//!
//! ```rust
//! use mailsift_roles::{RoleFilter, RoleRules};
//!
//! let filter = RoleFilter::new(RoleRules::builtin());
//! let verdict = filter.classify("no-reply@shop.example");
//! assert!(verdict.role_based);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod filter;
pub mod rules;

// Re-export commonly used types
pub use error::{Result, RoleError};
pub use filter::{RoleDetail, RoleFilter, RoleFilterReport, RoleVerdict};
pub use rules::RoleRules;
