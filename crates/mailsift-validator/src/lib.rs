//! Mailsift Validator - per-address validity checks
//!
//! Decides whether an address is deliverable enough to keep:
//! - Strict local-part and domain format rules
//! - Trusted-provider allowlist
//! - Disposable-domain detection behind [`DisposableChecker`]
//! - Optional MX probing behind [`MxResolver`], with a hard timeout
//!
//! Validation never fails; an address that cannot be evaluated yields
//! [`mailsift_core::Verdict::undetermined`].
//!
//! # Example
//!
//! ```rust,no_run
//! use mailsift_validator::Validator;
//!
//! # async fn example() {
//! let validator = Validator::new(["gmail.com"]);
//! let verdict = validator.validate("jane@gmail.com").await;
//! assert!(verdict.is_valid());
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod cache;
pub mod disposable;
pub mod error;
pub mod format;
pub mod mx;
pub mod validator;

// Re-export commonly used types
pub use cache::ExpiringCache;
pub use disposable::{CachedDisposableChecker, DisposableChecker, DisposableList};
pub use error::{Result, ValidatorError};
pub use mx::{CachedMxResolver, HickoryMxResolver, MxResolver};
pub use validator::Validator;
