//! Mailsift Extract
//!
//! Turns raw bytes into a lazy, order-preserving sequence of candidate email
//! tokens. Nothing is deduplicated, case-folded or trimmed here; any run of
//! non-delimiter bytes with an inner `@` is a candidate.
//!
//! Two modes share one token pattern:
//!
//! - **Buffered** ([`Extractor::extract`]): scans content already in memory,
//!   capped at `max_tokens`.
//! - **Streaming** ([`Extractor::reader`], [`Extractor::stream`],
//!   [`Extractor::stream_file`]): reads fixed-size chunks through a
//!   [`TokenScanner`] so memory stays bounded regardless of source size.
//!
//! Token runs longer than `max_token_len` are dropped in both modes, which
//! keeps streaming output identical to buffered output for the same bytes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod pattern;
pub mod stream;

pub use pattern::{is_delimiter, Extractor, TokenScanner};
pub use stream::{stream_tokens, TokenReader};
