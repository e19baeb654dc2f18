//! Shared types used across the mailsift crates.
//!
//! This module defines job identifiers, the four outcome lists, the
//! validator verdict and the per-job counters.

use crate::error::MailsiftError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Newtype for job identifiers with validation.
///
/// Job IDs must be valid UUIDs (v4 format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Create a new `JobId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is not a valid UUID v4.
    pub fn new(id: impl Into<String>) -> Result<Self, MailsiftError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Create a new random `JobId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), MailsiftError> {
        static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = UUID_REGEX.get_or_init(|| {
            Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
                .expect("valid regex")
        });

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(MailsiftError::Validation(format!(
                "invalid job ID: must be a valid UUID v4, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = MailsiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// The four outcome lists a job keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// Addresses that passed format, allowlist, MX and disposable checks
    Valid,
    /// Addresses that failed validation, including role-based ones
    Invalid,
    /// Role-based addresses (also present in the invalid list)
    Role,
    /// Repeated addresses, compared by normalized key
    Duplicates,
}

impl ListKind {
    /// All list kinds, in display order.
    pub const ALL: [ListKind; 4] = [
        ListKind::Valid,
        ListKind::Invalid,
        ListKind::Role,
        ListKind::Duplicates,
    ];

    /// Wire name of the list.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Role => "role",
            Self::Duplicates => "duplicates",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListKind {
    type Err = MailsiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "valid" => Ok(Self::Valid),
            "invalid" => Ok(Self::Invalid),
            "role" => Ok(Self::Role),
            "duplicates" => Ok(Self::Duplicates),
            other => Err(MailsiftError::Validation(format!(
                "unknown list kind '{other}' (expected valid, invalid, role or duplicates)"
            ))),
        }
    }
}

/// Classification outcome of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Normalized key already seen in this job
    Duplicate,
    /// Rejected as a role-based address
    Role,
    /// Passed validation
    Valid,
    /// Failed validation
    Invalid,
}

/// MX presence for a domain.
///
/// Serialized as `true`, `false` or `null` so that "not probed" is never
/// confused with "confirmed absent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum MxStatus {
    /// Probed, at least one MX record
    Present,
    /// Probed and absent, or probing failed or timed out
    Absent,
    /// Deliberately not probed
    Unknown,
}

impl From<Option<bool>> for MxStatus {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Present,
            Some(false) => Self::Absent,
            None => Self::Unknown,
        }
    }
}

impl From<MxStatus> for Option<bool> {
    fn from(value: MxStatus) -> Self {
        match value {
            MxStatus::Present => Some(true),
            MxStatus::Absent => Some(false),
            MxStatus::Unknown => None,
        }
    }
}

impl From<bool> for MxStatus {
    fn from(value: bool) -> Self {
        if value {
            Self::Present
        } else {
            Self::Absent
        }
    }
}

/// Validator result for a single address.
///
/// Every field is always populated; an address that cannot be parsed is
/// represented by [`Verdict::undetermined`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// The address exactly as submitted
    pub email: String,
    /// Local part and domain pass the strict format rules
    pub valid_format: bool,
    /// Lower-cased domain, if one could be extracted
    pub domain: Option<String>,
    /// Domain is on the trusted provider allowlist
    pub allowlisted: bool,
    /// Domain is known to hand out throwaway mailboxes
    pub disposable: bool,
    /// MX presence tri-state
    pub mx: MxStatus,
}

impl Verdict {
    /// Verdict for an address whose domain could not be determined.
    #[must_use]
    pub fn undetermined(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            valid_format: false,
            domain: None,
            allowlisted: false,
            disposable: false,
            mx: MxStatus::Absent,
        }
    }

    /// Whether the address counts as valid.
    ///
    /// Format must be valid, the domain allowlisted, MX present or not
    /// probed, and the domain not disposable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid_format && self.allowlisted && self.mx != MxStatus::Absent && !self.disposable
    }
}

/// Comparison key used for deduplication: trimmed and lower-cased.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Full record of one processed item, kept in the bounded recent window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Raw string as extracted
    pub raw: String,
    /// Normalized comparison key
    pub key: String,
    /// Outcome tag
    pub outcome: Outcome,
    /// Verdict payload for valid/invalid outcomes
    pub verdict: Option<Verdict>,
}

impl ClassificationRecord {
    /// Record for a duplicate item.
    #[must_use]
    pub fn duplicate(raw: impl Into<String>) -> Self {
        Self::without_verdict(raw.into(), Outcome::Duplicate)
    }

    /// Record for a role-based item.
    #[must_use]
    pub fn role(raw: impl Into<String>) -> Self {
        Self::without_verdict(raw.into(), Outcome::Role)
    }

    /// Record for an item that went through the validator.
    #[must_use]
    pub fn checked(raw: impl Into<String>, verdict: Verdict) -> Self {
        let raw = raw.into();
        let outcome = if verdict.is_valid() {
            Outcome::Valid
        } else {
            Outcome::Invalid
        };
        Self {
            key: normalize_key(&raw),
            raw,
            outcome,
            verdict: Some(verdict),
        }
    }

    fn without_verdict(raw: String, outcome: Outcome) -> Self {
        Self {
            key: normalize_key(&raw),
            raw,
            outcome,
            verdict: None,
        }
    }
}

/// Per-job counters.
///
/// `invalid` includes `role_rejected`; `processed` is always
/// `valid + invalid + duplicates`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounters {
    /// Expected number of items, 0 when unknown (streamed sources)
    pub total: u64,
    /// Items processed so far
    pub processed: u64,
    /// Valid items
    pub valid: u64,
    /// Invalid items, role-based included
    pub invalid: u64,
    /// Role-based items
    pub role_rejected: u64,
    /// Duplicate items
    pub duplicates: u64,
}

impl JobCounters {
    /// Check `processed == valid + invalid + duplicates` and
    /// `role_rejected <= invalid`.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.processed == self.valid + self.invalid + self.duplicates
            && self.role_rejected <= self.invalid
    }

    /// Add the progress counters of `delta`; `total` is left untouched.
    pub fn absorb(&mut self, delta: &JobCounters) {
        self.processed += delta.processed;
        self.valid += delta.valid;
        self.invalid += delta.invalid;
        self.role_rejected += delta.role_rejected;
        self.duplicates += delta.duplicates;
    }
}

/// Lifecycle of a job as seen by readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, nothing processed yet
    Pending,
    /// At least one item processed
    Running,
    /// Source exhausted and finished
    Done,
}

impl JobStatus {
    /// Derive the status from progress counters and the done flag.
    #[must_use]
    pub fn from_progress(processed: u64, done: bool) -> Self {
        if done {
            Self::Done
        } else if processed == 0 {
            Self::Pending
        } else {
            Self::Running
        }
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(valid_format: bool, allowlisted: bool, disposable: bool, mx: MxStatus) -> Verdict {
        Verdict {
            email: "a@gmail.com".to_string(),
            valid_format,
            domain: Some("gmail.com".to_string()),
            allowlisted,
            disposable,
            mx,
        }
    }

    #[test]
    fn test_job_id_valid() {
        let id = "550e8400-e29b-41d4-a716-446655440000";
        let job_id = JobId::new(id).expect("valid job ID");
        assert_eq!(job_id.as_str(), id);
    }

    #[test]
    fn test_job_id_invalid() {
        let invalid_ids = vec![
            "not-a-uuid",
            "550e8400-e29b-51d4-a716-446655440000", // Wrong version
            "550e8400-e29b-41d4-x716-446655440000", // Invalid hex
            "",
        ];

        for id in invalid_ids {
            assert!(JobId::new(id).is_err());
        }
    }

    #[test]
    fn test_job_id_generate() {
        let id1 = JobId::generate();
        let id2 = JobId::generate();
        assert_ne!(id1, id2);
        assert!(JobId::new(id1.as_str()).is_ok());
    }

    #[test]
    fn test_list_kind_parse() {
        assert_eq!("valid".parse::<ListKind>().unwrap(), ListKind::Valid);
        assert_eq!(" Role ".parse::<ListKind>().unwrap(), ListKind::Role);
        assert_eq!(
            "duplicates".parse::<ListKind>().unwrap(),
            ListKind::Duplicates
        );
        assert!("results".parse::<ListKind>().is_err());

        for kind in ListKind::ALL {
            assert_eq!(kind.as_str().parse::<ListKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_mx_status_serialization() {
        assert_eq!(serde_json::to_string(&MxStatus::Present).unwrap(), "true");
        assert_eq!(serde_json::to_string(&MxStatus::Absent).unwrap(), "false");
        assert_eq!(serde_json::to_string(&MxStatus::Unknown).unwrap(), "null");

        let parsed: MxStatus = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, MxStatus::Unknown);
    }

    #[test]
    fn test_verdict_is_valid() {
        assert!(verdict(true, true, false, MxStatus::Unknown).is_valid());
        assert!(verdict(true, true, false, MxStatus::Present).is_valid());
        assert!(!verdict(true, true, false, MxStatus::Absent).is_valid());
        assert!(!verdict(true, false, false, MxStatus::Present).is_valid());
        assert!(!verdict(true, true, true, MxStatus::Unknown).is_valid());
        assert!(!verdict(false, true, false, MxStatus::Unknown).is_valid());
    }

    #[test]
    fn test_undetermined_verdict() {
        let v = Verdict::undetermined("junk");
        assert_eq!(v.email, "junk");
        assert!(!v.valid_format);
        assert!(v.domain.is_none());
        assert!(!v.is_valid());
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  A@GMAIL.COM \t"), "a@gmail.com");
        assert_eq!(normalize_key("a@gmail.com"), "a@gmail.com");
    }

    #[test]
    fn test_classification_record_outcome() {
        let record =
            ClassificationRecord::checked(" A@Gmail.com", verdict(true, true, false, MxStatus::Unknown));
        assert_eq!(record.outcome, Outcome::Valid);
        assert_eq!(record.key, "a@gmail.com");

        let record = ClassificationRecord::checked("x", Verdict::undetermined("x"));
        assert_eq!(record.outcome, Outcome::Invalid);

        assert_eq!(ClassificationRecord::role("admin@x.io").outcome, Outcome::Role);
        assert!(ClassificationRecord::duplicate("a@b.io").verdict.is_none());
    }

    #[test]
    fn test_counters_balance() {
        let mut counters = JobCounters {
            total: 4,
            processed: 4,
            valid: 1,
            invalid: 2,
            role_rejected: 1,
            duplicates: 1,
        };
        assert!(counters.is_balanced());

        counters.processed = 5;
        assert!(!counters.is_balanced());
    }

    #[test]
    fn test_counters_absorb_keeps_total() {
        let mut counters = JobCounters {
            total: 10,
            ..JobCounters::default()
        };
        let delta = JobCounters {
            total: 99,
            processed: 3,
            valid: 1,
            invalid: 1,
            role_rejected: 1,
            duplicates: 1,
        };
        counters.absorb(&delta);
        counters.absorb(&delta);
        assert_eq!(counters.total, 10);
        assert_eq!(counters.processed, 6);
        assert_eq!(counters.role_rejected, 2);
    }

    #[test]
    fn test_job_status_from_progress() {
        assert_eq!(JobStatus::from_progress(0, false), JobStatus::Pending);
        assert_eq!(JobStatus::from_progress(3, false), JobStatus::Running);
        assert_eq!(JobStatus::from_progress(0, true), JobStatus::Done);
    }

    #[test]
    fn test_timestamp_display() {
        let ts = Timestamp::now();
        assert_eq!(ts.to_string(), ts.to_rfc3339());
    }
}
