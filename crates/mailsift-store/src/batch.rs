//! Buffered outcomes applied to a job in one atomic step.

use mailsift_core::{ClassificationRecord, JobCounters, ListKind, Outcome, Verdict};

/// Outcomes accumulated between flushes.
///
/// Counter deltas and list appends are applied together by
/// [`crate::ProgressStore::apply_batch`], so readers see all of a batch or
/// none of it.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub(crate) delta: JobCounters,
    pub(crate) valid: Vec<String>,
    pub(crate) invalid: Vec<String>,
    pub(crate) role: Vec<String>,
    pub(crate) duplicates: Vec<String>,
    pub(crate) recent: Vec<ClassificationRecord>,
}

impl Batch {
    /// Empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Role-based item: counts as processed, invalid and role-rejected.
    pub fn push_role(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        self.delta.processed += 1;
        self.delta.invalid += 1;
        self.delta.role_rejected += 1;
        self.invalid.push(raw.clone());
        self.role.push(raw);
    }

    /// Item that went through the validator.
    pub fn push_checked(&mut self, raw: impl Into<String>, verdict: Verdict) {
        self.push_record(ClassificationRecord::checked(raw, verdict));
    }

    /// Any classified item.
    ///
    /// Only validator outcomes are kept in the recent window.
    pub fn push_record(&mut self, record: ClassificationRecord) {
        match record.outcome {
            Outcome::Duplicate => {
                self.delta.processed += 1;
                self.delta.duplicates += 1;
                self.duplicates.push(record.raw);
            }
            Outcome::Role => self.push_role(record.raw),
            Outcome::Valid => {
                self.delta.processed += 1;
                self.delta.valid += 1;
                self.valid.push(record.raw.clone());
                self.recent.push(record);
            }
            Outcome::Invalid => {
                self.delta.processed += 1;
                self.delta.invalid += 1;
                self.invalid.push(record.raw.clone());
                self.recent.push(record);
            }
        }
    }

    /// Counter increments carried by this batch; `total` is always zero.
    #[must_use]
    pub fn delta(&self) -> JobCounters {
        self.delta
    }

    /// Items appended to `kind` by this batch.
    #[must_use]
    pub fn items(&self, kind: ListKind) -> &[String] {
        match kind {
            ListKind::Valid => &self.valid,
            ListKind::Invalid => &self.invalid,
            ListKind::Role => &self.role,
            ListKind::Duplicates => &self.duplicates,
        }
    }

    /// Number of items in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from(self.delta.processed).unwrap_or(usize::MAX)
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delta.processed == 0
    }

    /// Take the pending outcomes, leaving an empty batch behind.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailsift_core::MxStatus;

    fn verdict(email: &str, ok: bool) -> Verdict {
        Verdict {
            email: email.to_string(),
            valid_format: ok,
            domain: Some("gmail.com".to_string()),
            allowlisted: true,
            disposable: false,
            mx: MxStatus::Unknown,
        }
    }

    #[test]
    fn test_role_counts_as_invalid() {
        let mut batch = Batch::new();
        batch.push_role("admin@x.io");
        let d = batch.delta();
        assert_eq!((d.processed, d.invalid, d.role_rejected), (1, 1, 1));
        assert_eq!(batch.items(ListKind::Role), ["admin@x.io"]);
        assert_eq!(batch.items(ListKind::Invalid), ["admin@x.io"]);
        assert!(batch.recent.is_empty());
    }

    #[test]
    fn test_checked_items_feed_recent() {
        let mut batch = Batch::new();
        batch.push_checked("a@gmail.com", verdict("a@gmail.com", true));
        batch.push_checked("b@gmail", verdict("b@gmail", false));
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.delta().valid, 1);
        assert_eq!(batch.delta().invalid, 1);
        assert_eq!(batch.recent.len(), 2);
        assert!(batch.delta().is_balanced());
    }

    #[test]
    fn test_take_resets() {
        let mut batch = Batch::new();
        batch.push_record(ClassificationRecord::duplicate("a@b.io"));
        let taken = batch.take();
        assert!(batch.is_empty());
        assert_eq!(taken.delta().duplicates, 1);
    }
}
