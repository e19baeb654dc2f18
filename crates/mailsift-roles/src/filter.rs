//! Role-address classification.

use crate::rules::RoleRules;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of role classification for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleVerdict {
    /// Whether the address is a role mailbox
    pub role_based: bool,
    /// Which rule decided, or why the address was not considered
    pub reason: String,
}

impl RoleVerdict {
    fn role(reason: impl Into<String>) -> Self {
        Self {
            role_based: true,
            reason: reason.into(),
        }
    }

    fn not_role(reason: impl Into<String>) -> Self {
        Self {
            role_based: false,
            reason: reason.into(),
        }
    }
}

/// Per-address detail of a bulk filter run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDetail {
    /// Address as given
    pub email: String,
    /// Whether it was rejected
    pub role_based: bool,
    /// Deciding rule
    pub reason: String,
}

/// Result of filtering a batch of addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFilterReport {
    /// Addresses that are not role mailboxes, in input order
    pub kept: Vec<String>,
    /// Role mailboxes, in input order
    pub rejected: Vec<String>,
    /// One entry per input address
    pub details: Vec<RoleDetail>,
}

/// Classifies addresses against shared, immutable [`RoleRules`].
#[derive(Debug, Clone)]
pub struct RoleFilter {
    rules: Arc<RoleRules>,
}

impl RoleFilter {
    /// Create a filter over `rules`.
    #[must_use]
    pub fn new(rules: RoleRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// The rules in use.
    #[must_use]
    pub fn rules(&self) -> &RoleRules {
        &self.rules
    }

    /// Classify one address; the first matching rule wins.
    ///
    /// Malformed input is never role-based; the reason says why it was skipped.
    #[must_use]
    pub fn classify(&self, raw: &str) -> RoleVerdict {
        let raw = raw.trim();
        if raw.is_empty() {
            return RoleVerdict::not_role("blank");
        }

        let Some((local, domain)) = raw.split_once('@') else {
            return RoleVerdict::not_role("no-at");
        };
        if local.trim().is_empty() || domain.trim().is_empty() {
            return RoleVerdict::not_role("bad-split");
        }

        let lowered = local.to_lowercase();
        let local_core = lowered
            .trim_start_matches(|c| c == '"' || c == '\'')
            .trim_end_matches(|c| c == '"' || c == '\'');

        if self.rules.contains(local_core) {
            return RoleVerdict::role(format!("exact: {local_core}"));
        }

        let hits: Vec<&str> = local_core
            .split(|c| matches!(c, '.' | '_' | '+' | '-'))
            .filter(|t| !t.is_empty() && self.rules.contains(t))
            .collect();
        if !hits.is_empty() {
            return RoleVerdict::role(format!("token: {}", hits.join(",")));
        }

        if self.rules.starts_with_role(local_core) {
            return RoleVerdict::role("starts-with-role");
        }

        if let Some(re) = self.rules.first_pattern(local_core) {
            return RoleVerdict::role(format!("pattern: {}", re.as_str()));
        }

        RoleVerdict::not_role("no-match")
    }

    /// Classify a batch, splitting it into kept and rejected addresses.
    pub fn filter<I, S>(&self, emails: I) -> RoleFilterReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = RoleFilterReport::default();

        for email in emails {
            let email = email.as_ref();
            let verdict = self.classify(email);
            if verdict.role_based {
                report.rejected.push(email.to_string());
            } else {
                report.kept.push(email.to_string());
            }
            report.details.push(RoleDetail {
                email: email.to_string(),
                role_based: verdict.role_based,
                reason: verdict.reason,
            });
        }

        report
    }
}

impl Default for RoleFilter {
    fn default() -> Self {
        Self::new(RoleRules::builtin())
    }
}
