//! Role rule loading.
//!
//! Rules live in a TOML file:
//!
//! ```toml
//! local_parts = ["admin", "support", "noreply"]
//! patterns = ["^no[-_.]?reply", "^bounce"]
//! ```
//!
//! Loading is all-or-nothing: a read error, a TOML error or a single bad
//! pattern rejects the whole file.

use crate::error::{Result, RoleError};
use mailsift_core::RolesConfig;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

const BUILTIN_LOCAL_PARTS: &[&str] = &[
    "abuse",
    "accounts",
    "admin",
    "administrator",
    "billing",
    "careers",
    "contact",
    "enquiries",
    "feedback",
    "hello",
    "help",
    "helpdesk",
    "hostmaster",
    "hr",
    "info",
    "jobs",
    "mailer-daemon",
    "marketing",
    "newsletter",
    "no-reply",
    "noreply",
    "office",
    "postmaster",
    "press",
    "root",
    "sales",
    "security",
    "support",
    "team",
    "webmaster",
];

const BUILTIN_PATTERNS: &[&str] = &[
    r"^no[-_.]?reply",
    r"^do[-_.]?not[-_.]?reply",
    r"^mailer[-_.]?daemon",
    r"^bounces?([-_.+]|$)",
];

#[derive(Debug, Default, Deserialize)]
struct RawRules {
    #[serde(default)]
    local_parts: Vec<String>,
    #[serde(default)]
    patterns: Vec<String>,
}

/// Immutable role dictionary and ordered pattern list.
#[derive(Debug, Clone)]
pub struct RoleRules {
    local_parts: HashSet<String>,
    patterns: Vec<Regex>,
    prefix: Option<Regex>,
}

impl RoleRules {
    /// Build rules from role tokens and case-insensitive pattern sources.
    ///
    /// Tokens are lower-cased; blank tokens are ignored.
    ///
    /// # Errors
    /// Returns [`RoleError::Pattern`] for the first pattern that fails to compile.
    pub fn new<T, P>(
        local_parts: impl IntoIterator<Item = T>,
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<Self>
    where
        T: AsRef<str>,
        P: AsRef<str>,
    {
        let local_parts: HashSet<String> = local_parts
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let patterns = patterns
            .into_iter()
            .map(|p| compile_pattern(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let prefix = build_prefix(&local_parts)?;

        Ok(Self {
            local_parts,
            patterns,
            prefix,
        })
    }

    /// Rules that never match anything.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            local_parts: HashSet::new(),
            patterns: Vec::new(),
            prefix: None,
        }
    }

    /// Default dictionary used when no rules file is configured.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(BUILTIN_LOCAL_PARTS, BUILTIN_PATTERNS).expect("built-in role rules are valid")
    }

    /// Parse rules from TOML text.
    pub fn from_toml_str(contents: &str, origin: &str) -> Result<Self> {
        let raw: RawRules = toml::from_str(contents).map_err(|e| RoleError::Parse {
            origin: origin.to_string(),
            source: e,
        })?;
        Self::new(raw.local_parts, raw.patterns)
    }

    /// Load rules from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RoleError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let rules = Self::from_toml_str(&contents, &path.display().to_string())?;

        info!(
            path = %path.display(),
            local_parts = rules.local_parts.len(),
            patterns = rules.patterns.len(),
            "loaded role rules"
        );

        Ok(rules)
    }

    /// Load rules from a TOML file, degrading to an empty rule set on failure.
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, "role rules unavailable, role filtering disabled");
                Self::empty()
            }
        }
    }

    /// Resolve rules from configuration: the configured file, or the built-in set.
    #[must_use]
    pub fn from_config(config: &RolesConfig) -> Self {
        match &config.rules_path {
            Some(path) => Self::load_or_empty(path),
            None => {
                debug!("no role rules file configured, using built-in rules");
                Self::builtin()
            }
        }
    }

    /// Whether no rule can ever match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local_parts.is_empty() && self.patterns.is_empty()
    }

    /// Whether `token` is a role token (expects lower case).
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.local_parts.contains(token)
    }

    /// Whether `local` starts with a role token followed by end or a separator.
    #[must_use]
    pub fn starts_with_role(&self, local: &str) -> bool {
        self.prefix.as_ref().is_some_and(|re| re.is_match(local))
    }

    /// First pattern matching `local`, in configured order.
    #[must_use]
    pub fn first_pattern(&self, local: &str) -> Option<&Regex> {
        self.patterns.iter().find(|re| re.is_match(local))
    }
}

impl Default for RoleRules {
    fn default() -> Self {
        Self::empty()
    }
}

fn compile_pattern(source: &str) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|e| RoleError::Pattern {
            pattern: source.to_string(),
            source: e,
        })
}

fn build_prefix(local_parts: &HashSet<String>) -> Result<Option<Regex>> {
    if local_parts.is_empty() {
        return Ok(None);
    }

    let mut words: Vec<&str> = local_parts.iter().map(String::as_str).collect();
    words.sort_unstable();
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");

    compile_pattern(&format!(r"^(?:{alternation})(?:$|[._+\-])")).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_normalizes_tokens() {
        let rules = RoleRules::new(["  Admin ", "SUPPORT", ""], Vec::<String>::new())
            .expect("build rules");
        assert!(rules.contains("admin"));
        assert!(rules.contains("support"));
        assert!(!rules.contains(""));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let err = RoleRules::new(["admin"], ["(unclosed"]).unwrap_err();
        assert!(matches!(err, RoleError::Pattern { .. }));
    }

    #[test]
    fn test_prefix_matching() {
        let rules = RoleRules::new(["info", "no-reply"], Vec::<String>::new()).expect("rules");
        assert!(rules.starts_with_role("info"));
        assert!(rules.starts_with_role("info.eu"));
        assert!(rules.starts_with_role("no-reply+x"));
        assert!(!rules.starts_with_role("infosec"));
        assert!(!RoleRules::empty().starts_with_role("info"));
    }

    #[test]
    fn test_patterns_case_insensitive_in_order() {
        let rules = RoleRules::new(Vec::<String>::new(), ["^bounce", "^no.?reply"]).expect("rules");
        let first = rules.first_pattern("NOREPLY").expect("match");
        assert_eq!(first.as_str(), "^no.?reply");
        assert!(rules.first_pattern("alice").is_none());
    }

    #[test]
    fn test_builtin_rules() {
        let rules = RoleRules::builtin();
        assert!(!rules.is_empty());
        assert!(rules.contains("postmaster"));
        assert!(rules.first_pattern("do_not_reply").is_some());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("roles.toml");
        std::fs::write(
            &path,
            r#"
local_parts = ["Admin", "billing"]
patterns = ["^ops[0-9]+$"]
"#,
        )
        .expect("write rules");

        let rules = RoleRules::load(&path).expect("load rules");
        assert!(rules.contains("admin"));
        assert!(rules.first_pattern("ops42").is_some());
    }

    #[test]
    fn test_load_or_empty_degrades() {
        let tmp = TempDir::new().expect("create temp dir");

        let missing = RoleRules::load_or_empty(&tmp.path().join("missing.toml"));
        assert!(missing.is_empty());

        let broken = tmp.path().join("broken.toml");
        std::fs::write(&broken, "local_parts = [[[").expect("write broken file");
        assert!(RoleRules::load_or_empty(&broken).is_empty());

        let bad_regex = tmp.path().join("bad_regex.toml");
        std::fs::write(&bad_regex, "local_parts = [\"admin\"]\npatterns = [\"(\"]")
            .expect("write bad regex file");
        assert!(RoleRules::load_or_empty(&bad_regex).is_empty());
    }

    #[test]
    fn test_from_config_defaults_to_builtin() {
        let rules = RoleRules::from_config(&RolesConfig::default());
        assert!(rules.contains("admin"));
    }
}
