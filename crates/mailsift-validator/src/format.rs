//! Strict format rules for local parts and domains.

use once_cell::sync::Lazy;
use regex::Regex;

/// First and last character alphanumeric; interior alphanumeric or `._+-`.
static LOCAL_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9](?:[a-z0-9._+\-]*[a-z0-9])?$")
        .expect("Local part regex is hardcoded and valid")
});

/// One DNS label: alphanumeric with internal hyphens.
static LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?$")
        .expect("Label regex is hardcoded and valid")
});

/// Top-level label: at least two letters.
static TLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z]{2,}$").expect("TLD regex is hardcoded and valid"));

const MAX_LABEL_LEN: usize = 63;

/// Split `raw` on its first `@`.
///
/// Returns `None` when there is no `@`, or it is the first or last character.
#[must_use]
pub fn split_address(raw: &str) -> Option<(&str, &str)> {
    let (local, domain) = raw.split_once('@')?;
    if local.is_empty() || domain.is_empty() {
        return None;
    }
    Some((local, domain))
}

/// Whether `local` passes the local-part rules.
#[must_use]
pub fn is_valid_local(local: &str) -> bool {
    !local.contains("..") && LOCAL_PART.is_match(local)
}

/// Whether `domain` (already lower-cased) passes the domain rules.
#[must_use]
pub fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels
        .iter()
        .all(|label| label.len() <= MAX_LABEL_LEN && LABEL.is_match(label));

    labels_ok && labels.last().is_some_and(|tld| TLD.is_match(tld))
}
