//! Per-address validation.

use crate::disposable::{CachedDisposableChecker, DisposableChecker, DisposableList};
use crate::error::{Result, ValidatorError};
use crate::format::{is_valid_domain, is_valid_local, split_address};
use crate::mx::{CachedMxResolver, HickoryMxResolver, MxResolver};
use mailsift_core::{MxStatus, ValidationConfig, Verdict};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Checks addresses against format rules, the provider allowlist, the
/// disposable-domain checker and (optionally) MX records.
///
/// Cheap to clone; checker and resolver are shared.
#[derive(Clone)]
pub struct Validator {
    allowlist: Arc<HashSet<String>>,
    disposable: Option<Arc<dyn DisposableChecker>>,
    resolver: Option<Arc<dyn MxResolver>>,
    probe_mx: bool,
    mx_timeout: Duration,
}

impl Validator {
    /// Validator with the given allowlist and no checker or resolver.
    pub fn new<I, S>(allowed_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowlist: Arc::new(
                allowed_domains
                    .into_iter()
                    .map(|d| d.as_ref().trim().to_lowercase())
                    .filter(|d| !d.is_empty())
                    .collect(),
            ),
            disposable: None,
            resolver: None,
            probe_mx: false,
            mx_timeout: Duration::from_millis(250),
        }
    }

    /// Build from configuration.
    ///
    /// Disposable answers are cached for `cache_ttl`. With `probe_mx` set, a
    /// system DNS resolver is created and cached the same way; if that fails,
    /// probing is left without a resolver and non-allowlisted domains read as
    /// having no MX.
    #[must_use]
    pub fn from_config(config: &ValidationConfig) -> Self {
        let mut validator = Self::new(&config.allowed_domains).with_mx_timeout(config.mx_timeout());

        if !config.disposable_domains.is_empty() {
            let list = Arc::new(DisposableList::new(&config.disposable_domains));
            validator = validator.with_disposable_checker(Arc::new(
                CachedDisposableChecker::new(list, config.cache_ttl()),
            ));
        }

        if config.probe_mx {
            validator = validator.with_mx_probing(true);
            match HickoryMxResolver::from_system_conf() {
                Ok(resolver) => {
                    let cached = CachedMxResolver::new(Arc::new(resolver), config.cache_ttl());
                    validator = validator.with_mx_resolver(Arc::new(cached));
                    info!(timeout_ms = config.mx_timeout_ms, "MX probing enabled");
                }
                Err(e) => warn!(error = %e, "MX probing requested but no resolver available"),
            }
        }

        validator
    }

    /// Attach a disposable-domain checker.
    #[must_use]
    pub fn with_disposable_checker(mut self, checker: Arc<dyn DisposableChecker>) -> Self {
        self.disposable = Some(checker);
        self
    }

    /// Attach an MX resolver.
    #[must_use]
    pub fn with_mx_resolver(mut self, resolver: Arc<dyn MxResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Enable or disable MX probing for non-allowlisted domains.
    #[must_use]
    pub fn with_mx_probing(mut self, probe_mx: bool) -> Self {
        self.probe_mx = probe_mx;
        self
    }

    /// Set the hard timeout for each disposable or MX lookup.
    #[must_use]
    pub fn with_mx_timeout(mut self, timeout: Duration) -> Self {
        self.mx_timeout = timeout;
        self
    }

    /// Whether `domain` (lower-cased) is a trusted provider.
    #[must_use]
    pub fn is_allowlisted(&self, domain: &str) -> bool {
        self.allowlist.contains(domain)
    }

    /// Validate one address.
    ///
    /// Never fails: anything that cannot be evaluated becomes
    /// [`Verdict::undetermined`].
    pub async fn validate(&self, raw: &str) -> Verdict {
        let Some((local, domain)) = split_address(raw.trim()) else {
            return Verdict::undetermined(raw);
        };
        let domain = domain.to_lowercase();
        let valid_format = is_valid_local(local) && is_valid_domain(&domain);
        let allowlisted = self.is_allowlisted(&domain);

        let disposable = if allowlisted {
            self.check_disposable(&domain).await
        } else {
            false
        };

        let mx = if allowlisted {
            MxStatus::Unknown
        } else {
            self.probe(&domain).await
        };

        debug!(
            email = raw,
            valid_format, allowlisted, disposable, mx = ?mx, "address checked"
        );

        Verdict {
            email: raw.to_string(),
            valid_format,
            domain: Some(domain),
            allowlisted,
            disposable,
            mx,
        }
    }

    /// Validate addresses in order.
    pub async fn validate_all<I, S>(&self, emails: I) -> Vec<Verdict>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut verdicts = Vec::new();
        for email in emails {
            verdicts.push(self.validate(email.as_ref()).await);
        }
        verdicts
    }

    async fn check_disposable(&self, domain: &str) -> bool {
        let Some(checker) = &self.disposable else {
            return false;
        };
        self.bounded("disposable", domain, checker.is_disposable(domain))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "disposable lookup failed, treating domain as not disposable");
                false
            })
    }

    async fn probe(&self, domain: &str) -> MxStatus {
        let resolver = match (&self.resolver, self.probe_mx) {
            (Some(resolver), true) => resolver,
            _ => return MxStatus::Absent,
        };
        self.bounded("mx", domain, resolver.has_mx(domain, self.mx_timeout))
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "MX probe failed, treating domain as having no MX");
                false
            })
            .into()
    }

    /// Run a capability lookup under the hard timeout, whatever the
    /// implementation does with it.
    async fn bounded<F>(&self, lookup: &'static str, domain: &str, fut: F) -> Result<bool>
    where
        F: Future<Output = bool>,
    {
        tokio::time::timeout(self.mx_timeout, fut)
            .await
            .map_err(|_| ValidatorError::Timeout {
                lookup,
                domain: domain.to_string(),
                timeout: self.mx_timeout,
            })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::from_config(&ValidationConfig::default())
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("allowlist", &self.allowlist.len())
            .field("disposable", &self.disposable.is_some())
            .field("resolver", &self.resolver.is_some())
            .field("probe_mx", &self.probe_mx)
            .field("mx_timeout", &self.mx_timeout)
            .finish()
    }
}
