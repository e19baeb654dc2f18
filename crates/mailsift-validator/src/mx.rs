//! MX record probing.

use crate::cache::ExpiringCache;
use crate::error::Result;
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Answers whether a domain publishes MX records.
#[async_trait]
pub trait MxResolver: Send + Sync {
    /// Whether `domain` has at least one MX record.
    ///
    /// A lookup that fails or exceeds `timeout` answers `false`.
    async fn has_mx(&self, domain: &str, timeout: Duration) -> bool;
}

/// DNS-backed resolver using the system configuration.
pub struct HickoryMxResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryMxResolver {
    /// Build a resolver from `/etc/resolv.conf` (or the platform equivalent).
    pub fn from_system_conf() -> Result<Self> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()?;
        Ok(Self { resolver })
    }
}

#[async_trait]
impl MxResolver for HickoryMxResolver {
    async fn has_mx(&self, domain: &str, timeout: Duration) -> bool {
        debug!(domain, timeout_ms = timeout.as_millis(), "checking MX records");

        match tokio::time::timeout(timeout, self.resolver.mx_lookup(domain)).await {
            Ok(Ok(response)) => {
                let count = response.iter().count();
                debug!(domain, count, "MX lookup finished");
                count > 0
            }
            Ok(Err(e)) => {
                debug!(domain, error = %e, "MX lookup failed");
                false
            }
            Err(_) => {
                debug!(domain, "MX lookup timed out");
                false
            }
        }
    }
}

/// Caches answers of another resolver per domain.
pub struct CachedMxResolver {
    inner: Arc<dyn MxResolver>,
    cache: ExpiringCache<String, bool>,
}

impl CachedMxResolver {
    /// Wrap `inner`, remembering answers for `ttl`.
    #[must_use]
    pub fn new(inner: Arc<dyn MxResolver>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: ExpiringCache::new(ttl),
        }
    }
}

#[async_trait]
impl MxResolver for CachedMxResolver {
    async fn has_mx(&self, domain: &str, timeout: Duration) -> bool {
        let key = domain.to_lowercase();
        if let Some(hit) = self.cache.get(&key).await {
            return hit;
        }
        let answer = self.inner.has_mx(&key, timeout).await;
        self.cache.insert(key, answer).await;
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MxResolver for FixedResolver {
        async fn has_mx(&self, domain: &str, _timeout: Duration) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            domain.ends_with(".org")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_resolver_expires() {
        let inner = Arc::new(FixedResolver {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedMxResolver::new(inner.clone(), Duration::from_secs(30));
        let timeout = Duration::from_millis(250);

        assert!(cached.has_mx("mail.org", timeout).await);
        assert!(cached.has_mx("MAIL.org", timeout).await);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(cached.has_mx("mail.org", timeout).await);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
