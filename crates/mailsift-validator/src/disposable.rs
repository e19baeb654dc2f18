//! Disposable-domain detection.

use crate::cache::ExpiringCache;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Source of truth for throwaway-mailbox domains.
///
/// Implementations must be thread-safe; lookups may be remote.
#[async_trait]
pub trait DisposableChecker: Send + Sync {
    /// Whether `domain` hands out disposable mailboxes.
    async fn is_disposable(&self, domain: &str) -> bool;
}

/// Fixed in-memory set of disposable domains.
#[derive(Debug, Clone, Default)]
pub struct DisposableList {
    domains: HashSet<String>,
}

impl DisposableList {
    /// Build from domain names; matching is case-insensitive.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// Number of listed domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

#[async_trait]
impl DisposableChecker for DisposableList {
    async fn is_disposable(&self, domain: &str) -> bool {
        self.domains.contains(&domain.to_lowercase())
    }
}

/// Caches answers of another checker per domain.
pub struct CachedDisposableChecker {
    inner: Arc<dyn DisposableChecker>,
    cache: ExpiringCache<String, bool>,
}

impl CachedDisposableChecker {
    /// Wrap `inner`, remembering answers for `ttl`.
    #[must_use]
    pub fn new(inner: Arc<dyn DisposableChecker>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: ExpiringCache::new(ttl),
        }
    }
}

#[async_trait]
impl DisposableChecker for CachedDisposableChecker {
    async fn is_disposable(&self, domain: &str) -> bool {
        let key = domain.to_lowercase();
        if let Some(hit) = self.cache.get(&key).await {
            return hit;
        }
        let answer = self.inner.is_disposable(&key).await;
        self.cache.insert(key, answer).await;
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingChecker {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DisposableChecker for CountingChecker {
        async fn is_disposable(&self, domain: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            domain == "temp.io"
        }
    }

    #[tokio::test]
    async fn test_list_is_case_insensitive() {
        let list = DisposableList::new(["Mailinator.com", " "]);
        assert_eq!(list.len(), 1);
        assert!(list.is_disposable("MAILINATOR.COM").await);
        assert!(!list.is_disposable("gmail.com").await);
    }

    #[tokio::test]
    async fn test_cached_checker_hits_inner_once() {
        let inner = Arc::new(CountingChecker {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedDisposableChecker::new(inner.clone(), Duration::from_secs(60));

        assert!(cached.is_disposable("temp.io").await);
        assert!(cached.is_disposable("TEMP.io").await);
        assert!(!cached.is_disposable("gmail.com").await);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
