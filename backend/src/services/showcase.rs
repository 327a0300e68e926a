//! Repository Showcase Service
//!
//! Read-through pipeline behind the apps page:
//!
//! ```text
//! cache lookup ─┬─ hit ──────────────────────────────► render
//!               ├─ miss ─► fetch ─► rank ─► store ──► render
//!               └─ down ─► fetch ─► rank ───────────► render
//! ```
//!
//! Cache failures never reach the caller; fetch failures do.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::models::RepositoryRecord;

use super::github::{FetchError, RepositorySource};
use super::ranking::{rank, DEFAULT_TOP_N};
use super::repo_cache::{cache_key, CacheMetrics, RepoCache, DEFAULT_TTL};

/// Where a listing came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the cache
    Hit,
    /// Fetched from GitHub and stored in the cache
    Miss,
    /// Fetched from GitHub because the cache backend was unavailable
    Bypassed,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Bypassed => "bypassed",
        }
    }
}

/// Ranked repositories plus how they were obtained
#[derive(Debug, Clone)]
pub struct ShowcaseOutcome {
    pub repos: Vec<RepositoryRecord>,
    pub cache_status: CacheStatus,
}

/// Serves the owner's top repositories through a cache
pub struct RepositoryShowcase {
    source: Arc<dyn RepositorySource>,
    cache: Arc<dyn RepoCache>,
    metrics: Arc<CacheMetrics>,
    username: String,
    ttl: Duration,
    top_n: usize,
}

impl RepositoryShowcase {
    /// Create a showcase for `username` with the default TTL and top-N
    pub fn new(
        source: Arc<dyn RepositorySource>,
        cache: Arc<dyn RepoCache>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            source,
            cache,
            metrics: Arc::new(CacheMetrics::new()),
            username: username.into(),
            ttl: DEFAULT_TTL,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Override the cache TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Override how many repositories are kept
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn metrics(&self) -> Arc<CacheMetrics> {
        self.metrics.clone()
    }

    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// Top repositories for the configured user.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] when the listing had to be fetched and GitHub failed.
    pub async fn top_repositories(&self) -> Result<ShowcaseOutcome, FetchError> {
        let key = cache_key(&self.username);

        let cache_up = match self.cache.get(&key).await {
            Ok(Some(repos)) => {
                self.metrics.record_hit();
                info!(username = %self.username, count = repos.len(), "Serving repositories from cache");
                return Ok(ShowcaseOutcome {
                    repos,
                    cache_status: CacheStatus::Hit,
                });
            }
            Ok(None) => {
                self.metrics.record_miss();
                true
            }
            Err(e) => {
                self.metrics.record_error();
                warn!(
                    backend = self.cache.backend_name(),
                    error = %e,
                    "Cache unavailable, fetching without caching"
                );
                false
            }
        };

        info!(username = %self.username, "Fetching fresh repository data from GitHub");
        let fetched = self.source.list_repositories(&self.username).await?;
        let repos = rank(fetched, self.top_n);

        if !cache_up {
            return Ok(ShowcaseOutcome {
                repos,
                cache_status: CacheStatus::Bypassed,
            });
        }

        match self.cache.set(&key, &repos, self.ttl).await {
            Ok(()) => info!(count = repos.len(), ttl_secs = self.ttl.as_secs(), "Cached repositories"),
            Err(e) => {
                self.metrics.record_error();
                warn!(error = %e, "Failed to store repositories in cache");
            }
        }

        Ok(ShowcaseOutcome {
            repos,
            cache_status: CacheStatus::Miss,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fakes shared by service and handler tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::RawRepository;
    use crate::services::repo_cache::CacheError;

    pub fn repo(name: &str, stars: u64) -> RepositoryRecord {
        RepositoryRecord::from(RawRepository {
            name: Some(name.to_string()),
            html_url: Some(format!("https://github.com/someone/{name}")),
            clone_url: Some(format!("https://github.com/someone/{name}.git")),
            language: Some("Rust".to_string()),
            stargazers_count: Some(stars),
            description: Some(format!("{name} description")),
            ..Default::default()
        })
    }

    /// Source returning a fixed listing, or a fixed error status
    pub struct StaticSource {
        repos: Vec<RepositoryRecord>,
        fail_with: Option<u16>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        pub fn new(repos: Vec<RepositoryRecord>) -> Self {
            Self {
                repos,
                fail_with: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                repos: Vec::new(),
                fail_with: Some(status),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RepositorySource for StaticSource {
        async fn list_repositories(&self, _username: &str) -> Result<Vec<RepositoryRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(status) => Err(FetchError::HttpStatus { status }),
                None => Ok(self.repos.clone()),
            }
        }
    }

    /// Backend whose every operation fails as unreachable
    #[derive(Default)]
    pub struct DownCache {
        pub sets: Mutex<usize>,
    }

    #[async_trait]
    impl RepoCache for DownCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<RepositoryRecord>>, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _repos: &[RepositoryRecord], _ttl: Duration) -> Result<(), CacheError> {
            *self.sets.lock().unwrap() += 1;
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "down"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::services::repo_cache::MemoryRepoCache;

    fn names(outcome: &ShowcaseOutcome) -> Vec<&str> {
        outcome.repos.iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let source = Arc::new(StaticSource::new(vec![repo("low", 10), repo("high", 15)]));
        let cache = Arc::new(MemoryRepoCache::default());
        let showcase = RepositoryShowcase::new(source.clone(), cache.clone(), "someone");

        let first = showcase.top_repositories().await.unwrap();
        assert_eq!(first.cache_status, CacheStatus::Miss);
        assert_eq!(names(&first), vec!["high", "low"]);

        let second = showcase.top_repositories().await.unwrap();
        assert_eq!(second.cache_status, CacheStatus::Hit);
        assert_eq!(names(&second), vec!["high", "low"]);

        assert_eq!(source.calls(), 1);
        assert_eq!(showcase.metrics().hit_count(), 1);
        assert_eq!(showcase.metrics().miss_count(), 1);
    }

    #[tokio::test]
    async fn test_cached_payload_is_ranked_and_truncated() {
        let source = Arc::new(StaticSource::new((1..=10).map(|i| repo(&format!("r{i}"), i)).collect()));
        let cache = Arc::new(MemoryRepoCache::default());
        let showcase = RepositoryShowcase::new(source, cache.clone(), "someone").with_top_n(3);

        showcase.top_repositories().await.unwrap();

        let stored = cache.get(&cache_key("someone")).await.unwrap().unwrap();
        let stars: Vec<_> = stored.iter().map(|r| r.stargazers_count).collect();
        assert_eq!(stars, vec![10, 9, 8]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetches_after_ttl() {
        let source = Arc::new(StaticSource::new(vec![repo("a", 1)]));
        let cache = Arc::new(MemoryRepoCache::default());
        let showcase = RepositoryShowcase::new(source.clone(), cache, "someone")
            .with_ttl(Duration::from_secs(60));

        showcase.top_repositories().await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        let outcome = showcase.top_repositories().await.unwrap();

        assert_eq!(outcome.cache_status, CacheStatus::Miss);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_down_falls_back_to_fetch() {
        let source = Arc::new(StaticSource::new(vec![repo("a", 1), repo("b", 2)]));
        let cache = Arc::new(DownCache::default());
        let showcase = RepositoryShowcase::new(source.clone(), cache.clone(), "someone");

        let outcome = showcase.top_repositories().await.unwrap();

        assert_eq!(outcome.cache_status, CacheStatus::Bypassed);
        assert_eq!(names(&outcome), vec!["b", "a"]);
        // The bypass result is not written back.
        assert_eq!(*cache.sets.lock().unwrap(), 0);
        assert_eq!(showcase.metrics().error_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let source = Arc::new(StaticSource::failing(500));
        let cache = Arc::new(MemoryRepoCache::default());
        let showcase = RepositoryShowcase::new(source, cache.clone(), "someone");

        let err = showcase.top_repositories().await.unwrap_err();

        assert!(matches!(err, FetchError::HttpStatus { status: 500 }));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_fetch_failure_with_cache_down() {
        let showcase = RepositoryShowcase::new(
            Arc::new(StaticSource::failing(502)),
            Arc::new(DownCache::default()),
            "someone",
        );

        assert!(showcase.top_repositories().await.is_err());
    }
}
