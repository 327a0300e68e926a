//! Repository Cache
//!
//! TTL cache for ranked repository listings, keyed by GitHub username.
//!
//! Two backends are provided:
//! - [`MemoryRepoCache`]: process-local map with lazy expiry
//! - [`RedisRepoCache`]: Redis `GET` / `SETEX` with a JSON `{"repos": [...]}` value
//!
//! A backend that cannot be reached reports [`CacheError::Unavailable`], which
//! callers treat differently from a miss: the request bypasses caching entirely.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::{OnceCell, RwLock};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::models::{CachedRepos, RepositoryRecord};

/// Default TTL for cached listings (1 hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Default maximum number of entries held by the in-memory backend
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

/// Timeout for connecting to and talking to Redis
const REDIS_TIMEOUT: Duration = Duration::from_millis(500);

// ============================================================================
// Error Types
// ============================================================================

/// Cache operation errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend could not be reached (connection refused, timeout, I/O)
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    /// Stored value could not be encoded or decoded
    #[error("Cache encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Unavailable(err.to_string())
    }
}

/// Build the cache key for a user's repository listing
pub fn cache_key(username: &str) -> String {
    format!("github_repos_{username}")
}

// ============================================================================
// Backend Trait
// ============================================================================

/// Key-value store for repository listings
#[async_trait]
pub trait RepoCache: Send + Sync {
    /// Stored listing for `key`, or `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<Vec<RepositoryRecord>>, CacheError>;

    /// Store `repos` under `key` for `ttl`, replacing any existing entry
    async fn set(
        &self,
        key: &str,
        repos: &[RepositoryRecord],
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Short backend name for logs and metrics
    fn backend_name(&self) -> &'static str;
}

// ============================================================================
// In-Memory Backend
// ============================================================================

/// Entry held by the in-memory backend
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Vec<RepositoryRecord>,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    /// Create an entry stamped with the current time
    pub fn new(key: String, payload: Vec<RepositoryRecord>, ttl: Duration) -> Self {
        Self {
            key,
            payload,
            created_at: Instant::now(),
            ttl,
        }
    }

    /// An entry is served only while `now < created_at + ttl`
    ///
    /// A deadline past the clock's range never expires.
    pub fn is_expired(&self) -> bool {
        self.created_at
            .checked_add(self.ttl)
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// In-memory repository cache with TTL support.
///
/// Expiry is checked on read; stale entries are removed when encountered.
pub struct MemoryRepoCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl Default for MemoryRepoCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl MemoryRepoCache {
    /// Create an empty cache holding at most `max_entries` keys
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if cache is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn evict_expired(entries: &mut HashMap<String, CacheEntry>) {
        entries.retain(|_, v| !v.is_expired());
    }

    fn evict_oldest(entries: &mut HashMap<String, CacheEntry>, count: usize) {
        if count == 0 {
            return;
        }

        let mut sorted: Vec<_> = entries.values().map(|e| (e.created_at, e.key.clone())).collect();
        sorted.sort();

        for (_, key) in sorted.into_iter().take(count) {
            entries.remove(&key);
        }
    }
}

#[async_trait]
impl RepoCache for MemoryRepoCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<RepositoryRecord>>, CacheError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.payload.clone())),
                Some(_) => {}
            }
        }

        // Re-check under the write lock; a concurrent set may have refreshed it.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
            debug!(key = key, "Evicted expired cache entry");
        }
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        repos: &[RepositoryRecord],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            Self::evict_expired(&mut entries);

            if entries.len() >= self.max_entries {
                let to_evict = entries.len() - self.max_entries + 1;
                Self::evict_oldest(&mut entries, to_evict);
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry::new(key.to_string(), repos.to_vec(), ttl),
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// ============================================================================
// Redis Backend
// ============================================================================

/// Redis-backed repository cache.
///
/// The connection is established on first use, so the server starts even when
/// Redis is down; every failed attempt surfaces as [`CacheError::Unavailable`]
/// and the next request tries again.
pub struct RedisRepoCache {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
}

impl RedisRepoCache {
    /// Create a cache for the Redis instance at `url` without connecting yet
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if `url` is not a valid Redis URL
    pub fn new(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(1)
                    .set_connection_timeout(REDIS_TIMEOUT)
                    .set_response_timeout(REDIS_TIMEOUT);

                let manager = self
                    .client
                    .get_connection_manager_with_config(config)
                    .await?;
                debug!("Connected to Redis");
                Ok::<_, CacheError>(manager)
            })
            .await?;

        Ok(manager.clone())
    }
}

#[async_trait]
impl RepoCache for RedisRepoCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<RepositoryRecord>>, CacheError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(key).await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str::<CachedRepos>(&raw) {
            Ok(cached) => Ok(Some(cached.repos)),
            Err(e) => {
                warn!(key = key, error = %e, "Discarding undecodable cache value");
                Ok(None)
            }
        }
    }

    async fn set(
        &self,
        key: &str,
        repos: &[RepositoryRecord],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let value = serde_json::to_string(&CachedRepos {
            repos: repos.to_vec(),
        })?;

        let mut conn = self.connection().await?;
        let () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

// ============================================================================
// Cache Metrics
// ============================================================================

/// Counters for cache lookups
#[derive(Debug, Default)]
pub struct CacheMetrics {
    /// Number of cache hits
    pub hits: AtomicU64,

    /// Number of cache misses
    pub misses: AtomicU64,

    /// Number of lookups or stores that found the backend unavailable
    pub errors: AtomicU64,
}

impl CacheMetrics {
    /// Create new cache metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Calculate hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hit_count();
        let total = hits + self.miss_count();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
