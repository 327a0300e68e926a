//! Rate Limiter Service
//!
//! Per-client, per-route rate limiting using a sliding window of time buckets.
//! Clients are identified by their remote address.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Route names used as rate limit actions
pub mod actions {
    pub const APPS: &str = "apps";
    pub const HOME: &str = "home";
    pub const PHOTOGRAPHY: &str = "photography";
    pub const CLIENT_IP: &str = "client_ip";
    pub const METRICS: &str = "metrics";
    pub const CONTACT: &str = "contact";
}

/// Errors that can occur during rate limiting
#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Rate limit exceeded for '{action}'. Retry after {retry_after} seconds")]
    RateLimited { action: String, retry_after: u64 },
}

/// Configuration for rate limits per action type
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Window duration in seconds
    pub window_secs: u64,
}

impl RateLimitConfig {
    /// `max_requests` per minute
    pub fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window_secs: 60,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(60)
    }
}

/// Default rate limits for the site's routes
pub fn default_rate_limits() -> HashMap<String, RateLimitConfig> {
    let mut limits = HashMap::new();

    // GitHub-backed page; each miss costs upstream quota
    limits.insert(actions::APPS.to_string(), RateLimitConfig::per_minute(10));

    limits.insert(actions::HOME.to_string(), RateLimitConfig::per_minute(30));
    limits.insert(
        actions::PHOTOGRAPHY.to_string(),
        RateLimitConfig::per_minute(30),
    );
    limits.insert(
        actions::CLIENT_IP.to_string(),
        RateLimitConfig::per_minute(10),
    );
    limits.insert(actions::METRICS.to_string(), RateLimitConfig::per_minute(5));

    // Each submission may send an email
    limits.insert(actions::CONTACT.to_string(), RateLimitConfig::per_minute(5));

    limits
}

/// Time bucket for tracking requests in a sliding window
#[derive(Debug, Clone)]
struct TimeBucket {
    start_time: DateTime<Utc>,
    count: u32,
}

#[derive(Debug, Clone, Default)]
struct ClientActionState {
    buckets: Vec<TimeBucket>,
}

/// Rate Limiter Service
///
/// Each client address has independent state per action.
#[derive(Debug, Clone)]
pub struct RateLimiterService {
    configs: HashMap<String, RateLimitConfig>,
    /// client -> (action -> state)
    state: Arc<RwLock<HashMap<String, HashMap<String, ClientActionState>>>>,
    /// Granularity of tracking
    bucket_size_secs: u64,
}

impl Default for RateLimiterService {
    fn default() -> Self {
        Self::new(default_rate_limits())
    }
}

impl RateLimiterService {
    /// Create a new rate limiter with the given configuration
    pub fn new(configs: HashMap<String, RateLimitConfig>) -> Self {
        Self::with_bucket_size(configs, 1)
    }

    /// Create a rate limiter with a custom bucket size
    pub fn with_bucket_size(
        configs: HashMap<String, RateLimitConfig>,
        bucket_size_secs: u64,
    ) -> Self {
        Self {
            configs,
            state: Arc::new(RwLock::new(HashMap::new())),
            bucket_size_secs: bucket_size_secs.max(1),
        }
    }

    /// Limiter that never rejects, for tests that exercise other behavior
    pub fn unlimited() -> Self {
        let configs = default_rate_limits()
            .into_keys()
            .map(|action| {
                (
                    action,
                    RateLimitConfig {
                        max_requests: u32::MAX,
                        window_secs: 60,
                    },
                )
            })
            .collect();
        Self::new(configs)
    }

    /// Check if a request is allowed and record it if so
    ///
    /// Returns Ok(()) if the request is allowed, or Err with retry_after if rate limited.
    pub async fn check_and_record(&self, client: &str, action: &str) -> Result<(), RateLimitError> {
        let now = Utc::now();
        let config = self.configs.get(action).cloned().unwrap_or_default();
        let window = Duration::seconds(config.window_secs as i64);

        let mut state = self.state.write().await;
        let action_state = state
            .entry(client.to_string())
            .or_default()
            .entry(action.to_string())
            .or_default();

        let window_start = now - window;
        action_state
            .buckets
            .retain(|b| b.start_time > window_start);

        let current_count: u32 = action_state.buckets.iter().map(|b| b.count).sum();

        if current_count >= config.max_requests {
            let retry_after = match action_state.buckets.first() {
                Some(oldest) => {
                    let diff = oldest.start_time + window - now;
                    diff.num_seconds().max(1) as u64
                }
                None => config.window_secs,
            };

            return Err(RateLimitError::RateLimited {
                action: action.to_string(),
                retry_after,
            });
        }

        let bucket_start = self.get_bucket_start(now);
        match action_state
            .buckets
            .iter_mut()
            .find(|b| b.start_time == bucket_start)
        {
            Some(bucket) => bucket.count += 1,
            None => action_state.buckets.push(TimeBucket {
                start_time: bucket_start,
                count: 1,
            }),
        }

        Ok(())
    }

    /// Get the start time of the bucket containing the given timestamp
    fn get_bucket_start(&self, time: DateTime<Utc>) -> DateTime<Utc> {
        let size = self.bucket_size_secs as i64;
        let bucket_start_secs = (time.timestamp() / size) * size;
        DateTime::from_timestamp(bucket_start_secs, 0).unwrap_or(time)
    }

    /// Drop state for clients with no requests inside any window
    pub async fn prune(&self) {
        let now = Utc::now();
        let mut state = self.state.write().await;

        state.retain(|_, actions| {
            actions.retain(|action, action_state| {
                let window_secs = self
                    .configs
                    .get(action)
                    .map_or_else(|| RateLimitConfig::default().window_secs, |c| c.window_secs);
                let window_start = now - Duration::seconds(window_secs as i64);
                action_state
                    .buckets
                    .iter()
                    .any(|b| b.start_time > window_start)
            });
            !actions.is_empty()
        });
    }

    /// Number of clients currently tracked
    pub async fn tracked_clients(&self) -> usize {
        self.state.read().await.len()
    }

    /// Get current request count for a client/action pair
    pub async fn get_current_count(&self, client: &str, action: &str) -> u32 {
        let now = Utc::now();
        let config = self.configs.get(action).cloned().unwrap_or_default();
        let window_start = now - Duration::seconds(config.window_secs as i64);

        let state = self.state.read().await;

        state
            .get(client)
            .and_then(|actions| actions.get(action))
            .map(|action_state| {
                action_state
                    .buckets
                    .iter()
                    .filter(|b| b.start_time > window_start)
                    .map(|b| b.count)
                    .sum()
            })
            .unwrap_or(0)
    }
}
