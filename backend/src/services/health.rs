//! Health Service
//!
//! Liveness and basic runtime metrics for monitoring.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::repo_cache::CacheMetrics;

/// Overall service health status
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
}

/// Response body of `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

/// Cache counters as reported by `GET /metrics`
#[derive(Debug, Clone, Serialize)]
pub struct CacheMetricsSummary {
    pub backend: &'static str,
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub hit_rate: f64,
}

/// Response body of `GET /metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub started_at: DateTime<Utc>,
    pub cache: CacheMetricsSummary,
}

/// Tracks process start and builds health reports
#[derive(Debug, Clone)]
pub struct HealthService {
    started: Instant,
    started_at: DateTime<Utc>,
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthService {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    pub fn check(&self) -> HealthReport {
        HealthReport {
            status: HealthStatus::Healthy,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn metrics(&self, cache: &CacheMetrics, backend: &'static str) -> MetricsReport {
        MetricsReport {
            status: "ok",
            uptime_secs: self.started.elapsed().as_secs(),
            started_at: self.started_at,
            cache: CacheMetricsSummary {
                backend,
                hits: cache.hit_count(),
                misses: cache.miss_count(),
                errors: cache.error_count(),
                hit_rate: cache.hit_rate(),
            },
        }
    }
}
