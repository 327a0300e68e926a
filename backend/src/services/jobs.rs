//! Background Jobs
//!
//! Periodic housekeeping that runs alongside the HTTP server.

use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::services::RateLimiterService;

/// Configuration for the rate limiter prune job
#[derive(Debug, Clone)]
pub struct PruneJobConfig {
    /// Interval between prune runs (default: 5 minutes)
    pub interval: Duration,
    /// Whether the job is enabled
    pub enabled: bool,
}

impl Default for PruneJobConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            enabled: true,
        }
    }
}

/// Drops rate limiter state for clients that have gone quiet
pub struct RateLimitPruneJob {
    limiter: RateLimiterService,
    config: PruneJobConfig,
}

impl RateLimitPruneJob {
    pub fn new(limiter: RateLimiterService, config: PruneJobConfig) -> Self {
        Self { limiter, config }
    }

    /// Start the prune job
    ///
    /// Returns a shutdown sender that can be used to stop the job.
    pub fn start(self) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        if !self.config.enabled {
            info!("Rate limiter prune job is disabled");
            return shutdown_tx;
        }

        let limiter = self.limiter;
        let interval = self.config.interval;

        tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "Starting rate limiter prune job");

            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.tick().await; // Skip the first immediate tick

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        limiter.prune().await;
                        let clients = limiter.tracked_clients().await;
                        debug!(clients, "Pruned rate limiter state");
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("Rate limiter prune job shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }
}
