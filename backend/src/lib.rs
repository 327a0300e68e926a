//! Portfolio - personal site with a cached GitHub repository showcase
//!
//! This library provides the configuration, services, views and HTTP handlers
//! behind the `portfolio` binary.

use std::sync::Arc;

use actix_web::web;
use thiserror::Error;
use tracing::{info, warn};

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod views;

pub use config::{CacheBackend, Config, ConfigError};
pub use error::AppError;
pub use models::{CachedRepos, ContactForm, RepositoryRecord};
pub use services::{
    CacheError, CacheMetrics, ContactError, FetchError, GitHubClient, HealthService, LogMailer,
    Mailer, MemoryRepoCache, RateLimiterService, RedisRepoCache, RepoCache, RepositoryShowcase,
    RepositorySource, SmtpMailer,
};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub rate_limiter: RateLimiterService,
    pub showcase: RepositoryShowcase,
    pub mailer: Arc<dyn Mailer>,
    pub health: HealthService,
}

/// Errors raised while wiring services at startup
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Contact(#[from] ContactError),
}

impl AppState {
    /// Build every service described by `config`
    ///
    /// Nothing here touches the network: Redis is connected lazily and
    /// SMTP only on first delivery.
    pub fn from_config(config: Config) -> Result<Self, StartupError> {
        let source = GitHubClient::new(
            &config.github_api_base,
            config.github_token.clone(),
            config.github_timeout(),
        )?;

        let cache: Arc<dyn RepoCache> = match config.cache_backend {
            CacheBackend::Memory => Arc::new(MemoryRepoCache::default()),
            CacheBackend::Redis => Arc::new(RedisRepoCache::new(&config.redis_url)?),
        };
        info!(backend = cache.backend_name(), ttl_secs = config.cache_ttl_secs, "Repository cache configured");

        let showcase = RepositoryShowcase::new(Arc::new(source), cache, config.github_username.clone())
            .with_ttl(config.cache_ttl());

        let mailer: Arc<dyn Mailer> = match config.smtp_settings() {
            Some(settings) => Arc::new(SmtpMailer::new(&settings)?),
            None => {
                warn!("SMTP_SERVER not set, contact messages will only be logged");
                Arc::new(LogMailer)
            }
        };

        Ok(Self::new(config, showcase, mailer))
    }

    /// Assemble state from prebuilt services with the default rate limits
    pub fn new(config: Config, showcase: RepositoryShowcase, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config,
            rate_limiter: RateLimiterService::default(),
            showcase,
            mailer,
            health: HealthService::new(),
        }
    }

    /// Replace the rate limiter
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiterService) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }
}

/// Register every dynamic route
///
/// Static files and the 404 fallback are attached to the `App` by the caller.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.configure(handlers::configure_page_routes)
        .configure(handlers::configure_apps_routes)
        .configure(handlers::configure_contact_routes)
        .configure(handlers::configure_meta_routes);
}
