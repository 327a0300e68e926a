pub mod github;
pub mod health;
pub mod jobs;
pub mod link_header;
pub mod mailer;
pub mod ranking;
pub mod rate_limiter;
pub mod repo_cache;
pub mod showcase;

pub use github::{FetchError, GitHubClient, RepositorySource};
pub use health::{HealthReport, HealthService, HealthStatus, MetricsReport};
pub use jobs::{PruneJobConfig, RateLimitPruneJob};
pub use link_header::LinkRelation;
pub use mailer::{ContactError, LogMailer, Mailer, SmtpMailer, SmtpSettings};
pub use ranking::{rank, DEFAULT_TOP_N};
pub use rate_limiter::{
    default_rate_limits, RateLimitConfig, RateLimitError, RateLimiterService,
};
pub use repo_cache::{
    cache_key, CacheError, CacheMetrics, MemoryRepoCache, RedisRepoCache, RepoCache,
};
pub use showcase::{CacheStatus, RepositoryShowcase, ShowcaseOutcome};
