use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::services::github::DEFAULT_API_BASE;
use crate::services::SmtpSettings;

/// Which store backs the repository cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Redis,
}

impl FromStr for CacheBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Redis => write!(f, "redis"),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Site name shown in page titles
    pub app_name: String,
    pub debug: bool,
    /// GitHub account whose repositories are showcased
    pub github_username: String,
    /// Optional token, raises the GitHub rate limit
    pub github_token: Option<String>,
    /// GitHub REST API base URL
    pub github_api_base: String,
    /// Timeout for each GitHub request in seconds (default: 30)
    pub github_api_timeout_secs: f64,
    /// Repository cache TTL in seconds (default: 3600)
    pub cache_ttl_secs: u64,
    pub cache_backend: CacheBackend,
    pub redis_url: String,
    /// Directory served under /static
    pub static_dir: PathBuf,
    pub smtp_server: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// Recipient of contact form messages
    pub contact_email: String,
    /// Fallback log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            app_name: "TonyBenoy.com".to_string(),
            debug: false,
            github_username: "tonybenoy".to_string(),
            github_token: None,
            github_api_base: DEFAULT_API_BASE.to_string(),
            github_api_timeout_secs: 30.0,
            cache_ttl_secs: 3600,
            cache_backend: CacheBackend::Memory,
            redis_url: "redis://127.0.0.1:6379/0".to_string(),
            static_dir: PathBuf::from("static"),
            smtp_server: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            contact_email: "me@tonybenoy.com".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(get("PORT"), "PORT", defaults.port)?;
        let debug = match get("DEBUG") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::InvalidValue("DEBUG"))?,
            None => defaults.debug,
        };

        let github_api_timeout_secs: f64 = parse_or(
            get("GITHUB_API_TIMEOUT"),
            "GITHUB_API_TIMEOUT",
            defaults.github_api_timeout_secs,
        )?;
        if !github_api_timeout_secs.is_finite() || github_api_timeout_secs <= 0.0 {
            return Err(ConfigError::InvalidValue("GITHUB_API_TIMEOUT"));
        }

        let cache_ttl_secs = parse_or(get("CACHE_TTL"), "CACHE_TTL", defaults.cache_ttl_secs)?;
        let cache_backend = match get("CACHE_BACKEND") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CACHE_BACKEND"))?,
            None => defaults.cache_backend,
        };

        let smtp_port = parse_or(get("SMTP_PORT"), "SMTP_PORT", defaults.smtp_port)?;
        let smtp_username = get("SMTP_USERNAME");
        let smtp_password = get("SMTP_PASSWORD");
        match (&smtp_username, &smtp_password) {
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("SMTP_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("SMTP_USERNAME")),
            _ => {}
        }

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            debug,
            github_username: get("GITHUB_USERNAME").unwrap_or(defaults.github_username),
            github_token: get("GITHUB_TOKEN"),
            github_api_base: get("GITHUB_API_BASE").unwrap_or(defaults.github_api_base),
            github_api_timeout_secs,
            cache_ttl_secs,
            cache_backend,
            redis_url: get("REDIS_URL").unwrap_or(defaults.redis_url),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            smtp_server: get("SMTP_SERVER"),
            smtp_port,
            smtp_username,
            smtp_password,
            contact_email: get("CONTACT_EMAIL").unwrap_or(defaults.contact_email),
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    pub fn github_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.github_api_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// SMTP settings, if a server is configured
    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        self.smtp_server.as_ref().map(|server| SmtpSettings {
            server: server.clone(),
            port: self.smtp_port,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            contact_email: self.contact_email.clone(),
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue(key)),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
