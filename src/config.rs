use std::time::Duration;
use strum_macros::{Display, EnumIter, EnumString};

use crate::session::service::SessionConfig;
use crate::shared::AppError;

const DEFAULT_BASE_ORIGIN: &str = "http://localhost:5173";

/// Deployment environment, read from `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

/// Server configuration loaded from environment variables.
///
/// | Env Var                         | Default                 |
/// |---------------------------------|-------------------------|
/// | `HOST`                          | `0.0.0.0`               |
/// | `PORT`                          | `3000`                  |
/// | `DATABASE_URL`                  | unset                   |
/// | `BASE_ORIGIN`                   | `http://localhost:5173` |
/// | `APP_ENV`                       | `development`           |
/// | `COOKIE_SECURE`                 | `true`                  |
/// | `SESSION_LIFETIME_DAYS`         | `30`                    |
/// | `SESSION_RENEWAL_DAYS`          | `15`                    |
/// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                  |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    /// Whether `BASE_ORIGIN` was set explicitly (reported by the health check)
    pub base_origin_configured: bool,
    /// Origin used to build absolute check-in URLs
    pub base_origin: String,
    pub environment: Environment,
    pub cookie_secure: bool,
    pub session: SessionConfig,
    pub session_cleanup_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let session_defaults = SessionConfig::default();

        let base_origin = env_non_empty("BASE_ORIGIN");

        let session = SessionConfig {
            lifetime: env_parse::<i64>("SESSION_LIFETIME_DAYS")
                .map(chrono::Duration::days)
                .unwrap_or(session_defaults.lifetime),
            renewal_threshold: env_parse::<i64>("SESSION_RENEWAL_DAYS")
                .map(chrono::Duration::days)
                .unwrap_or(session_defaults.renewal_threshold),
        };

        Self {
            host: env_non_empty("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT").unwrap_or(defaults.port),
            database_url: env_non_empty("DATABASE_URL"),
            base_origin_configured: base_origin.is_some(),
            base_origin: base_origin
                .map(|origin| origin.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_origin),
            environment: env_parse("APP_ENV").unwrap_or(defaults.environment),
            cookie_secure: env_parse("COOKIE_SECURE").unwrap_or(defaults.cookie_secure),
            session,
            session_cleanup_interval: cleanup_interval(
                env_parse("SESSION_CLEANUP_INTERVAL_SECS"),
                defaults.session_cleanup_interval,
            ),
        }
    }

    /// Returns the database URL or a `MissingConfiguration` error
    pub fn require_database_url(&self) -> Result<&str, AppError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| AppError::MissingConfiguration("DATABASE_URL is not set".to_string()))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            base_origin_configured: false,
            base_origin: DEFAULT_BASE_ORIGIN.to_string(),
            environment: Environment::Development,
            cookie_secure: true,
            session: SessionConfig::default(),
            session_cleanup_interval: Duration::from_secs(60 * 60),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_non_empty(key).and_then(|value| value.parse().ok())
}

/// `tokio::time::interval` panics on a zero period, so 0 falls back to the default
fn cleanup_interval(secs: Option<u64>, default: Duration) -> Duration {
    secs.filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}
