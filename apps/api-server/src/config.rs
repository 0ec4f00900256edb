//! Application configuration loaded from environment variables.

use std::env;

use scribe_infra::{DatabaseConfig, InMemoryJobQueueConfig};

#[cfg(feature = "elasticsearch")]
use scribe_infra::ElasticsearchConfig;
#[cfg(feature = "redis")]
use scribe_infra::RedisConfig;

/// Application configuration.
///
/// Each store config is `None` when its URL is unset, in which case the
/// in-memory adapter is used instead.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
    #[cfg(feature = "elasticsearch")]
    pub search: Option<ElasticsearchConfig>,
    pub jobs: InMemoryJobQueueConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
            #[cfg(feature = "elasticsearch")]
            search: ElasticsearchConfig::from_env(),
            jobs: InMemoryJobQueueConfig::from_env(),
        }
    }

    /// Configuration with every store in memory.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database: None,
            #[cfg(feature = "redis")]
            redis: None,
            #[cfg(feature = "elasticsearch")]
            search: None,
            jobs: InMemoryJobQueueConfig::default(),
        }
    }
}
