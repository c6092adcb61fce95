use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub redis: RedisConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub feed: FeedSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    /// Page size used when a feed read does not specify a count.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(FeedConfig {
            redis: RedisConfig {
                url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("DATABASE_MAX_CONNECTIONS must be an integer")?,
            },
            feed: FeedSettings {
                default_page_size: std::env::var("FEED_DEFAULT_PAGE_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_page_size),
            },
        })
    }
}

fn default_page_size() -> usize {
    10
}
