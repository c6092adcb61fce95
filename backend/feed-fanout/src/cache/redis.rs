use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::warn;

use super::backend::CacheBackend;
use crate::error::{FeedError, FeedResult};

/// Redis-backed [`CacheBackend`] over a shared [`ConnectionManager`].
///
/// The connection manager is cheap to clone per call and reconnects on its
/// own; `get_and_delete` maps to `GETDEL` (Redis >= 6.2), which is atomic
/// per key on the server.
#[derive(Clone)]
pub struct RedisCacheBackend {
    conn: ConnectionManager,
}

impl RedisCacheBackend {
    pub async fn connect(redis_url: &str) -> FeedResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    /// Wraps an already-established connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Connection health check, for periodic liveness probing.
    pub async fn ping(&self) -> FeedResult<()> {
        redis::cmd("PING")
            .query_async::<_, String>(&mut self.conn.clone())
            .await
            .map_err(|e| {
                warn!("Redis PING failed: {}", e);
                FeedError::Redis(e)
            })?;
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn put(&self, key: &str, value: &str) -> FeedResult<()> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await.map_err(|e| {
            warn!("Redis SET failed for {}: {}", key, e);
            FeedError::Redis(e)
        })
    }

    async fn get(&self, key: &str) -> FeedResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key).await.map_err(|e| {
            warn!("Redis GET failed for {}: {}", key, e);
            FeedError::Redis(e)
        })
    }

    async fn delete(&self, key: &str) -> FeedResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(|e| {
            warn!("Redis DEL failed for {}: {}", key, e);
            FeedError::Redis(e)
        })
    }

    async fn get_and_delete(&self, key: &str) -> FeedResult<Option<String>> {
        let mut conn = self.conn.clone();
        redis::cmd("GETDEL")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await
            .map_err(|e| {
                warn!("Redis GETDEL failed for {}: {}", key, e);
                FeedError::Redis(e)
            })
    }
}
