//! Backend contract for the key/value cache.

use async_trait::async_trait;

use crate::error::FeedResult;

/// Minimal key/value surface the engine needs from a cache backend.
///
/// A miss is `Ok(None)`; `Err` means the backend itself failed and must be
/// surfaced to the caller, never swallowed. `get_and_delete` must make the
/// lookup and removal indivisible per key with respect to concurrent
/// callers; it is how exactly one worker claims a passthrough message.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn put(&self, key: &str, value: &str) -> FeedResult<()>;

    async fn get(&self, key: &str) -> FeedResult<Option<String>>;

    /// Deleting an absent key is a no-op, not an error.
    async fn delete(&self, key: &str) -> FeedResult<()>;

    async fn get_and_delete(&self, key: &str) -> FeedResult<Option<String>>;
}
