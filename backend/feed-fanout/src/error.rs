//! Error types for the feed fan-out engine.

use thiserror::Error;

/// Result type alias for feed engine operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors that can occur on the fan-out and feed read paths.
///
/// A cache or store miss is never an error; misses surface as `Ok(None)` or
/// an empty result from the operation that observed them.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Backend-generic cache failure, for backends that are not Redis.
    #[error("Cache error: {0}")]
    Cache(String),

    /// A feed payload or passthrough message that does not parse as post ids.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// An owner tag that would collide with the composite-key delimiter.
    #[error("Invalid cache tag: {0}")]
    InvalidTag(String),

    #[error("Internal error: {0}")]
    Other(#[from] anyhow::Error),
}
