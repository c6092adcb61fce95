//! Durable-store collaborators consumed by the feed engine.
//!
//! The engine only ever touches posts, users, and the follow graph through
//! these traits. [`postgres`] holds the production implementations;
//! [`memory`] holds in-process doubles for tests and embedding.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::FeedResult;
use crate::models::{NewsPost, User};

/// Durable post storage.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Inserts a post and returns it with its assigned id.
    async fn create_post(&self, username: &str, content: &str) -> FeedResult<NewsPost>;

    /// Looks a post up by id. A deleted or unknown id is `Ok(None)`.
    async fn get_post(&self, post_id: i64) -> FeedResult<Option<NewsPost>>;
}

/// Durable account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, username: &str) -> FeedResult<Option<User>>;
}

/// Follow-graph lookups.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Usernames following `username`. An unknown user yields an empty list.
    async fn followers_of(&self, username: &str) -> FeedResult<Vec<String>>;
}
