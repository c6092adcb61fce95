//! In-memory durable-store doubles.
//!
//! Used by the integration tests and usable as a standalone backing for a
//! single-process deployment.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::{PostStore, RelationshipStore, UserStore};
use crate::error::FeedResult;
use crate::models::{NewsPost, User};

/// In-memory [`PostStore`] with sequential ids.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    posts: DashMap<i64, NewsPost>,
    next_id: AtomicI64,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a post, as a deletion arriving after fan-out would.
    pub fn remove_post(&self, post_id: i64) {
        self.posts.remove(&post_id);
    }

    /// Inserts a post under a caller-chosen id.
    pub fn insert_with_id(&self, post: NewsPost) {
        self.next_id.fetch_max(post.post_id, Ordering::SeqCst);
        self.posts.insert(post.post_id, post);
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn create_post(&self, username: &str, content: &str) -> FeedResult<NewsPost> {
        let post_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let post = NewsPost {
            post_id,
            username: username.to_string(),
            posted_at: Utc::now(),
            content: content.to_string(),
        };
        self.posts.insert(post_id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, post_id: i64) -> FeedResult<Option<NewsPost>> {
        Ok(self.posts.get(&post_id).map(|entry| entry.value().clone()))
    }
}

/// In-memory [`UserStore`].
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: DashMap<String, User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user with placeholder account fields.
    pub fn add_user(&self, username: &str) {
        self.users.insert(
            username.to_string(),
            User {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                role: "ROLE_USER".to_string(),
            },
        );
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user(&self, username: &str) -> FeedResult<Option<User>> {
        Ok(self.users.get(username).map(|entry| entry.value().clone()))
    }
}

/// In-memory [`RelationshipStore`] keyed by followee.
#[derive(Debug, Default)]
pub struct MemoryRelationshipStore {
    followers: DashMap<String, Vec<String>>,
}

impl MemoryRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_follower(&self, followee: &str, follower: &str) {
        self.followers
            .entry(followee.to_string())
            .or_default()
            .push(follower.to_string());
    }
}

#[async_trait]
impl RelationshipStore for MemoryRelationshipStore {
    async fn followers_of(&self, username: &str) -> FeedResult<Vec<String>> {
        Ok(self
            .followers
            .get(username)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
