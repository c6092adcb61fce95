//! Composite-tag cache layer shared by the fan-out and read paths.
//!
//! Every record is a [`CachedItem`] addressed by `(purpose, user_tag)`,
//! flattened into a single backend key `"{PURPOSE}|{user_tag}"`. The same
//! store carries precomputed feeds (`NEWS|{username}`) and the single-slot
//! worker mailbox (`WORKER|INTERNAL`).

pub mod backend;
pub mod codec;
pub mod memory;
pub mod redis;

pub use backend::CacheBackend;

use std::sync::Arc;

use crate::error::{FeedError, FeedResult};

/// Reserved separator between the purpose and owner halves of a cache tag.
pub const TAG_DELIMITER: char = '|';

/// Owner tag of the single-slot worker mailbox.
pub const PASSTHROUGH_TAG: &str = "INTERNAL";

/// What a cache record is for. Part of the record's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachePurpose {
    General,
    NewsFeed,
    WorkerPassthrough,
}

impl CachePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            CachePurpose::General => "GENERAL",
            CachePurpose::NewsFeed => "NEWS",
            CachePurpose::WorkerPassthrough => "WORKER",
        }
    }
}

/// A single cache record addressed by `(purpose, user_tag)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedItem {
    pub purpose: CachePurpose,
    pub user_tag: String,
    pub payload: String,
}

impl CachedItem {
    pub fn new(
        purpose: CachePurpose,
        user_tag: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            purpose,
            user_tag: user_tag.into(),
            payload: payload.into(),
        }
    }

    /// The backend key this record lives under.
    pub fn tag(&self) -> FeedResult<String> {
        cache_tag(self.purpose, &self.user_tag)
    }
}

/// Builds the composite backend key for `(purpose, user_tag)`.
///
/// Owner tags containing the delimiter are rejected: they would alias
/// another record's key. Usernames are validated upstream to exclude the
/// delimiter, so this is a guard, not the validation surface.
pub fn cache_tag(purpose: CachePurpose, user_tag: &str) -> FeedResult<String> {
    if user_tag.contains(TAG_DELIMITER) {
        return Err(FeedError::InvalidTag(format!(
            "owner tag {:?} contains reserved delimiter {:?}",
            user_tag, TAG_DELIMITER
        )));
    }
    Ok(format!("{}{}{}", purpose.as_str(), TAG_DELIMITER, user_tag))
}

/// CRUD facade over a [`CacheBackend`] in [`CachedItem`] terms.
#[derive(Clone)]
pub struct CachedItemStore {
    backend: Arc<dyn CacheBackend>,
}

impl CachedItemStore {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Writes the record, overwriting any record under the same tag.
    pub async fn create(&self, item: &CachedItem) -> FeedResult<()> {
        let tag = item.tag()?;
        self.backend.put(&tag, &item.payload).await
    }

    pub async fn read(
        &self,
        purpose: CachePurpose,
        user_tag: &str,
    ) -> FeedResult<Option<CachedItem>> {
        let tag = cache_tag(purpose, user_tag)?;
        let payload = self.backend.get(&tag).await?;
        Ok(payload.map(|payload| CachedItem::new(purpose, user_tag, payload)))
    }

    /// Replaces an existing record. Not atomic: delete, then create — a
    /// concurrent reader can observe the gap and a concurrent writer wins
    /// wholesale.
    pub async fn update(&self, item: &CachedItem) -> FeedResult<()> {
        self.delete(item.purpose, &item.user_tag).await?;
        self.create(item).await
    }

    pub async fn delete(&self, purpose: CachePurpose, user_tag: &str) -> FeedResult<()> {
        let tag = cache_tag(purpose, user_tag)?;
        self.backend.delete(&tag).await
    }

    /// Claims and removes the record in one step. The destructive read that
    /// hands a passthrough message to exactly one worker.
    pub async fn read_and_delete(
        &self,
        purpose: CachePurpose,
        user_tag: &str,
    ) -> FeedResult<Option<CachedItem>> {
        let tag = cache_tag(purpose, user_tag)?;
        let payload = self.backend.get_and_delete(&tag).await?;
        Ok(payload.map(|payload| CachedItem::new(purpose, user_tag, payload)))
    }
}
