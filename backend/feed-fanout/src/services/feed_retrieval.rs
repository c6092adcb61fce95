//! Read side: serves cursor-paginated pages from the precomputed feed cache.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{codec, CachePurpose, CachedItemStore};
use crate::error::FeedResult;
use crate::metrics;
use crate::models::NewsPost;
use crate::stores::PostStore;

/// Number of posts per page when the caller does not specify a count.
pub const DEFAULT_POST_COUNT: usize = 10;

/// Serves a user's precomputed feed.
pub struct FeedRetrievalService {
    cache: CachedItemStore,
    posts: Arc<dyn PostStore>,
    default_count: usize,
}

impl FeedRetrievalService {
    pub fn new(cache: CachedItemStore, posts: Arc<dyn PostStore>) -> Self {
        Self::with_default_count(cache, posts, DEFAULT_POST_COUNT)
    }

    pub fn with_default_count(
        cache: CachedItemStore,
        posts: Arc<dyn PostStore>,
        default_count: usize,
    ) -> Self {
        Self {
            cache,
            posts,
            default_count,
        }
    }

    /// First page of `username`'s feed at the default page size.
    pub async fn news_feed(&self, username: &str) -> FeedResult<Vec<NewsPost>> {
        self.news_feed_page(username, self.default_count, None).await
    }

    /// A page of up to `count` posts, starting after the post id the client
    /// saw last. `after = None` starts from the newest entry.
    ///
    /// A user with no feed cache gets an empty page, not an error. Ids whose
    /// backing post has since been deleted are skipped, so a page may come
    /// back shorter than `count` even mid-feed.
    pub async fn news_feed_page(
        &self,
        username: &str,
        count: usize,
        after: Option<i64>,
    ) -> FeedResult<Vec<NewsPost>> {
        let Some(cached) = self.cache.read(CachePurpose::NewsFeed, username).await? else {
            metrics::FEED_CACHE_EVENTS.with_label_values(&["miss"]).inc();
            debug!(username, "No feed cache, returning empty page");
            return Ok(Vec::new());
        };
        metrics::FEED_CACHE_EVENTS.with_label_values(&["hit"]).inc();

        let ids = codec::decode_lossy(&cached.payload);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let start = match after {
            None => 0,
            // A cursor id that has fallen out of the feed restarts from the
            // top rather than failing the read.
            Some(after_id) => ids
                .iter()
                .position(|&id| id == after_id)
                .map(|pos| pos + 1)
                .unwrap_or(0),
        };
        if start >= ids.len() {
            return Ok(Vec::new());
        }
        let end = usize::min(start + count, ids.len());

        let mut page = Vec::with_capacity(end - start);
        for &post_id in &ids[start..end] {
            match self.posts.get_post(post_id).await? {
                Some(post) => page.push(post),
                // Deleted after fan-out left a dangling id.
                None => debug!(post_id, username, "Skipping feed entry with no backing post"),
            }
        }

        Ok(page)
    }
}
