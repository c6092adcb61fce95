//! # Fan-out News-Feed Cache Engine
//!
//! When a user publishes a post, this engine pushes that post's id to the
//! top of the precomputed feed of every follower (and the author) without
//! blocking the publishing request:
//!
//! 1. [`FeedUpdateService::notify_post_created`] stores the post id in a
//!    single-slot passthrough cache entry and spawns one background worker.
//! 2. [`FeedUpdateWorker`] claims the id with an atomic read-and-delete,
//!    resolves the author and their followers, and prepends the id to each
//!    recipient's cached feed, isolating per-recipient failures.
//! 3. [`FeedRetrievalService`] serves cursor-paginated pages from the cached
//!    id list, resolving each id against durable storage and skipping ids
//!    whose post has since been deleted.
//!
//! The cache is the only shared mutable state. Feed entries live under
//! `"NEWS|{username}"`; the worker mailbox is the single `"WORKER|INTERNAL"`
//! slot. Two properties worth knowing before embedding this crate:
//!
//! - Per-recipient feed updates are read, prepend, delete, recreate, with no
//!   transaction. Concurrent writers to the same recipient's feed are
//!   last-write-wins and one write can be lost.
//! - The mailbox holds one message. A second notification arriving before a
//!   worker claims the first overwrites it, and the earlier post id never
//!   fans out.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use feed_fanout::cache::memory::InMemoryCacheBackend;
//! use feed_fanout::cache::CachedItemStore;
//! use feed_fanout::stores::memory::{
//!     MemoryPostStore, MemoryRelationshipStore, MemoryUserStore,
//! };
//! use feed_fanout::stores::PostStore;
//! use feed_fanout::{FeedRetrievalService, FeedUpdateService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = CachedItemStore::new(Arc::new(InMemoryCacheBackend::new()));
//! let posts = Arc::new(MemoryPostStore::new());
//! let users = Arc::new(MemoryUserStore::new());
//! users.add_user("alice");
//! let relationships = Arc::new(MemoryRelationshipStore::new());
//!
//! let updates = FeedUpdateService::new(
//!     cache.clone(),
//!     posts.clone(),
//!     users,
//!     relationships,
//! );
//! let reader = FeedRetrievalService::new(cache, posts.clone());
//!
//! let post = posts.create_post("alice", "hello").await?;
//! updates.notify_post_created(post.post_id).await?;
//! updates.wait_idle().await;
//!
//! let page = reader.news_feed("alice").await?;
//! assert_eq!(page[0].post_id, post.post_id);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod stores;
pub mod workers;

pub use config::FeedConfig;
pub use error::{FeedError, FeedResult};
pub use models::{NewsPost, User};
pub use services::{FeedRetrievalService, FeedUpdateService, DEFAULT_POST_COUNT};
pub use workers::FeedUpdateWorker;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use cache::redis::RedisCacheBackend;
use cache::CachedItemStore;
use stores::postgres::{PgPostStore, PgRelationshipStore, PgUserStore};

/// Fully wired engine: Redis cache plus PostgreSQL-backed stores.
pub struct FeedEngine {
    pub updates: Arc<FeedUpdateService>,
    pub reader: FeedRetrievalService,
}

impl FeedEngine {
    /// Connects to Redis and PostgreSQL per `config` and wires both services
    /// over the shared cache and pool.
    pub async fn connect(config: &FeedConfig) -> FeedResult<Self> {
        let backend = RedisCacheBackend::connect(&config.redis.url).await?;
        let cache = CachedItemStore::new(Arc::new(backend));

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;

        let posts = Arc::new(PgPostStore::new(pool.clone()));
        let users = Arc::new(PgUserStore::new(pool.clone()));
        let relationships = Arc::new(PgRelationshipStore::new(pool));

        let updates = Arc::new(FeedUpdateService::new(
            cache.clone(),
            posts.clone(),
            users,
            relationships,
        ));
        let reader = FeedRetrievalService::with_default_count(
            cache,
            posts,
            config.feed.default_page_size,
        );

        Ok(Self { updates, reader })
    }
}
