//! End-to-end exercises of the fan-out engine over in-memory backends.

use std::sync::Arc;

use async_trait::async_trait;

use feed_fanout::cache::memory::InMemoryCacheBackend;
use feed_fanout::cache::{CacheBackend, CachePurpose, CachedItem, CachedItemStore, PASSTHROUGH_TAG};
use feed_fanout::error::{FeedError, FeedResult};
use feed_fanout::stores::memory::{MemoryPostStore, MemoryRelationshipStore, MemoryUserStore};
use feed_fanout::stores::PostStore;
use feed_fanout::workers::FeedUpdateWorker;
use feed_fanout::{FeedRetrievalService, FeedUpdateService};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("feed_fanout=debug")
        .try_init();
}

struct Harness {
    cache: CachedItemStore,
    posts: Arc<MemoryPostStore>,
    users: Arc<MemoryUserStore>,
    relationships: Arc<MemoryRelationshipStore>,
}

impl Harness {
    fn new() -> Self {
        Self::with_cache(CachedItemStore::new(Arc::new(InMemoryCacheBackend::new())))
    }

    fn with_cache(cache: CachedItemStore) -> Self {
        init_tracing();
        Self {
            cache,
            posts: Arc::new(MemoryPostStore::new()),
            users: Arc::new(MemoryUserStore::new()),
            relationships: Arc::new(MemoryRelationshipStore::new()),
        }
    }

    fn update_service(&self) -> FeedUpdateService {
        FeedUpdateService::new(
            self.cache.clone(),
            self.posts.clone(),
            self.users.clone(),
            self.relationships.clone(),
        )
    }

    fn retrieval_service(&self) -> FeedRetrievalService {
        FeedRetrievalService::new(self.cache.clone(), self.posts.clone())
    }

    fn worker(&self) -> FeedUpdateWorker {
        FeedUpdateWorker::new(
            self.cache.clone(),
            self.posts.clone(),
            self.users.clone(),
            self.relationships.clone(),
        )
    }

    /// Writes the mailbox and drives one worker inline, as a notify would
    /// asynchronously.
    async fn fan_out(&self, post_id: i64) {
        self.cache
            .create(&CachedItem::new(
                CachePurpose::WorkerPassthrough,
                PASSTHROUGH_TAG,
                post_id.to_string(),
            ))
            .await
            .unwrap();
        self.worker().run().await;
    }

    async fn publish_and_fan_out(&self, username: &str, content: &str) -> i64 {
        let post = self.posts.create_post(username, content).await.unwrap();
        self.fan_out(post.post_id).await;
        post.post_id
    }

    async fn feed_ids(&self, username: &str) -> Vec<i64> {
        self.retrieval_service()
            .news_feed(username)
            .await
            .unwrap()
            .into_iter()
            .map(|post| post.post_id)
            .collect()
    }
}

#[tokio::test]
async fn fan_out_reaches_author_and_followers_only() {
    let h = Harness::new();
    h.users.add_user("alice");
    h.relationships.add_follower("alice", "bob");
    h.relationships.add_follower("alice", "carol");

    let post_id = h.publish_and_fan_out("alice", "hello world").await;

    assert_eq!(h.feed_ids("alice").await.first(), Some(&post_id));
    assert_eq!(h.feed_ids("bob").await.first(), Some(&post_id));
    assert_eq!(h.feed_ids("carol").await.first(), Some(&post_id));
    // Not a follower: feed still absent.
    assert!(h.feed_ids("dave").await.is_empty());
}

#[tokio::test]
async fn new_posts_land_ahead_of_existing_entries() {
    let h = Harness::new();
    h.users.add_user("alice");
    h.relationships.add_follower("alice", "bob");

    let first = h.publish_and_fan_out("alice", "one").await;
    let second = h.publish_and_fan_out("alice", "two").await;

    assert_eq!(h.feed_ids("bob").await, vec![second, first]);
}

#[tokio::test]
async fn pagination_walks_the_feed_without_overlap_or_gap() {
    let h = Harness::new();
    h.users.add_user("alice");

    for content in ["a", "b", "c", "d", "e"] {
        h.publish_and_fan_out("alice", content).await;
    }
    // Feed is now [5, 4, 3, 2, 1], most-recent-first.
    let reader = h.retrieval_service();

    let first_page: Vec<i64> = reader
        .news_feed_page("alice", 2, None)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.post_id)
        .collect();
    assert_eq!(first_page, vec![5, 4]);

    let second_page: Vec<i64> = reader
        .news_feed_page("alice", 2, Some(4))
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.post_id)
        .collect();
    assert_eq!(second_page, vec![3, 2]);

    let last_page: Vec<i64> = reader
        .news_feed_page("alice", 2, Some(2))
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.post_id)
        .collect();
    assert_eq!(last_page, vec![1]);

    let past_the_end = reader.news_feed_page("alice", 2, Some(1)).await.unwrap();
    assert!(past_the_end.is_empty());
}

#[tokio::test]
async fn stale_cursor_restarts_from_the_beginning() {
    let h = Harness::new();
    h.users.add_user("alice");
    let post_id = h.publish_and_fan_out("alice", "only").await;

    let page = h
        .retrieval_service()
        .news_feed_page("alice", 10, Some(999))
        .await
        .unwrap();
    assert_eq!(page[0].post_id, post_id);
}

#[tokio::test]
async fn empty_feed_is_an_empty_page_not_an_error() {
    let h = Harness::new();
    assert!(h.feed_ids("brand-new-user").await.is_empty());
}

#[tokio::test]
async fn worker_with_empty_mailbox_is_a_noop() {
    let h = Harness::new();
    h.users.add_user("alice");

    h.worker().run().await;

    assert!(h.feed_ids("alice").await.is_empty());
}

#[tokio::test]
async fn double_fan_out_duplicates_the_id() {
    let h = Harness::new();
    h.users.add_user("alice");

    let post = h.posts.create_post("alice", "again").await.unwrap();
    h.fan_out(post.post_id).await;
    h.fan_out(post.post_id).await;

    assert_eq!(h.feed_ids("alice").await, vec![post.post_id, post.post_id]);
}

#[tokio::test]
async fn fan_out_for_missing_post_drops_without_feed_writes() {
    let h = Harness::new();
    h.users.add_user("alice");
    h.relationships.add_follower("alice", "bob");

    h.fan_out(4242).await;

    assert!(h.feed_ids("alice").await.is_empty());
    assert!(h.feed_ids("bob").await.is_empty());
}

#[tokio::test]
async fn author_following_themselves_gets_a_single_entry() {
    let h = Harness::new();
    h.users.add_user("alice");
    h.relationships.add_follower("alice", "alice");
    h.relationships.add_follower("alice", "bob");

    let post_id = h.publish_and_fan_out("alice", "self-follow").await;

    assert_eq!(h.feed_ids("alice").await, vec![post_id]);
    assert_eq!(h.feed_ids("bob").await, vec![post_id]);
}

#[tokio::test]
async fn deleted_post_is_skipped_on_read() {
    let h = Harness::new();
    h.users.add_user("alice");

    let first = h.publish_and_fan_out("alice", "one").await;
    let second = h.publish_and_fan_out("alice", "two").await;
    let third = h.publish_and_fan_out("alice", "three").await;

    h.posts.remove_post(second);

    // The dangling id stays in the cache; the page just comes back shorter.
    assert_eq!(h.feed_ids("alice").await, vec![third, first]);
}

#[tokio::test]
async fn malformed_feed_entry_does_not_take_down_the_page() {
    let h = Harness::new();
    h.users.add_user("alice");
    let first = h.posts.create_post("alice", "one").await.unwrap();
    let second = h.posts.create_post("alice", "two").await.unwrap();

    h.cache
        .create(&CachedItem::new(
            CachePurpose::NewsFeed,
            "alice",
            format!("{},junk,{}", second.post_id, first.post_id),
        ))
        .await
        .unwrap();

    assert_eq!(h.feed_ids("alice").await, vec![second.post_id, first.post_id]);
}

#[tokio::test]
async fn notify_is_fire_and_forget_but_lands() {
    let h = Harness::new();
    h.users.add_user("alice");
    h.relationships.add_follower("alice", "bob");
    let service = h.update_service();

    let post = h.posts.create_post("alice", "async hello").await.unwrap();
    service.notify_post_created(post.post_id).await.unwrap();
    service.wait_idle().await;

    assert_eq!(h.feed_ids("bob").await, vec![post.post_id]);
    // The mailbox was consumed by the worker.
    assert!(h
        .cache
        .read(CachePurpose::WorkerPassthrough, PASSTHROUGH_TAG)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn shutdown_after_idle_is_clean() {
    let h = Harness::new();
    h.users.add_user("alice");
    let service = h.update_service();

    let post = h.posts.create_post("alice", "last words").await.unwrap();
    service.notify_post_created(post.post_id).await.unwrap();
    service.wait_idle().await;
    service.shutdown().await;

    assert_eq!(h.feed_ids("alice").await, vec![post.post_id]);
}

/// Backend wrapper that fails writes for one specific key.
struct FailingKeyBackend {
    inner: InMemoryCacheBackend,
    poisoned_key: String,
}

#[async_trait]
impl CacheBackend for FailingKeyBackend {
    async fn put(&self, key: &str, value: &str) -> FeedResult<()> {
        if key == self.poisoned_key {
            return Err(FeedError::Cache(format!("injected failure for {}", key)));
        }
        self.inner.put(key, value).await
    }

    async fn get(&self, key: &str) -> FeedResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> FeedResult<()> {
        self.inner.delete(key).await
    }

    async fn get_and_delete(&self, key: &str) -> FeedResult<Option<String>> {
        self.inner.get_and_delete(key).await
    }
}

#[tokio::test]
async fn one_recipient_failure_does_not_block_the_others() {
    let backend = FailingKeyBackend {
        inner: InMemoryCacheBackend::new(),
        poisoned_key: "NEWS|bob".to_string(),
    };
    let h = Harness::with_cache(CachedItemStore::new(Arc::new(backend)));
    h.users.add_user("alice");
    h.relationships.add_follower("alice", "bob");
    h.relationships.add_follower("alice", "carol");

    let post_id = h.publish_and_fan_out("alice", "partial").await;

    assert!(h.feed_ids("bob").await.is_empty());
    assert_eq!(h.feed_ids("carol").await, vec![post_id]);
    assert_eq!(h.feed_ids("alice").await, vec![post_id]);
}

#[tokio::test]
async fn second_notify_before_claim_overwrites_the_mailbox() {
    let h = Harness::new();
    h.users.add_user("alice");

    let first = h.posts.create_post("alice", "one").await.unwrap();
    let second = h.posts.create_post("alice", "two").await.unwrap();

    // Two messages land before any worker runs: the slot keeps only the
    // second, and the first post never fans out.
    for post in [&first, &second] {
        h.cache
            .create(&CachedItem::new(
                CachePurpose::WorkerPassthrough,
                PASSTHROUGH_TAG,
                post.post_id.to_string(),
            ))
            .await
            .unwrap();
    }
    h.worker().run().await;
    h.worker().run().await;

    assert_eq!(h.feed_ids("alice").await, vec![second.post_id]);
}
