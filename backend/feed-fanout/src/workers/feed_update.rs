//! Background fan-out of a freshly published post into recipient feeds.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::cache::{codec, CachePurpose, CachedItem, CachedItemStore, PASSTHROUGH_TAG};
use crate::error::{FeedError, FeedResult};
use crate::metrics;
use crate::stores::{PostStore, RelationshipStore, UserStore};

/// How one fan-out invocation ended.
enum FanoutOutcome {
    /// The post id was pushed to recipients (some updates may have failed
    /// individually and been counted).
    Completed { post_id: i64, updated: usize },
    /// Nothing in the mailbox: another worker claimed it first, or the
    /// message was overwritten before this worker ran.
    EmptyMailbox,
    /// The message was claimed but its post or author no longer resolves.
    Dropped,
}

/// A single fan-out execution.
///
/// One instance is spawned per publish notification. It claims the pending
/// post id from the passthrough slot, resolves the author and their
/// followers, and pushes the id to the top of every recipient's cached
/// feed. There is no retry and no dead-letter path: a run that cannot
/// resolve its inputs logs and terminates.
pub struct FeedUpdateWorker {
    cache: CachedItemStore,
    posts: Arc<dyn PostStore>,
    users: Arc<dyn UserStore>,
    relationships: Arc<dyn RelationshipStore>,
}

impl FeedUpdateWorker {
    pub fn new(
        cache: CachedItemStore,
        posts: Arc<dyn PostStore>,
        users: Arc<dyn UserStore>,
        relationships: Arc<dyn RelationshipStore>,
    ) -> Self {
        Self {
            cache,
            posts,
            users,
            relationships,
        }
    }

    /// Runs the fan-out to completion. All failure modes are logged and end
    /// the invocation; nothing propagates to the task that spawned it.
    pub async fn run(self) {
        match self.process().await {
            Ok(FanoutOutcome::Completed { post_id, updated }) => {
                metrics::FANOUT_RUNS_TOTAL
                    .with_label_values(&["completed"])
                    .inc();
                debug!(post_id, updated, "Feed fan-out completed");
            }
            Ok(FanoutOutcome::EmptyMailbox) => {
                metrics::FANOUT_RUNS_TOTAL.with_label_values(&["empty"]).inc();
                debug!("No pending fan-out message, nothing to do");
            }
            Ok(FanoutOutcome::Dropped) => {
                metrics::FANOUT_RUNS_TOTAL
                    .with_label_values(&["dropped"])
                    .inc();
            }
            Err(e) => {
                metrics::FANOUT_RUNS_TOTAL
                    .with_label_values(&["failed"])
                    .inc();
                error!(error = ?e, "Feed fan-out aborted");
            }
        }
    }

    async fn process(&self) -> FeedResult<FanoutOutcome> {
        let Some(message) = self
            .cache
            .read_and_delete(CachePurpose::WorkerPassthrough, PASSTHROUGH_TAG)
            .await?
        else {
            return Ok(FanoutOutcome::EmptyMailbox);
        };

        let post_id: i64 = message.payload.parse().map_err(|_| {
            FeedError::MalformedPayload(format!(
                "passthrough payload {:?} is not a post id",
                message.payload
            ))
        })?;

        let Some(post) = self.posts.get_post(post_id).await? else {
            warn!(post_id, "Fan-out target post not found, dropping");
            return Ok(FanoutOutcome::Dropped);
        };

        let Some(author) = self.users.get_user(&post.username).await? else {
            warn!(
                post_id,
                username = %post.username,
                "Fan-out author not found, dropping"
            );
            return Ok(FanoutOutcome::Dropped);
        };

        // An empty follower list is a post with an audience of one.
        let mut recipients = self.relationships.followers_of(&author.username).await?;

        // The author always sees their own post.
        if !recipients.iter().any(|r| r == &author.username) {
            recipients.push(author.username.clone());
        }

        let mut updated = 0usize;
        for recipient in &recipients {
            match self.push_to_feed(recipient, post_id).await {
                Ok(()) => {
                    updated += 1;
                    metrics::FANOUT_RECIPIENTS_TOTAL
                        .with_label_values(&["updated"])
                        .inc();
                }
                Err(e) => {
                    // Isolate the failure: the other recipients still get
                    // their update.
                    metrics::FANOUT_RECIPIENTS_TOTAL
                        .with_label_values(&["failed"])
                        .inc();
                    warn!(
                        recipient = %recipient,
                        post_id,
                        error = ?e,
                        "Failed to update recipient feed, continuing"
                    );
                }
            }
        }

        Ok(FanoutOutcome::Completed { post_id, updated })
    }

    /// Reads or initializes the recipient's feed entry and puts `post_id` at
    /// the top. The replacement is delete-then-recreate: concurrent writers
    /// to the same recipient are last-write-wins.
    async fn push_to_feed(&self, recipient: &str, post_id: i64) -> FeedResult<()> {
        match self.cache.read(CachePurpose::NewsFeed, recipient).await? {
            Some(mut cached) => {
                cached.payload = codec::prepend(&cached.payload, post_id);
                self.cache.update(&cached).await
            }
            None => {
                let fresh =
                    CachedItem::new(CachePurpose::NewsFeed, recipient, post_id.to_string());
                self.cache.create(&fresh).await
            }
        }
    }
}
