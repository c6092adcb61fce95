//! Publish-side entry point: accepts post-created notifications and launches
//! fan-out workers.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CachePurpose, CachedItem, CachedItemStore, PASSTHROUGH_TAG};
use crate::error::FeedResult;
use crate::stores::{PostStore, RelationshipStore, UserStore};
use crate::workers::FeedUpdateWorker;

/// Hands freshly created post ids to background fan-out.
///
/// Each notification writes the post id into the single-slot passthrough
/// cache entry and spawns one [`FeedUpdateWorker`]. The handoff is
/// fire-and-forget: the caller learns whether the message was queued, never
/// how the fan-out went. Spawned tasks are tracked so [`shutdown`] can abort
/// whatever is still in flight.
///
/// [`shutdown`]: FeedUpdateService::shutdown
pub struct FeedUpdateService {
    cache: CachedItemStore,
    posts: Arc<dyn PostStore>,
    users: Arc<dyn UserStore>,
    relationships: Arc<dyn RelationshipStore>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl FeedUpdateService {
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
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Queues `post_id` for fan-out and returns once the message is stored.
    ///
    /// Called once per successful post insert. A failure writing the mailbox
    /// is returned to the caller so post creation can fail loudly; the worker
    /// outcome never reaches this caller. A second notification arriving
    /// before a worker claims the slot overwrites the first message, and the
    /// earlier post id is lost — the mailbox holds one message.
    pub async fn notify_post_created(&self, post_id: i64) -> FeedResult<()> {
        let message = CachedItem::new(
            CachePurpose::WorkerPassthrough,
            PASSTHROUGH_TAG,
            post_id.to_string(),
        );
        self.cache.create(&message).await?;

        let worker = FeedUpdateWorker::new(
            self.cache.clone(),
            Arc::clone(&self.posts),
            Arc::clone(&self.users),
            Arc::clone(&self.relationships),
        );
        let handle = tokio::spawn(worker.run());

        let mut workers = self.workers.lock().await;
        workers.retain(|h| !h.is_finished());
        workers.push(handle);
        debug!(post_id, in_flight = workers.len(), "Fan-out worker dispatched");

        Ok(())
    }

    /// Aborts any in-flight fan-out tasks.
    ///
    /// Best effort: a message already claimed from the passthrough slot but
    /// not yet written to every recipient is lost.
    pub async fn shutdown(&self) {
        let mut workers = self.workers.lock().await;
        let aborted = workers.len();
        for handle in workers.drain(..) {
            handle.abort();
        }
        if aborted > 0 {
            info!(aborted, "Aborted in-flight fan-out workers");
        }
    }

    /// Waits for every currently-registered worker to finish.
    ///
    /// For tests and orderly embedding; production shutdown uses
    /// [`shutdown`](FeedUpdateService::shutdown) and accepts in-flight loss.
    pub async fn wait_idle(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut workers = self.workers.lock().await;
            workers.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }
}
