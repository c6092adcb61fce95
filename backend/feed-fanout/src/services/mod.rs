pub mod feed_retrieval;
pub mod feed_update;

pub use feed_retrieval::{FeedRetrievalService, DEFAULT_POST_COUNT};
pub use feed_update::FeedUpdateService;
